use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

/// Namespace every published object lives under.
pub const DEFAULT_KEY_PREFIX: &str = "www";

static BACKSLASHES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\\+").expect("valid regex"));
static SLASH_RUNS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"/+").expect("valid regex"));

/// Normalized remote key for one published file.
///
/// Built from the key prefix and the file's path relative to the publish root.
/// Separators are forced to `/`, runs of slashes collapse to one and leading
/// slashes are dropped, so the same relative path always yields the same key
/// regardless of the host platform.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectKey(String);

impl ObjectKey {
    pub fn new(prefix: &str, relative_path: &str) -> Self {
        let joined = format!("{prefix}/{relative_path}");
        ObjectKey(normalize(&joined))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ObjectKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

fn normalize(raw: &str) -> String {
    let forward = BACKSLASHES.replace_all(raw, "/");
    let collapsed = SLASH_RUNS.replace_all(&forward, "/");
    collapsed.trim_start_matches('/').to_string()
}
