use std::collections::HashMap;
use std::path::Path;

/// Value stores apply when an object is written without a content type.
pub const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// Maps a file name to its MIME type. `None` means "unknown"; callers upload
/// without a content type rather than failing.
pub trait ContentTypeResolver: Send + Sync {
    fn content_type(&self, file_name: &str) -> Option<String>;
}

/// Resolver backed by the `mime_guess` extension database.
#[derive(Debug, Default, Clone, Copy)]
pub struct MimeGuessResolver;

impl ContentTypeResolver for MimeGuessResolver {
    fn content_type(&self, file_name: &str) -> Option<String> {
        mime_guess::from_path(file_name)
            .first()
            .map(|mime| mime.essence_str().to_string())
    }
}

/// Fixed extension table, for tests or when only a handful of types matter.
#[derive(Debug, Default, Clone)]
pub struct StaticContentTypes {
    by_extension: HashMap<String, String>,
}

impl StaticContentTypes {
    pub fn new<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let by_extension = entries
            .into_iter()
            .map(|(ext, mime)| (ext.into().to_ascii_lowercase(), mime.into()))
            .collect();
        Self { by_extension }
    }
}

impl ContentTypeResolver for StaticContentTypes {
    fn content_type(&self, file_name: &str) -> Option<String> {
        let ext = Path::new(file_name).extension()?.to_str()?;
        self.by_extension.get(&ext.to_ascii_lowercase()).cloned()
    }
}

/// Content type for `file_name` using the default database.
pub fn infer_content_type(file_name: &str) -> Option<String> {
    MimeGuessResolver.content_type(file_name)
}
