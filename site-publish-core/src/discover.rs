//! Recursive discovery of the files under a publish root.

use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, error, info};
use walkdir::WalkDir;

use crate::content_type::ContentTypeResolver;
use crate::error::PublishError;

/// One regular file found under the publish root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    pub absolute_path: PathBuf,
    /// Path relative to the publish root, with the host's separators.
    pub relative_path: PathBuf,
    pub content_type: Option<String>,
}

impl FileEntry {
    /// Relative path as a string. [`discover`] only yields UTF-8 paths, so the
    /// conversion is lossless for discovered entries.
    pub fn relative_str(&self) -> String {
        self.relative_path.to_string_lossy().into_owned()
    }
}

/// Resolve the user-supplied directory against `cwd`.
///
/// Surrounding whitespace and trailing separators are dropped; absolute
/// arguments are taken as-is.
pub fn resolve_target_dir(cwd: &Path, arg: &str) -> PathBuf {
    let trimmed = arg.trim();
    let stripped = trimmed.trim_end_matches(&['/', '\\'][..]);
    let stripped = if stripped.is_empty() && !trimmed.is_empty() {
        // A bare "/" should stay the filesystem root rather than become cwd.
        &trimmed[..1]
    } else {
        stripped
    };
    if stripped.is_empty() {
        return cwd.to_path_buf();
    }
    cwd.join(stripped)
}

/// Walk `root` and return every regular file beneath it.
///
/// Symlinks are followed; a link loop or any unreadable entry aborts the
/// whole walk with [`PublishError::FileSystem`] naming the offending path.
pub fn discover(
    root: &Path,
    resolver: &dyn ContentTypeResolver,
) -> Result<Vec<FileEntry>, PublishError> {
    let meta = std::fs::metadata(root).map_err(|e| {
        error!(root = %root.display(), error = %e, "[DISCOVER] Publish root is not accessible");
        PublishError::file_system(root, e)
    })?;
    if !meta.is_dir() {
        error!(root = %root.display(), "[DISCOVER] Publish root is not a directory");
        return Err(PublishError::file_system(
            root,
            io::Error::new(io::ErrorKind::InvalidInput, "not a directory"),
        ));
    }

    let mut entries = Vec::new();
    for item in WalkDir::new(root).follow_links(true).min_depth(1) {
        let item = item.map_err(|e| {
            let path = e
                .path()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| root.to_path_buf());
            error!(path = %path.display(), error = %e, "[DISCOVER] Walk failed");
            let source = e
                .into_io_error()
                .unwrap_or_else(|| io::Error::new(io::ErrorKind::Other, "filesystem loop"));
            PublishError::file_system(path, source)
        })?;

        if !item.file_type().is_file() {
            continue;
        }

        let absolute_path = item.into_path();
        let relative_path = absolute_path
            .strip_prefix(root)
            .map(Path::to_path_buf)
            .map_err(|_| {
                PublishError::file_system(
                    &absolute_path,
                    io::Error::new(io::ErrorKind::Other, "entry escaped the publish root"),
                )
            })?;
        // Keys are derived from this string; a lossy conversion would map distinct
        // names onto the same key.
        let file_name = relative_path.to_str().ok_or_else(|| {
            error!(path = %absolute_path.display(), "[DISCOVER] File name is not valid UTF-8");
            PublishError::file_system(
                &absolute_path,
                io::Error::new(io::ErrorKind::InvalidData, "file name is not valid UTF-8"),
            )
        })?;
        let content_type = resolver.content_type(file_name);
        debug!(
            path = %relative_path.display(),
            content_type = content_type.as_deref().unwrap_or("<unknown>"),
            "[DISCOVER] Found file"
        );
        entries.push(FileEntry {
            absolute_path,
            relative_path,
            content_type,
        });
    }

    info!(root = %root.display(), files = entries.len(), "[DISCOVER] Discovery complete");
    Ok(entries)
}
