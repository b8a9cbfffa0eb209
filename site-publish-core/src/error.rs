//! Error taxonomy for the publish pipeline.
//!
//! Every failure in discovery, upload, invalidation or the deadline wrappers
//! is expressed as a [`PublishError`]. Transport-level failures coming out of
//! the client traits stay boxed ([`ClientError`]) and are wrapped with the key
//! or caller reference they belong to.

use std::path::PathBuf;
use std::time::Duration;

use crate::key::ObjectKey;

/// Boxed transport error returned by [`crate::contract::ObjectStore`] and
/// [`crate::contract::CdnInvalidator`] implementations.
pub type ClientError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    /// The publish root is missing or not a directory, or an entry became
    /// unreadable during the walk.
    #[error("file system error at {}: {source}", path.display())]
    FileSystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A single object-store PUT failed.
    #[error("upload failed for key {key}: {source}")]
    Upload {
        key: ObjectKey,
        #[source]
        source: ClientError,
    },

    /// The CDN rejected or failed to process the invalidation batch.
    #[error("invalidation {caller_reference} failed: {source}")]
    Invalidation {
        caller_reference: String,
        #[source]
        source: ClientError,
    },

    #[error("{operation} timed out after {after:?}")]
    Timeout { operation: String, after: Duration },
}

impl PublishError {
    /// Network-bound failures are worth another attempt, local ones are not.
    pub fn is_transient(&self) -> bool {
        match self {
            PublishError::FileSystem { .. } => false,
            PublishError::Upload { .. }
            | PublishError::Invalidation { .. }
            | PublishError::Timeout { .. } => true,
        }
    }

    pub(crate) fn file_system(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PublishError::FileSystem {
            path: path.into(),
            source,
        }
    }
}
