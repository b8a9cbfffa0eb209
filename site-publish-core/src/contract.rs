//! # contract: interfaces to the remote object store and CDN
//!
//! The pipeline never talks to a cloud SDK directly. It goes through two
//! small traits:
//!
//! - [`ObjectStore`]: stores one object under a key (overwrite by default).
//! - [`CdnInvalidator`]: submits one cache invalidation batch.
//!
//! Real clients live in the CLI crate (S3 and CloudFront). Tests use the
//! `mockall` mocks generated here, exported behind the default
//! `test-export-mocks` feature so integration tests can reach them too.
//!
//! Both traits return the boxed [`ClientError`]; the pipeline wraps it into a
//! [`crate::error::PublishError`] carrying the key or caller reference.

use std::path::PathBuf;

use async_trait::async_trait;

#[allow(unused_imports)]
use mockall::{automock, predicate::*};

use crate::error::ClientError;
use crate::key::ObjectKey;

/// One object-store PUT.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PutObjectRequest {
    /// Target bucket.
    pub bucket: String,
    /// Normalized key the object is stored under.
    pub key: ObjectKey,
    /// File on disk the body is streamed from.
    pub body_path: PathBuf,
    /// MIME type; `None` leaves the header off and lets the store apply its default.
    pub content_type: Option<String>,
}

/// A single invalidation batch for a CDN distribution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidationRequest {
    pub distribution_id: String,
    /// Path patterns to purge, e.g. `/*`.
    pub paths: Vec<String>,
    /// Unique per request, used by the CDN to reject duplicate submissions.
    pub caller_reference: String,
}

/// What the CDN hands back once it has accepted a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidationReceipt {
    pub id: String,
    pub status: String,
}

/// Remote key-addressed storage the site is mirrored into.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store the request body under `req.key`, replacing any existing object.
    async fn put_object(&self, req: PutObjectRequest) -> Result<(), ClientError>;
}

/// CDN in front of the object store.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait CdnInvalidator: Send + Sync {
    /// Submit the batch. Completion on the provider side is not awaited.
    async fn create_invalidation(
        &self,
        req: InvalidationRequest,
    ) -> Result<InvalidationReceipt, ClientError>;
}
