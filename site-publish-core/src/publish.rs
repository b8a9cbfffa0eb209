//! Concurrent upload of discovered files to the object store.
//!
//! Uploads fan out with at most [`PublishOptions::concurrency`] in flight.
//! Every entry is attempted no matter how its siblings fare; a failure is only
//! surfaced once the whole batch has settled.

use futures::stream::{self, StreamExt};
use serde::Serialize;
use tracing::{error, info};

use crate::config::PublishOptions;
use crate::content_type::FALLBACK_CONTENT_TYPE;
use crate::contract::{ObjectStore, PutObjectRequest};
use crate::discover::FileEntry;
use crate::error::PublishError;
use crate::key::ObjectKey;
use crate::retry::with_retry;

/// Per-file result of a publish run.
#[derive(Debug)]
pub struct UploadOutcome {
    pub key: ObjectKey,
    pub content_type: Option<String>,
    pub attempts: u32,
    pub result: Result<(), PublishError>,
}

impl UploadOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// Serializable view of an [`UploadOutcome`] for summaries.
#[derive(Debug, Serialize)]
pub struct UploadSummaryLine<'a> {
    pub key: &'a str,
    pub attempts: u32,
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<'a> From<&'a UploadOutcome> for UploadSummaryLine<'a> {
    fn from(outcome: &'a UploadOutcome) -> Self {
        Self {
            key: outcome.key.as_str(),
            attempts: outcome.attempts,
            ok: outcome.is_success(),
            error: outcome.result.as_ref().err().map(ToString::to_string),
        }
    }
}

/// Upload every entry and wait for all of them to settle.
///
/// The returned outcomes are sorted by key.
pub async fn publish_all(
    store: &dyn ObjectStore,
    bucket: &str,
    key_prefix: &str,
    entries: Vec<FileEntry>,
    options: &PublishOptions,
) -> Vec<UploadOutcome> {
    let concurrency = options.effective_concurrency();
    info!(
        bucket,
        files = entries.len(),
        concurrency,
        "[PUBLISH] Dispatching uploads"
    );

    let mut outcomes: Vec<UploadOutcome> = stream::iter(entries)
        .map(|entry| upload_one(store, bucket, key_prefix, entry, options))
        .buffer_unordered(concurrency)
        .collect()
        .await;
    outcomes.sort_by(|a, b| a.key.cmp(&b.key));

    let failed = outcomes.iter().filter(|o| !o.is_success()).count();
    info!(
        bucket,
        uploaded = outcomes.len() - failed,
        failed,
        "[PUBLISH] Upload batch settled"
    );
    outcomes
}

async fn upload_one(
    store: &dyn ObjectStore,
    bucket: &str,
    key_prefix: &str,
    entry: FileEntry,
    options: &PublishOptions,
) -> UploadOutcome {
    let key = ObjectKey::new(key_prefix, &entry.relative_str());
    let url = format!("s3://{bucket}/{key}");
    let operation = format!("upload {key}");
    let content_type = entry.content_type.clone();

    let request = PutObjectRequest {
        bucket: bucket.to_string(),
        key: key.clone(),
        body_path: entry.absolute_path,
        content_type: entry.content_type,
    };

    let (result, attempts) =
        with_retry(&operation, &options.retry, options.upload_timeout, || {
            let request = request.clone();
            let url = url.as_str();
            let key = &key;
            async move {
                info!(
                    %url,
                    content_type = request.content_type.as_deref().unwrap_or(FALLBACK_CONTENT_TYPE),
                    "[PUBLISH] Uploading"
                );
                // A body that cannot be opened is a local failure, not a transport one.
                tokio::fs::File::open(&request.body_path)
                    .await
                    .map_err(|e| PublishError::file_system(&request.body_path, e))?;
                store
                    .put_object(request)
                    .await
                    .map_err(|source| PublishError::Upload {
                        key: key.clone(),
                        source,
                    })?;
                info!(%url, "[PUBLISH] Uploaded");
                Ok(())
            }
        })
        .await;

    if let Err(e) = &result {
        error!(%url, attempts, error = %e, "[PUBLISH][ERROR] Upload failed");
    }

    UploadOutcome {
        key,
        content_type,
        attempts,
        result,
    }
}
