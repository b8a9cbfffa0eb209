//! High-level pipeline: orchestrates discover → publish → invalidate for a static site.
//!
//! This module provides the top-level orchestration logic for "synchronising" a local
//! build directory into the object store behind the website's CDN. It runs a single
//! linear pipeline that:
//!   - Discovers every regular file under the publish root
//!   - Uploads them concurrently (bounded) under `<prefix>/<relative path>` keys
//!   - Waits for the whole upload batch to settle
//!   - Requests one CDN invalidation, only if every upload succeeded
//!
//! # Major Types
//! - [`SynchroniseReport`]: per-file outcomes plus the invalidation receipt
//!
//! # Responsibilities
//! - Fail-fast on discovery: nothing is uploaded when the root cannot be walked
//! - Fail-after-settle on uploads: siblings are never cancelled, the first failure
//!   (by key) is returned once all uploads are done, and invalidation is skipped
//! - No rollback: objects already stored stay stored whatever fails later
//! - Logs a per-file summary before returning, success or not
//!
//! # Callable From
//! - The CLI crate, with real S3/CloudFront clients
//! - Integration tests, with mocks or recording doubles
//!
//! # Navigation
//! - Main entrypoint: [`synchronise`]

use std::path::PathBuf;

use tracing::{debug, error, info, warn};

use crate::config::PublishConfig;
use crate::content_type::ContentTypeResolver;
use crate::contract::{CdnInvalidator, InvalidationReceipt, InvalidationRequest, ObjectStore};
use crate::discover::discover;
use crate::error::PublishError;
use crate::invalidate::invalidate;
use crate::publish::{publish_all, UploadOutcome, UploadSummaryLine};

/// What a completed publish run did.
#[derive(Debug)]
pub struct SynchroniseReport {
    pub root: PathBuf,
    pub uploads: Vec<UploadOutcome>,
    pub invalidation: Option<InvalidationReceipt>,
}

impl SynchroniseReport {
    pub fn uploaded(&self) -> usize {
        self.uploads.iter().filter(|o| o.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.uploads.len() - self.uploaded()
    }

    /// Per-file summary, one line per object.
    pub fn trace_summary(&self) {
        for outcome in &self.uploads {
            let line = UploadSummaryLine::from(outcome);
            match serde_json::to_string(&line) {
                Ok(json) => debug!(json = %json, "[SYNC][SUMMARY] Upload outcome"),
                Err(e) => warn!(key = %outcome.key, error = ?e, "[SYNC][SUMMARY] Failed to serialize outcome"),
            }
            match &outcome.result {
                Ok(()) => info!(key = %outcome.key, attempts = outcome.attempts, "[SYNC][SUMMARY] ok"),
                Err(e) => error!(key = %outcome.key, attempts = outcome.attempts, error = %e, "[SYNC][SUMMARY] failed"),
            }
        }
        info!(
            root = %self.root.display(),
            uploaded = self.uploaded(),
            failed = self.failed(),
            invalidation = self.invalidation.as_ref().map(|r| r.id.as_str()).unwrap_or("<none>"),
            "[SYNC] Publish summary"
        );
    }
}

/// Publish `config.target_dir` into the object store and purge the CDN.
///
/// When `config.pipeline_timeout` is set the whole run is bounded by it; hitting
/// the deadline drops whatever is still in flight and yields
/// [`PublishError::Timeout`].
pub async fn synchronise(
    config: &PublishConfig,
    store: &dyn ObjectStore,
    cdn: &dyn CdnInvalidator,
    resolver: &dyn ContentTypeResolver,
) -> Result<SynchroniseReport, PublishError> {
    match config.pipeline_timeout {
        Some(deadline) => tokio::time::timeout(deadline, run(config, store, cdn, resolver))
            .await
            .unwrap_or_else(|_| {
                error!(after = ?deadline, "[SYNC][ERROR] Pipeline deadline exceeded");
                Err(PublishError::Timeout {
                    operation: "pipeline".to_string(),
                    after: deadline,
                })
            }),
        None => run(config, store, cdn, resolver).await,
    }
}

async fn run(
    config: &PublishConfig,
    store: &dyn ObjectStore,
    cdn: &dyn CdnInvalidator,
    resolver: &dyn ContentTypeResolver,
) -> Result<SynchroniseReport, PublishError> {
    info!(root = %config.target_dir.display(), "[SYNC] Starting publish pipeline");

    // --- Step 1: Discover ---
    let entries = discover(&config.target_dir, resolver)?;

    // --- Step 2: Upload, then wait for the whole batch ---
    let uploads = publish_all(
        store,
        &config.bucket,
        &config.key_prefix,
        entries,
        &config.options,
    )
    .await;

    let mut report = SynchroniseReport {
        root: config.target_dir.clone(),
        uploads,
        invalidation: None,
    };

    if report.failed() > 0 {
        report.trace_summary();
        error!(
            failed = report.failed(),
            total = report.uploads.len(),
            "[SYNC][ERROR] Uploads failed, skipping invalidation"
        );
        if let Some(first) = report.uploads.drain(..).find_map(|o| o.result.err()) {
            return Err(first);
        }
    }

    // --- Step 3: Invalidate ---
    let request = InvalidationRequest::new(&config.distribution_id, &config.invalidation_paths);
    let receipt = invalidate(cdn, request, &config.options).await.map_err(|e| {
        report.trace_summary();
        e
    })?;
    report.invalidation = Some(receipt);

    report.trace_summary();
    info!("[SYNC] Publish pipeline complete");
    Ok(report)
}
