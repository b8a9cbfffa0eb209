use tracing::{error, info};

use crate::config::{PublishOptions, DEFAULT_INVALIDATION_PATH};
use crate::contract::{CdnInvalidator, InvalidationReceipt, InvalidationRequest};
use crate::error::PublishError;

const CALLER_REFERENCE_PREFIX: &str = "site-publish";

/// Fresh caller reference: wall-clock millis plus a random suffix, so two runs
/// within the same millisecond are still distinct.
pub fn caller_reference() -> String {
    format!(
        "{CALLER_REFERENCE_PREFIX}-{}-{}",
        chrono::Utc::now().timestamp_millis(),
        uuid::Uuid::new_v4().simple()
    )
}

impl InvalidationRequest {
    /// Batch for `paths`, defaulting to a full purge when the list is empty.
    pub fn new(distribution_id: impl Into<String>, paths: &[String]) -> Self {
        let paths = if paths.is_empty() {
            vec![DEFAULT_INVALIDATION_PATH.to_string()]
        } else {
            paths.to_vec()
        };
        Self {
            distribution_id: distribution_id.into(),
            paths,
            caller_reference: caller_reference(),
        }
    }
}

/// Submit `request` with the same deadline and retry treatment as uploads.
///
/// Retries reuse the caller reference, which lets the CDN recognise a batch
/// it already accepted.
pub async fn invalidate(
    cdn: &dyn CdnInvalidator,
    request: InvalidationRequest,
    options: &PublishOptions,
) -> Result<InvalidationReceipt, PublishError> {
    let operation = format!("invalidation {}", request.caller_reference);
    let caller_reference = request.caller_reference.clone();

    let (result, attempts) =
        crate::retry::with_retry(&operation, &options.retry, options.upload_timeout, || {
            let request = request.clone();
            let caller_reference = caller_reference.as_str();
            async move {
                info!(
                    distribution_id = %request.distribution_id,
                    paths = ?request.paths,
                    caller_reference,
                    "[INVALIDATE] Requesting cache invalidation"
                );
                cdn.create_invalidation(request)
                    .await
                    .map_err(|source| PublishError::Invalidation {
                        caller_reference: caller_reference.to_string(),
                        source,
                    })
            }
        })
        .await;

    match &result {
        Ok(receipt) => info!(
            id = %receipt.id,
            status = %receipt.status,
            attempts,
            "[INVALIDATE] Clear cache accepted"
        ),
        Err(e) => error!(attempts, error = %e, "[INVALIDATE][ERROR] Invalidation failed"),
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_paths_default_to_wildcard() {
        let req = InvalidationRequest::new("E2ABC", &[]);
        assert_eq!(req.paths, vec!["/*".to_string()]);
        assert_eq!(req.distribution_id, "E2ABC");
    }

    #[test]
    fn caller_references_are_unique_and_non_empty() {
        let a = InvalidationRequest::new("E2ABC", &[]);
        let b = InvalidationRequest::new("E2ABC", &[]);
        assert!(a.caller_reference.starts_with("site-publish-"));
        assert_ne!(a.caller_reference, b.caller_reference);
    }

    #[test]
    fn explicit_paths_are_kept() {
        let paths = vec!["/index.html".to_string(), "/docs/*".to_string()];
        let req = InvalidationRequest::new("E2ABC", &paths);
        assert_eq!(req.paths, paths);
    }
}
