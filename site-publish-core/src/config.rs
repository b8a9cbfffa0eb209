use std::path::PathBuf;
use std::time::Duration;

use tracing::{debug, info};

use crate::key::DEFAULT_KEY_PREFIX;

pub const DEFAULT_CONCURRENCY: usize = 16;
pub const DEFAULT_UPLOAD_TIMEOUT: Duration = Duration::from_secs(60);
pub const DEFAULT_INVALIDATION_PATH: &str = "/*";

/// Bounded exponential backoff for transient failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first; 1 disables retrying.
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl RetryPolicy {
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    /// Delay before attempt `attempt + 1`, where `attempt` starts at 1.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let exp = attempt.saturating_sub(1).min(16);
        self.base_delay
            .saturating_mul(1u32 << exp)
            .min(self.max_delay)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(200),
            max_delay: Duration::from_secs(5),
        }
    }
}

/// Knobs shared by the publisher and the invalidator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishOptions {
    /// Maximum uploads in flight at once.
    pub concurrency: usize,
    /// Deadline for a single network attempt.
    pub upload_timeout: Duration,
    pub retry: RetryPolicy,
}

impl PublishOptions {
    pub fn effective_concurrency(&self) -> usize {
        self.concurrency.max(1)
    }
}

impl Default for PublishOptions {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            upload_timeout: DEFAULT_UPLOAD_TIMEOUT,
            retry: RetryPolicy::default(),
        }
    }
}

/// Everything one publish run needs, built once at startup.
#[derive(Debug, Clone)]
pub struct PublishConfig {
    /// Absolute publish root.
    pub target_dir: PathBuf,
    pub bucket: String,
    pub distribution_id: String,
    pub key_prefix: String,
    pub invalidation_paths: Vec<String>,
    pub options: PublishOptions,
    /// Deadline for the whole run; `None` means unbounded.
    pub pipeline_timeout: Option<Duration>,
}

impl PublishConfig {
    pub fn new(
        target_dir: impl Into<PathBuf>,
        bucket: impl Into<String>,
        distribution_id: impl Into<String>,
    ) -> Self {
        Self {
            target_dir: target_dir.into(),
            bucket: bucket.into(),
            distribution_id: distribution_id.into(),
            key_prefix: DEFAULT_KEY_PREFIX.to_string(),
            invalidation_paths: vec![DEFAULT_INVALIDATION_PATH.to_string()],
            options: PublishOptions::default(),
            pipeline_timeout: None,
        }
    }

    pub fn trace_loaded(&self) {
        info!(
            target_dir = %self.target_dir.display(),
            bucket = %self.bucket,
            distribution_id = %self.distribution_id,
            key_prefix = %self.key_prefix,
            concurrency = self.options.effective_concurrency(),
            "Loaded PublishConfig"
        );
        debug!(?self, "PublishConfig loaded (full debug)");
    }
}
