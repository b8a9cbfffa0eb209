/// `load_config` module: turns the environment plus an optional YAML tuning file
/// into the explicit [`PublishConfig`] and [`AwsSettings`] used for one run.
///
/// # Responsibilities
/// - Read the required AWS variables (`AWS_REGION`, `AWS_ACCESS_KEY_ID`,
///   `AWS_SECRET_ACCESS_KEY`, `AWS_BUCKET_NAME`, `AWS_DISTRIBUTION_ID`)
/// - Parse the optional tuning file (no secrets live there)
/// - Apply CLI overrides on top
///
/// # Errors
/// All errors use `anyhow::Error` and are surfaced at the CLI boundary.
use anyhow::{Context, Result};
use serde::Deserialize;
use site_publish_core::config::{PublishConfig, RetryPolicy};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{error, info};

pub const ENV_REGION: &str = "AWS_REGION";
pub const ENV_ACCESS_KEY_ID: &str = "AWS_ACCESS_KEY_ID";
pub const ENV_SECRET_ACCESS_KEY: &str = "AWS_SECRET_ACCESS_KEY";
pub const ENV_BUCKET_NAME: &str = "AWS_BUCKET_NAME";
pub const ENV_DISTRIBUTION_ID: &str = "AWS_DISTRIBUTION_ID";
pub const ENV_ENDPOINT_URL: &str = "AWS_ENDPOINT_URL";

/// Credentials and targets for the S3 and CloudFront clients.
#[derive(Clone, PartialEq, Eq)]
pub struct AwsSettings {
    pub region: String,
    pub access_key_id: String,
    pub secret_access_key: String,
    pub bucket: String,
    pub distribution_id: String,
    /// S3-compatible endpoint override.
    pub endpoint_url: Option<String>,
}

impl fmt::Debug for AwsSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AwsSettings")
            .field("region", &self.region)
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .field("bucket", &self.bucket)
            .field("distribution_id", &self.distribution_id)
            .field("endpoint_url", &self.endpoint_url)
            .finish()
    }
}

impl AwsSettings {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            region: required_env(ENV_REGION)?,
            access_key_id: required_env(ENV_ACCESS_KEY_ID)?,
            secret_access_key: required_env(ENV_SECRET_ACCESS_KEY)?,
            bucket: required_env(ENV_BUCKET_NAME)?,
            distribution_id: required_env(ENV_DISTRIBUTION_ID)?,
            endpoint_url: optional_env(ENV_ENDPOINT_URL),
        })
    }
}

fn required_env(name: &str) -> Result<String> {
    match optional_env(name) {
        Some(value) => Ok(value),
        None => {
            error!(var = name, "Required environment variable not set");
            anyhow::bail!("{name} environment variable not set")
        }
    }
}

fn optional_env(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Optional YAML tuning file. Every field may be omitted.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TuningFile {
    pub key_prefix: Option<String>,
    pub concurrency: Option<usize>,
    pub upload_timeout_secs: Option<u64>,
    pub pipeline_timeout_secs: Option<u64>,
    pub invalidation_paths: Option<Vec<String>>,
    pub retry: Option<RetrySection>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RetrySection {
    pub max_attempts: Option<u32>,
    pub base_delay_ms: Option<u64>,
    pub max_delay_ms: Option<u64>,
}

impl RetrySection {
    fn apply(&self, policy: &mut RetryPolicy) {
        if let Some(n) = self.max_attempts {
            policy.max_attempts = n.max(1);
        }
        if let Some(ms) = self.base_delay_ms {
            policy.base_delay = Duration::from_millis(ms);
        }
        if let Some(ms) = self.max_delay_ms {
            policy.max_delay = Duration::from_millis(ms);
        }
    }
}

/// Fully merged configuration for a run.
#[derive(Debug)]
pub struct LoadedConfig {
    pub publish: PublishConfig,
    pub aws: AwsSettings,
}

/// Reads and parses the YAML tuning file at `path`.
pub fn load_tuning<P: AsRef<Path>>(path: P) -> Result<TuningFile> {
    let path_ref = path.as_ref();
    info!(config_path = ?path_ref, "Loading tuning file");

    let content = fs::read_to_string(path_ref).map_err(|e| {
        error!(error = ?e, config_path = ?path_ref, "Failed to read config file");
        anyhow::anyhow!("Failed to read config file {:?}: {}", path_ref, e)
    })?;

    // An empty file is the same as no file.
    if content.trim().is_empty() {
        return Ok(TuningFile::default());
    }

    let tuning: TuningFile = serde_yaml::from_str(&content).map_err(|e| {
        error!(error = ?e, config_path = ?path_ref, "Failed to parse config YAML");
        anyhow::anyhow!("Failed to parse config YAML: {e}")
    })?;
    info!(config_path = ?path_ref, "Parsed config YAML successfully");
    Ok(tuning)
}

/// CloudFront only accepts patterns rooted at `/`; checked here so a bad value
/// fails before anything is uploaded.
fn validate_invalidation_paths(paths: &[String]) -> Result<()> {
    for path in paths {
        if !path.starts_with('/') {
            error!(path = %path, "Invalidation path must start with '/'");
            anyhow::bail!("Invalid invalidation path {path:?}: must start with '/'");
        }
    }
    Ok(())
}

/// Merge environment, optional tuning file and CLI overrides for `target_dir`.
pub fn load_config(
    target_dir: PathBuf,
    tuning_path: Option<&Path>,
    concurrency_override: Option<usize>,
) -> Result<LoadedConfig> {
    let aws = AwsSettings::from_env().context("Incomplete AWS configuration")?;
    let tuning = match tuning_path {
        Some(path) => load_tuning(path)?,
        None => TuningFile::default(),
    };

    let mut publish = PublishConfig::new(target_dir, &aws.bucket, &aws.distribution_id);
    if let Some(prefix) = tuning.key_prefix {
        publish.key_prefix = prefix;
    }
    if let Some(paths) = tuning.invalidation_paths {
        validate_invalidation_paths(&paths)?;
        publish.invalidation_paths = paths;
    }
    if let Some(secs) = tuning.upload_timeout_secs {
        publish.options.upload_timeout = Duration::from_secs(secs);
    }
    publish.pipeline_timeout = tuning.pipeline_timeout_secs.map(Duration::from_secs);
    if let Some(retry) = &tuning.retry {
        retry.apply(&mut publish.options.retry);
    }
    if let Some(n) = concurrency_override.or(tuning.concurrency) {
        publish.options.concurrency = n;
    }

    info!(
        bucket = %publish.bucket,
        region = %aws.region,
        endpoint_url = aws.endpoint_url.as_deref().unwrap_or("<aws>"),
        "Config loaded and merged successfully"
    );
    Ok(LoadedConfig { publish, aws })
}
