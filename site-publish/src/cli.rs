///
/// This module implements the CLI interface for site-publish: argument parsing,
/// configuration assembly, client construction and the call into the core pipeline.
///
/// All pipeline logic (discovery, keys, uploads, invalidation) lives in the
/// [`site-publish-core`] crate. This module is strictly CLI glue.
///
/// ## How To Use
/// - For command-line users: `site-publish <TARGET_DIR>` with the AWS variables set
///   (a `.env` in the working directory is picked up).
/// - For programmatic/integration use: call [`run`] with a constructed [`Cli`].
///
/// [`site-publish-core`]: ../../site-publish-core/
use crate::aws::{load_sdk_config, CloudFrontInvalidator, S3ObjectStore};
use crate::load_config::load_config;
use anyhow::{Context, Result};
use clap::Parser;
use site_publish_core::content_type::MimeGuessResolver;
use site_publish_core::discover::resolve_target_dir;
use site_publish_core::synchronise::synchronise;
use std::path::PathBuf;

/// CLI for site-publish: mirror a built static site into S3 and purge CloudFront.
#[derive(Parser, Debug)]
#[clap(
    name = "site-publish",
    version,
    about = "Upload a built static site to S3 under www/ and invalidate the CloudFront cache"
)]
pub struct Cli {
    /// Directory to publish, relative to the current working directory (absolute paths are used as given)
    pub target_dir: String,

    /// Optional YAML file with publish tuning (prefix, concurrency, timeouts, retries)
    #[clap(long)]
    pub config: Option<PathBuf>,

    /// Maximum number of uploads in flight; overrides the config file
    #[clap(long)]
    pub concurrency: Option<usize>,
}

/// Extracted async CLI logic entrypoint for integration tests and main()
pub async fn run(cli: Cli) -> Result<()> {
    // Emit a top-level 'trace_initialised' event at the very start
    tracing::info!("trace_initialised");

    let cwd = std::env::current_dir().context("Failed to determine the working directory")?;
    let target_dir = resolve_target_dir(&cwd, &cli.target_dir);

    let loaded = load_config(target_dir, cli.config.as_deref(), cli.concurrency)?;
    loaded.publish.trace_loaded();

    let sdk = load_sdk_config(&loaded.aws).await;
    let store = S3ObjectStore::new(&sdk, loaded.aws.endpoint_url.as_deref());
    let cdn = CloudFrontInvalidator::new(&sdk);

    tracing::info!(command = "publish", "Starting publish");
    match synchronise(&loaded.publish, &store, &cdn, &MimeGuessResolver).await {
        Ok(report) => {
            tracing::info!(
                command = "publish",
                uploaded = report.uploaded(),
                invalidation = ?report.invalidation,
                "Publish complete"
            );
            Ok(())
        }
        Err(e) => {
            tracing::error!(command = "publish", error = %e, "Publish failed");
            Err(anyhow::Error::new(e).context(format!(
                "Publishing {} failed",
                loaded.publish.target_dir.display()
            )))
        }
    }
}
