#![doc = "AWS bindings for the core client traits: S3 for objects, CloudFront for invalidation."]
//!
//! Both clients are built from one [`SdkConfig`] carrying the region and the
//! static credentials from [`AwsSettings`]. SDK-level retries are disabled
//! because the pipeline applies its own retry policy around every call.

use async_trait::async_trait;
use aws_config::retry::RetryConfig;
use aws_config::{BehaviorVersion, Region, SdkConfig};
use aws_sdk_cloudfront::types::{InvalidationBatch, Paths};
use aws_sdk_s3::config::Credentials;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use site_publish_core::contract::{
    CdnInvalidator, InvalidationReceipt, InvalidationRequest, ObjectStore, PutObjectRequest,
};
use site_publish_core::ClientError;

use crate::load_config::AwsSettings;

const CREDENTIALS_PROVIDER_NAME: &str = "site-publish-env";

/// Shared SDK configuration for every client of one run.
pub async fn load_sdk_config(settings: &AwsSettings) -> SdkConfig {
    let credentials = Credentials::new(
        settings.access_key_id.clone(),
        settings.secret_access_key.clone(),
        None,
        None,
        CREDENTIALS_PROVIDER_NAME,
    );
    let config = aws_config::defaults(BehaviorVersion::latest())
        .region(Region::new(settings.region.clone()))
        .credentials_provider(credentials)
        .retry_config(RetryConfig::disabled())
        .load()
        .await;
    tracing::info!(region = %settings.region, "Initialised AWS SDK configuration");
    config
}

pub struct S3ObjectStore {
    client: aws_sdk_s3::Client,
}

impl S3ObjectStore {
    /// `endpoint_url` switches to path-style addressing for S3-compatible stores.
    pub fn new(sdk: &SdkConfig, endpoint_url: Option<&str>) -> Self {
        let client = match endpoint_url {
            Some(endpoint) => {
                let conf = aws_sdk_s3::config::Builder::from(sdk)
                    .endpoint_url(endpoint)
                    .force_path_style(true)
                    .build();
                aws_sdk_s3::Client::from_conf(conf)
            }
            None => aws_sdk_s3::Client::new(sdk),
        };
        Self { client }
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn put_object(&self, req: PutObjectRequest) -> Result<(), ClientError> {
        let body = ByteStream::from_path(&req.body_path).await?;
        let mut put = self
            .client
            .put_object()
            .bucket(&req.bucket)
            .key(req.key.as_str())
            .body(body);
        if let Some(content_type) = &req.content_type {
            put = put.content_type(content_type);
        }
        put.send().await.map_err(|e| -> ClientError {
            tracing::error!(bucket = %req.bucket, key = %req.key, "S3 put_object failed");
            DisplayErrorContext(e).to_string().into()
        })?;
        Ok(())
    }
}

pub struct CloudFrontInvalidator {
    client: aws_sdk_cloudfront::Client,
}

impl CloudFrontInvalidator {
    pub fn new(sdk: &SdkConfig) -> Self {
        Self {
            client: aws_sdk_cloudfront::Client::new(sdk),
        }
    }
}

#[async_trait]
impl CdnInvalidator for CloudFrontInvalidator {
    async fn create_invalidation(
        &self,
        req: InvalidationRequest,
    ) -> Result<InvalidationReceipt, ClientError> {
        let paths = Paths::builder()
            .quantity(req.paths.len() as i32)
            .set_items(Some(req.paths.clone()))
            .build()?;
        let batch = InvalidationBatch::builder()
            .paths(paths)
            .caller_reference(&req.caller_reference)
            .build()?;

        let output = self
            .client
            .create_invalidation()
            .distribution_id(&req.distribution_id)
            .invalidation_batch(batch)
            .send()
            .await
            .map_err(|e| -> ClientError {
                tracing::error!(
                    distribution_id = %req.distribution_id,
                    caller_reference = %req.caller_reference,
                    "CloudFront create_invalidation failed"
                );
                aws_sdk_cloudfront::error::DisplayErrorContext(e)
                    .to_string()
                    .into()
            })?;

        let receipt = match output.invalidation() {
            Some(inv) => InvalidationReceipt {
                id: inv.id().to_string(),
                status: inv.status().to_string(),
            },
            None => InvalidationReceipt {
                id: output.location().unwrap_or_default().to_string(),
                status: "Submitted".to_string(),
            },
        };
        Ok(receipt)
    }
}
