use site_publish::aws::{load_sdk_config, S3ObjectStore};
use site_publish::load_config::AwsSettings;
use site_publish_core::contract::{ObjectStore, PutObjectRequest};
use site_publish_core::key::ObjectKey;
use tempfile::tempdir;

fn dummy_settings() -> AwsSettings {
    AwsSettings {
        region: "eu-west-1".to_string(),
        access_key_id: "AKIDEXAMPLE".to_string(),
        secret_access_key: "not-a-real-secret".to_string(),
        bucket: "openworship-site-test".to_string(),
        distribution_id: "E2EXAMPLE".to_string(),
        endpoint_url: Some("http://127.0.0.1:9".to_string()),
    }
}

#[tokio::test]
async fn put_object_fails_when_body_file_is_missing() {
    let tmp = tempdir().unwrap();
    let settings = dummy_settings();
    let sdk = load_sdk_config(&settings).await;
    let store = S3ObjectStore::new(&sdk, settings.endpoint_url.as_deref());

    let result = store
        .put_object(PutObjectRequest {
            bucket: settings.bucket.clone(),
            key: ObjectKey::new("www", "gone.html"),
            body_path: tmp.path().join("gone.html"),
            content_type: Some("text/html".to_string()),
        })
        .await;

    assert!(result.is_err(), "missing body file must not upload");
}

#[test]
fn debug_output_redacts_the_secret() {
    let rendered = format!("{:?}", dummy_settings());
    assert!(rendered.contains("AKIDEXAMPLE"));
    assert!(!rendered.contains("not-a-real-secret"));
}
