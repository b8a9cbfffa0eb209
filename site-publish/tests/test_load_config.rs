use serial_test::serial;
use site_publish::load_config::{load_config, load_tuning};
use std::env;
use std::fs::write;
use std::path::PathBuf;
use std::time::Duration;
use tempfile::NamedTempFile;

fn set_aws_env() {
    env::set_var("AWS_REGION", "eu-central-1");
    env::set_var("AWS_ACCESS_KEY_ID", "AKIDEXAMPLE");
    env::set_var("AWS_SECRET_ACCESS_KEY", "secret");
    env::set_var("AWS_BUCKET_NAME", "openworship-www");
    env::set_var("AWS_DISTRIBUTION_ID", "E1DIST");
    env::remove_var("AWS_ENDPOINT_URL");
}

fn yaml_file(content: &str) -> NamedTempFile {
    let file = NamedTempFile::new().expect("temp file");
    write(file.path(), content).unwrap();
    file
}

/// Environment alone is enough: defaults fill in everything else.
#[test]
#[serial]
fn test_load_config_from_env_only() {
    set_aws_env();

    let loaded = load_config(PathBuf::from("/srv/build"), None, None).expect("Config should load");

    assert_eq!(loaded.aws.region, "eu-central-1");
    assert_eq!(loaded.aws.endpoint_url, None);
    assert_eq!(loaded.publish.target_dir, PathBuf::from("/srv/build"));
    assert_eq!(loaded.publish.bucket, "openworship-www");
    assert_eq!(loaded.publish.distribution_id, "E1DIST");
    assert_eq!(loaded.publish.key_prefix, "www");
    assert_eq!(loaded.publish.invalidation_paths, vec!["/*".to_string()]);
    assert_eq!(loaded.publish.options.concurrency, 16);
    assert_eq!(loaded.publish.pipeline_timeout, None);
}

#[test]
#[serial]
fn test_load_config_applies_tuning_file_and_cli_override() {
    set_aws_env();
    env::set_var("AWS_ENDPOINT_URL", "http://localhost:9000");
    let tuning = yaml_file(
        r#"
key_prefix: staging/www
concurrency: 4
upload_timeout_secs: 15
pipeline_timeout_secs: 600
invalidation_paths:
  - /index.html
  - /download/*
retry:
  max_attempts: 5
  base_delay_ms: 50
"#,
    );

    let loaded = load_config(PathBuf::from("/srv/build"), Some(tuning.path()), Some(8))
        .expect("Config should load");

    assert_eq!(loaded.aws.endpoint_url.as_deref(), Some("http://localhost:9000"));
    assert_eq!(loaded.publish.key_prefix, "staging/www");
    assert_eq!(loaded.publish.options.concurrency, 8, "CLI flag wins over file");
    assert_eq!(loaded.publish.options.upload_timeout, Duration::from_secs(15));
    assert_eq!(loaded.publish.pipeline_timeout, Some(Duration::from_secs(600)));
    assert_eq!(
        loaded.publish.invalidation_paths,
        vec!["/index.html".to_string(), "/download/*".to_string()]
    );
    assert_eq!(loaded.publish.options.retry.max_attempts, 5);
    assert_eq!(loaded.publish.options.retry.base_delay, Duration::from_millis(50));
    assert_eq!(loaded.publish.options.retry.max_delay, Duration::from_secs(5));
    env::remove_var("AWS_ENDPOINT_URL");
}

#[test]
#[serial]
fn test_load_config_errors_when_bucket_missing() {
    set_aws_env();
    env::set_var("AWS_BUCKET_NAME", "   ");

    let err = load_config(PathBuf::from("/srv/build"), None, None).unwrap_err();
    let msg = format!("{err:#}");
    assert!(msg.contains("AWS_BUCKET_NAME"), "got: {msg}");
}

#[test]
#[serial]
fn test_load_tuning_errors_for_invalid_file() {
    let file = yaml_file("not-yaml: [:::");
    let err = load_tuning(file.path()).unwrap_err();
    let msg = err.to_string();
    assert!(
        msg.contains("parse") || msg.contains("YAML"),
        "Parse error expected, got: {msg}"
    );
}

#[test]
#[serial]
fn test_load_tuning_rejects_unknown_fields() {
    let file = yaml_file("bucket: should-come-from-env\n");
    assert!(load_tuning(file.path()).is_err());
}

#[test]
#[serial]
fn test_load_tuning_accepts_empty_file() {
    let file = yaml_file("");
    let tuning = load_tuning(file.path()).expect("empty file is fine");
    assert!(tuning.concurrency.is_none());
    assert!(tuning.retry.is_none());
}

#[test]
#[serial]
fn test_load_tuning_missing_file() {
    let err = load_tuning("/definitely/not/here.yaml").unwrap_err();
    assert!(err.to_string().contains("Failed to read config file"));
}

#[test]
#[serial]
fn test_load_config_rejects_invalidation_path_without_leading_slash() {
    set_aws_env();
    let tuning = yaml_file("invalidation_paths:\n  - /docs/*\n  - index.html\n");

    let err = load_config(PathBuf::from("/srv/build"), Some(tuning.path()), None).unwrap_err();
    let msg = format!("{err:#}");
    assert!(msg.contains("index.html"), "got: {msg}");
    assert!(msg.contains("must start with '/'"), "got: {msg}");
}
