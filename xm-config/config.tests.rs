use std::time::Duration;

use super::*;

#[test]
fn default_config_test() {
    let config = Config::default();

    assert_eq!(8080, config.metrics.port);
    assert_eq!(DEFAULT_METRIC_PREFIX, config.metrics.prefix);
    assert_eq!(Duration::from_secs(300), config.reconcile.interval());
    assert_eq!(Duration::from_secs(30), config.reconcile.error_requeue());
    assert!(config.info_mappings.is_empty());
}

#[test]
fn from_yaml_partial_test() {
    let yaml = r#"
metrics:
  port: 9090
reconcile:
  interval_secs: 60
info_mappings:
  - field_path: "$.spec.forProvider.region"
    label: region
"#;
    let config = Config::from_yaml(yaml).unwrap();

    assert_eq!(9090, config.metrics.port);
    assert_eq!("0.0.0.0:9090", config.metrics.socket_addr().to_string());
    assert_eq!(DEFAULT_METRIC_PREFIX, config.metrics.prefix);
    assert_eq!(Duration::from_secs(60), config.reconcile.interval());
    assert_eq!(30, config.reconcile.error_requeue_secs);
    assert_eq!(
        vec![InfoMapping {
            field_path: "$.spec.forProvider.region".to_owned(),
            label: "region".to_owned(),
        }],
        config.info_mappings
    );
}

#[test]
fn from_yaml_empty_test() {
    assert_eq!(Config::default(), Config::from_yaml("  \n").unwrap());
}

#[test]
fn from_yaml_invalid_test() {
    let result = Config::from_yaml("metrics: [1, 2]");
    assert!(matches!(result, Err(ConfigError::SerializationError(_))));
}

#[test]
fn zero_interval_is_clamped_test() {
    let config = Config::from_yaml("reconcile:\n  interval_secs: 0\n").unwrap();
    assert_eq!(Duration::from_secs(1), config.reconcile.interval());
}

#[tokio::test]
async fn load_or_default_missing_file_test() {
    let config = Config::load_or_default(Some(std::path::Path::new("/nonexistent/xmetrics/config.yaml"))).await;
    assert_eq!(Config::default(), config);
}
