use policyblob_adapter::{AdapterConfig, AdapterError};
use pretty_assertions::assert_eq;
use std::time::Duration;

#[test]
fn default_timeout_is_ten_seconds() {
    let config = AdapterConfig::new("policies", "policy.csv");
    assert_eq!(config.timeout_ms, 10_000);
    assert_eq!(config.timeout(), Duration::from_secs(10));
}

#[test]
fn with_timeout_overrides() {
    let config = AdapterConfig::new("c", "o").with_timeout(Duration::from_millis(1500));
    assert_eq!(config.timeout_ms, 1500);
}

#[test]
fn serde_roundtrip() {
    let config = AdapterConfig::new("policies", "policy.csv").with_timeout(Duration::from_secs(3));
    let json = serde_json::to_string(&config).unwrap();
    let back: AdapterConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(back, config);
}

#[test]
fn missing_timeout_uses_default() {
    let config: AdapterConfig =
        serde_json::from_str(r#"{"container":"policies","object":"policy.csv"}"#).unwrap();
    assert_eq!(config.timeout_ms, 10_000);
}

#[test]
fn validate_rejects_empty_names() {
    assert!(AdapterConfig::new("policies", "policy.csv").validate().is_ok());
    assert!(matches!(
        AdapterConfig::new("", "policy.csv").validate(),
        Err(AdapterError::InvalidContainer)
    ));
    assert!(matches!(
        AdapterConfig::new("policies", "").validate(),
        Err(AdapterError::InvalidObject)
    ));
    // Container is checked first.
    assert!(matches!(
        AdapterConfig::default().validate(),
        Err(AdapterError::InvalidContainer)
    ));
}
