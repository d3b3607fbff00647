//! Integration tests for client config loading and validation
//!
//! These tests go through real files on disk rather than constructing `Config` directly.

use bpctl::config::{Config, DEFAULT_BASE_URL};
use std::fs;
use std::time::Duration;
use tempfile::TempDir;

/// Helper to create a temporary config directory
fn setup_temp_config() -> (TempDir, std::path::PathBuf) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_dir = temp_dir.path().join("bpctl");
    fs::create_dir_all(&config_dir).expect("Failed to create config dir");
    let config_path = config_dir.join("config.toml");
    (temp_dir, config_path)
}

#[test]
fn test_full_config_loads() {
    let (_temp, config_path) = setup_temp_config();

    let toml_content = r#"
[service]
base_url = "http://poster.lan:9000/"

[panel]
log_capacity = 50
message_ttl_ms = 1500
error_ttl_ms = 6000
bottom_spacing = 2
show_logger = true

[settings]
log_level = "debug"
"#;
    fs::write(&config_path, toml_content).expect("Failed to write config");

    let config = Config::load_from_path(&config_path).expect("Failed to load config");
    assert_eq!(config.service.base_url, "http://poster.lan:9000");
    assert_eq!(config.panel.log_capacity, 50);
    assert_eq!(config.panel.message_ttl, Duration::from_millis(1500));
    assert_eq!(config.panel.error_ttl, Duration::from_millis(6000));
    assert!((config.panel.bottom_spacing - 2.0).abs() < f64::EPSILON);
    assert!(config.panel.show_logger);
    assert_eq!(config.settings.log_level, "debug");
}

#[test]
fn test_partial_config_fills_defaults() {
    let (_temp, config_path) = setup_temp_config();
    fs::write(&config_path, "[panel]\nshow_logger = true\n").expect("Failed to write config");

    let config = Config::load_from_path(&config_path).expect("Failed to load config");
    assert_eq!(config.service.base_url, DEFAULT_BASE_URL);
    assert_eq!(config.panel.log_capacity, 200);
    assert!(config.panel.show_logger);
    assert_eq!(config.settings.log_level, "warn");
}

#[test]
fn test_invalid_toml_reports_path() {
    let (_temp, config_path) = setup_temp_config();
    fs::write(&config_path, "[service\nbase_url = 1").expect("Failed to write config");

    let err = Config::load_from_path(&config_path).unwrap_err();
    let message = format!("{err:#}");
    assert!(message.contains("config.toml"), "{message}");
}

#[test]
fn test_zero_ttl_is_rejected() {
    let (_temp, config_path) = setup_temp_config();
    fs::write(&config_path, "[panel]\nerror_ttl_ms = 0\n").expect("Failed to write config");

    let err = Config::load_from_path(&config_path).unwrap_err();
    assert!(format!("{err:#}").contains("error_ttl_ms"));
}

#[test]
fn test_missing_file_is_an_error() {
    let (_temp, config_path) = setup_temp_config();
    let err = Config::load_from_path(&config_path).unwrap_err();
    assert!(format!("{err:#}").contains("Failed to read config"));
}
