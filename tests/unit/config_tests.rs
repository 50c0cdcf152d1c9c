use std::time::Duration;

use score_queue::config::ENDPOINT_ENV;
use score_queue::{AppError, GlobalConfig};
use serial_test::serial;

const FULL_TOML: &str = r#"
endpoint = "https://game.example.com/api/score"
storage_dir = "/var/lib/score-queue"
storage_key = "scores"
flush_interval_seconds = 30
flush_on_add = false
"#;

const MINIMAL_TOML: &str = r#"
endpoint = "http://localhost:3000/api/score"
"#;

#[test]
#[serial]
fn parses_full_config() {
    std::env::remove_var(ENDPOINT_ENV);
    let config = GlobalConfig::from_toml_str(FULL_TOML).expect("config parses");

    assert_eq!(config.endpoint, "https://game.example.com/api/score");
    assert_eq!(config.storage_dir.to_str(), Some("/var/lib/score-queue"));
    assert_eq!(config.storage_key, "scores");
    assert_eq!(config.flush_interval(), Duration::from_secs(30));
    assert!(!config.flush_on_add);

    let options = config.queue_options();
    assert_eq!(options.storage_key, "scores");
    assert!(!options.flush_on_add);
}

#[test]
#[serial]
fn applies_defaults() {
    std::env::remove_var(ENDPOINT_ENV);
    let config = GlobalConfig::from_toml_str(MINIMAL_TOML).expect("config parses");

    assert_eq!(config.storage_dir.to_str(), Some(".score-queue"));
    assert_eq!(config.storage_key, "pending_scores");
    assert_eq!(config.flush_interval_seconds, 5);
    assert!(config.flush_on_add);
}

#[test]
#[serial]
fn rejects_missing_endpoint() {
    std::env::remove_var(ENDPOINT_ENV);
    let result = GlobalConfig::from_toml_str("storage_key = \"x\"");
    assert!(matches!(result, Err(AppError::Config(_))));
}

#[test]
#[serial]
fn rejects_relative_endpoint() {
    std::env::remove_var(ENDPOINT_ENV);
    let result = GlobalConfig::from_toml_str("endpoint = \"/api/score\"");
    assert!(matches!(result, Err(AppError::Config(_))));
}

#[test]
#[serial]
fn rejects_non_http_endpoint() {
    std::env::remove_var(ENDPOINT_ENV);
    let err = GlobalConfig::from_toml_str("endpoint = \"ftp://example.com/score\"")
        .expect_err("ftp is rejected");
    assert!(err.to_string().contains("http or https"));
}

#[test]
#[serial]
fn rejects_zero_flush_interval() {
    std::env::remove_var(ENDPOINT_ENV);
    let toml = format!("{MINIMAL_TOML}\nflush_interval_seconds = 0\n");
    let err = GlobalConfig::from_toml_str(&toml).expect_err("zero interval is rejected");
    assert!(err.to_string().contains("flush_interval_seconds"));
}

#[test]
#[serial]
fn rejects_blank_storage_key() {
    std::env::remove_var(ENDPOINT_ENV);
    let toml = format!("{MINIMAL_TOML}\nstorage_key = \"  \"\n");
    assert!(matches!(
        GlobalConfig::from_toml_str(&toml),
        Err(AppError::Config(_))
    ));
}

#[test]
#[serial]
fn environment_overrides_endpoint() {
    std::env::set_var(ENDPOINT_ENV, "https://override.example.com/score");
    let config = GlobalConfig::from_toml_str(MINIMAL_TOML);
    std::env::remove_var(ENDPOINT_ENV);

    let config = config.expect("config parses");
    assert_eq!(config.endpoint, "https://override.example.com/score");
}

#[test]
#[serial]
fn blank_environment_value_is_ignored() {
    std::env::set_var(ENDPOINT_ENV, "   ");
    let config = GlobalConfig::from_toml_str(MINIMAL_TOML);
    std::env::remove_var(ENDPOINT_ENV);

    assert_eq!(
        config.expect("config parses").endpoint,
        "http://localhost:3000/api/score"
    );
}

#[test]
#[serial]
fn loads_from_path() {
    std::env::remove_var(ENDPOINT_ENV);
    let temp = tempfile::tempdir().expect("tempdir");
    let path = temp.path().join("config.toml");
    std::fs::write(&path, FULL_TOML).expect("write config");

    let config = GlobalConfig::load_from_path(&path).expect("config loads");
    assert_eq!(config.storage_key, "scores");
}

#[test]
fn missing_file_is_a_config_error() {
    let temp = tempfile::tempdir().expect("tempdir");
    let result = GlobalConfig::load_from_path(temp.path().join("absent.toml"));
    assert!(matches!(result, Err(AppError::Config(_))));
}
