use shotrename_core::config::{Config, WatcherConfig};
use shotrename_core::Error;
use std::path::PathBuf;

#[test]
fn test_watcher_config_defaults() {
    let config = WatcherConfig::default();
    assert_eq!(config.debounce_ms, 300);
    assert_eq!(config.max_queue_size, 1024);
    assert_eq!(config.max_init_retries, 3);
    assert_eq!(config.retry_delay_ms, 500);
}

#[test]
fn test_default_config_is_valid() {
    let config = Config::default();
    assert!(config.validate().is_ok());
    assert!(config.whitelist().is_none());
}

#[test]
fn test_config_validation_whitelist() {
    let mut config = Config::default();

    config.rename.whitelist = vec![PathBuf::from("/Users/me/Desktop")];
    assert!(config.validate().is_ok());

    config.rename.whitelist.push(PathBuf::from("relative/dir"));
    let result = config.validate();
    assert!(matches!(result, Err(Error::Config(_))));
}

#[test]
fn test_config_validation_init_retries() {
    let mut config = Config::default();
    config.watcher.max_init_retries = 0;
    let result = config.validate();
    assert!(result.is_err());
    assert!(result
        .unwrap_err()
        .to_string()
        .contains("watcher.max_init_retries must be greater than 0"));
}

#[test]
fn test_partial_watcher_section_keeps_defaults() {
    let config = Config::from_toml_str(
        r#"
        [watcher]
        max_queue_size = 16
    "#,
    )
    .expect("Failed to parse TOML");

    assert_eq!(config.watcher.max_queue_size, 16);
    assert_eq!(config.watcher.debounce_ms, 300);
    assert_eq!(config.watcher.retry_delay_ms, 500);
}

#[test]
fn test_config_round_trips_through_toml() {
    let mut config = Config::default();
    config.rename.directory = Some(PathBuf::from("/tmp/shots"));
    config.rename.prefix = Some("Screen Shot".to_string());

    let serialized = toml::to_string(&config).expect("Failed to serialize config");
    let parsed = Config::from_toml_str(&serialized).expect("Failed to parse serialized config");

    assert_eq!(parsed.rename.directory, config.rename.directory);
    assert_eq!(parsed.rename.prefix, config.rename.prefix);
    assert_eq!(parsed.watcher.debounce_ms, config.watcher.debounce_ms);
}
