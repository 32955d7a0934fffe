//! Configuration loading from files and environment variables

use crate::error::{Error, Result};
use config::{Config as ConfigLib, ConfigBuilder as LibConfigBuilder, Environment, File};
use std::path::Path;

use super::defaults::*;
use super::{global_config_path, Config};

/// Helper to set a config default with consistent error mapping
fn set_config_default<T: Into<config::Value>>(
    builder: LibConfigBuilder<config::builder::DefaultState>,
    key: &str,
    value: T,
) -> Result<LibConfigBuilder<config::builder::DefaultState>> {
    builder
        .set_default(key, value)
        .map_err(|e| Error::config(format!("Failed to set {key} default: {e}")))
}

impl Config {
    /// Loads configuration from a TOML file with environment variable overrides
    ///
    /// Environment variables are prefixed with `SHOTRENAME_` and use double
    /// underscores for nested values. For example:
    /// - `SHOTRENAME_RENAME__PREFIX=Capture`
    /// - `SHOTRENAME_WATCHER__DEBOUNCE_MS=500`
    /// - `SHOTRENAME_RENAME__WHITELIST=/a,/b`
    pub fn from_file(path: &Path) -> Result<Self> {
        let builder = ConfigLib::builder();

        // config crate doesn't apply serde defaults for missing sections
        let builder = set_config_default(
            builder,
            "watcher.debounce_ms",
            default_debounce_ms() as i64,
        )?;
        let builder = set_config_default(
            builder,
            "watcher.max_queue_size",
            default_max_queue_size() as i64,
        )?;
        let builder = set_config_default(
            builder,
            "watcher.max_init_retries",
            default_max_init_retries() as i64,
        )?;
        let mut builder = set_config_default(
            builder,
            "watcher.retry_delay_ms",
            default_retry_delay_ms() as i64,
        )?;

        // Add the config file if it exists
        if path.exists() {
            builder = builder.add_source(File::from(path));
        }

        // Add environment variables with SHOTRENAME_ prefix
        builder = builder.add_source(
            Environment::with_prefix("SHOTRENAME")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("rename.whitelist")
                .try_parsing(true),
        );

        let config = builder
            .build()
            .map_err(|e| Error::config(format!("Failed to build config: {e}")))?;

        config
            .try_deserialize()
            .map_err(|e| Error::config(format!("Failed to deserialize config: {e}")))
    }

    /// Creates a config from a TOML string (useful for testing)
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::config(format!("Failed to parse TOML: {e}")))
    }

    /// Load configuration from a single file
    ///
    /// Precedence (lowest to highest):
    /// 1. Hardcoded defaults
    /// 2. Config file (~/.shotrename/config.toml or custom --config path)
    /// 3. Environment variables (SHOTRENAME_*)
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let path = match config_path {
            Some(p) => p.to_path_buf(),
            None => global_config_path()?,
        };
        Self::from_file(&path)
    }
}
