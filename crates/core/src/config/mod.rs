//! Configuration module for shotrename
//!
//! This module provides configuration structures and loading mechanisms.
//! Configuration can be loaded from TOML files and/or environment variables.

mod defaults;
mod loading;


use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use defaults::*;

/// Returns the path to the global configuration file
///
/// The global config is stored at `~/.shotrename/config.toml`.
pub fn global_config_path() -> Result<PathBuf> {
    let home_dir = dirs::home_dir()
        .ok_or_else(|| Error::config("Unable to determine home directory".to_string()))?;
    Ok(home_dir.join(".shotrename").join("config.toml"))
}

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Rename pass configuration
    #[serde(default)]
    pub rename: RenameConfig,

    /// Directory watcher configuration
    #[serde(default)]
    pub watcher: WatcherConfig,
}

/// Which directory to rename in and how
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RenameConfig {
    /// Screenshot directory; detected from host preferences when unset
    #[serde(default)]
    pub directory: Option<PathBuf>,

    /// Screenshot filename prefix; detected from host preferences when unset
    #[serde(default)]
    pub prefix: Option<String>,

    /// Directories a rename pass may operate in (empty disables the check)
    #[serde(default)]
    pub whitelist: Vec<PathBuf>,
}

/// Configuration for the directory watcher
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatcherConfig {
    /// Quiet period after the last relevant event before a pass runs
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Capacity of the channel between the notifier and the processing worker
    #[serde(default = "default_max_queue_size")]
    pub max_queue_size: usize,

    /// Attempts at creating the OS subscription before giving up
    #[serde(default = "default_max_init_retries")]
    pub max_init_retries: u32,

    /// Delay between subscription attempts in milliseconds
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            max_queue_size: default_max_queue_size(),
            max_init_retries: default_max_init_retries(),
            retry_delay_ms: default_retry_delay_ms(),
        }
    }
}

impl Config {
    /// Validates the configuration
    pub fn validate(&self) -> Result<()> {
        if let Some(prefix) = &self.rename.prefix {
            if prefix.trim().is_empty() {
                return Err(Error::config("rename.prefix must not be empty"));
            }
        }

        if let Some(entry) = self.rename.whitelist.iter().find(|p| p.is_relative()) {
            return Err(Error::config(format!(
                "rename.whitelist entries must be absolute paths, got {}",
                entry.display()
            )));
        }

        if self.watcher.debounce_ms == 0 {
            return Err(Error::config(
                "watcher.debounce_ms must be greater than 0".to_string(),
            ));
        }

        if self.watcher.max_queue_size == 0 {
            return Err(Error::config(
                "watcher.max_queue_size must be greater than 0".to_string(),
            ));
        }

        if self.watcher.max_init_retries == 0 {
            return Err(Error::config(
                "watcher.max_init_retries must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Configured whitelist, `None` when it is empty
    pub fn whitelist(&self) -> Option<Vec<PathBuf>> {
        if self.rename.whitelist.is_empty() {
            None
        } else {
            Some(self.rename.whitelist.clone())
        }
    }
}
