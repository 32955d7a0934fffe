//! Configuration types for the directory watcher
//!
//! This module provides immutable configuration structures for controlling
//! debouncing, queueing and subscription recovery.

use serde::{Deserialize, Serialize};
use shotrename_core::config::WatcherConfig as CoreWatcherConfig;
use std::path::PathBuf;
use std::time::Duration;

/// Immutable configuration for the directory watcher
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatcherConfig {
    /// Quiet period in milliseconds before a rename pass runs (default: 300ms)
    pub debounce_ms: u64,
    /// Maximum number of change batches in queue (default: 1024)
    pub max_queue_size: usize,
    /// Directories rename passes may touch; `None` means only the watched one
    pub whitelist: Option<Vec<PathBuf>>,
    /// Subscription recovery settings
    pub recovery: RecoveryConfig,
}

impl WatcherConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Create configuration from builder
    pub fn builder() -> WatcherConfigBuilder {
        WatcherConfigBuilder::default()
    }

    /// Get the debounce duration
    pub fn debounce_duration(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 300,
            max_queue_size: 1024,
            whitelist: None,
            recovery: RecoveryConfig::default(),
        }
    }
}

impl From<&CoreWatcherConfig> for WatcherConfig {
    fn from(config: &CoreWatcherConfig) -> Self {
        Self {
            debounce_ms: config.debounce_ms,
            max_queue_size: config.max_queue_size,
            whitelist: None,
            recovery: RecoveryConfig {
                max_init_retries: config.max_init_retries,
                retry_delay_ms: config.retry_delay_ms,
            },
        }
    }
}

/// Builder for WatcherConfig
#[derive(Debug, Default)]
pub struct WatcherConfigBuilder {
    config: WatcherConfig,
}

impl WatcherConfigBuilder {
    /// Set debounce window in milliseconds
    pub fn debounce_ms(mut self, ms: u64) -> Self {
        self.config.debounce_ms = ms;
        self
    }

    /// Set maximum queue size
    pub fn max_queue_size(mut self, size: usize) -> Self {
        self.config.max_queue_size = size;
        self
    }

    /// Restrict rename passes to these directories
    pub fn whitelist(mut self, whitelist: Vec<PathBuf>) -> Self {
        self.config.whitelist = Some(whitelist);
        self
    }

    /// Set subscription recovery settings
    pub fn recovery(mut self, recovery: RecoveryConfig) -> Self {
        self.config.recovery = recovery;
        self
    }

    /// Build the configuration
    pub fn build(self) -> WatcherConfig {
        self.config
    }
}

/// Configuration for error recovery
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecoveryConfig {
    /// Maximum retry attempts for watcher initialization
    pub max_init_retries: u32,
    /// Delay between retry attempts in milliseconds
    pub retry_delay_ms: u64,
}

impl RecoveryConfig {
    /// Get the retry delay duration
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}

impl Default for RecoveryConfig {
    fn default() -> Self {
        Self {
            max_init_retries: 3,
            retry_delay_ms: 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_watcher_config_builder() {
        let config = WatcherConfig::builder()
            .debounce_ms(1000)
            .max_queue_size(8)
            .whitelist(vec![PathBuf::from("/tmp")])
            .build();

        assert_eq!(config.debounce_ms, 1000);
        assert_eq!(config.max_queue_size, 8);
        assert_eq!(config.whitelist, Some(vec![PathBuf::from("/tmp")]));
        assert_eq!(config.debounce_duration(), Duration::from_millis(1000));
    }

    #[test]
    fn test_default_config() {
        let config = WatcherConfig::default();
        assert_eq!(config.debounce_ms, 300);
        assert_eq!(config.max_queue_size, 1024);
        assert!(config.whitelist.is_none());
        assert_eq!(config.recovery.max_init_retries, 3);
    }

    #[test]
    fn test_from_core_section() {
        let core = CoreWatcherConfig {
            debounce_ms: 75,
            max_queue_size: 32,
            max_init_retries: 5,
            retry_delay_ms: 10,
        };

        let config = WatcherConfig::from(&core);
        assert_eq!(config.debounce_ms, 75);
        assert_eq!(config.max_queue_size, 32);
        assert_eq!(config.recovery.max_init_retries, 5);
        assert_eq!(config.recovery.retry_delay(), Duration::from_millis(10));
    }
}
