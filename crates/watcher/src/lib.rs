#![deny(warnings)]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]

//! Directory watching for automatic screenshot renaming
//!
//! This crate turns bursts of filesystem notifications into single rename
//! passes:
//! - Relevance filtering against the screenshot filename grammar
//! - Trailing-edge debouncing with a single resettable deadline
//! - One processing worker per watcher, so passes never overlap
//! - A draining `stop()` that waits for an in-flight pass
//!
//! # Example
//!
//! ```no_run
//! use shotrename_core::Settings;
//! use shotrename_watcher::{DirectoryWatcher, WatcherConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut watcher = DirectoryWatcher::new(WatcherConfig::default());
//! watcher
//!     .start(Settings::with_default_prefix("/Users/me/Desktop"))
//!     .await?;
//!
//! tokio::signal::ctrl_c().await?;
//! watcher.stop().await?;
//! # Ok(())
//! # }
//! ```

// Private implementation modules
mod config;
mod debouncer;
mod events;
mod filter;
mod queue;
mod watcher;

// Public exports - minimal API surface
pub use config::{RecoveryConfig, WatcherConfig, WatcherConfigBuilder};
pub use events::ChangeBatch;
pub use queue::{StatsSnapshot, WatcherStats};
pub use watcher::{DirectoryWatcher, WatcherState};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::config::WatcherConfig;
    pub use crate::watcher::{DirectoryWatcher, WatcherState};
}
