#![deny(warnings)]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]

//! Core types for the shotrename screenshot renamer
//!
//! This crate provides the building blocks used by the watcher and the CLI:
//!
//! - **Grammar**: Parsing timestamped screenshot names and building canonical ones
//! - **Validation**: Directory whitelisting and filename sanitization
//! - **Renaming**: Collision-safe rename passes over a directory
//! - **Preferences**: Detecting the host screenshot location and prefix
//! - **Configuration**: System configuration management
//! - **Error handling**: Unified error types
//!

pub mod config;
pub mod error;
pub mod grammar;
pub mod preferences;
pub mod renamer;
pub mod settings;
pub mod validator;

// Re-export main types for convenience
pub use config::{Config, RenameConfig, WatcherConfig};
pub use error::{Error, Result, ResultExt};
pub use grammar::{FilenameGrammar, Meridiem, ParsedMatch};
pub use preferences::{InMemoryPreferenceStore, PreferenceStore, SettingsDetector};
pub use renamer::{resolve_available_name, RenameEngine, RenameOutcome};
pub use settings::{Settings, DEFAULT_PREFIX};
pub use validator::PathValidator;

/// Version of the core library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::error::{Result, ResultExt};
    pub use crate::renamer::{RenameEngine, RenameOutcome};
    pub use crate::settings::Settings;
}
