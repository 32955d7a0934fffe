//! Library interface for the shotrename CLI
//!
//! This module exposes internal functions for integration testing while keeping
//! the main binary logic in main.rs.

pub mod defaults;
pub mod resolve;

// Re-export commonly needed types for tests
pub use anyhow::Result;
pub use defaults::{platform_store, DefaultsCommandStore};
pub use resolve::{rename_whitelist, resolve_settings, SettingsOverrides};
pub use shotrename_core::config::Config;
