use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Filename prefix macOS uses when none is configured
pub const DEFAULT_PREFIX: &str = "Screenshot";

/// Directory and filename prefix for one rename or watch session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Directory screenshots are saved to
    pub directory: PathBuf,
    /// Filename prefix screenshots are saved with
    pub prefix: String,
}

impl Settings {
    pub fn new(directory: impl Into<PathBuf>, prefix: impl Into<String>) -> Self {
        Self {
            directory: directory.into(),
            prefix: prefix.into(),
        }
    }

    /// Settings for `directory` with the default `Screenshot` prefix
    pub fn with_default_prefix(directory: impl Into<PathBuf>) -> Self {
        Self::new(directory, DEFAULT_PREFIX)
    }
}
