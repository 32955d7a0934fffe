//! Preference store backed by the macOS `defaults` command

use shotrename_core::{InMemoryPreferenceStore, PreferenceStore};
use std::path::PathBuf;
use std::process::{Command, Output};
use std::sync::Arc;
use tracing::{debug, warn};

const DEFAULTS_PROGRAM: &str = "/usr/bin/defaults";

/// Reads and writes user defaults by shelling out to `defaults`
#[derive(Debug, Clone)]
pub struct DefaultsCommandStore {
    program: PathBuf,
}

impl DefaultsCommandStore {
    pub fn new() -> Self {
        Self::with_program(DEFAULTS_PROGRAM)
    }

    /// Use a different executable in place of `/usr/bin/defaults`
    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn run(&self, args: &[&str]) -> Option<Output> {
        match Command::new(&self.program).args(args).output() {
            Ok(output) => Some(output),
            Err(e) => {
                warn!("Failed to run {}: {}", self.program.display(), e);
                None
            }
        }
    }

    fn succeeded(&self, args: &[&str]) -> bool {
        let success = self
            .run(args)
            .map(|output| output.status.success())
            .unwrap_or(false);
        if !success {
            debug!("defaults {} failed", args.join(" "));
        }
        success
    }
}

impl Default for DefaultsCommandStore {
    fn default() -> Self {
        Self::new()
    }
}

impl PreferenceStore for DefaultsCommandStore {
    fn read_string(&self, domain: &str, key: &str) -> Option<String> {
        let output = self.run(&["read", domain, key])?;
        if !output.status.success() {
            // Missing keys exit non-zero
            return None;
        }
        let value = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if value.is_empty() {
            None
        } else {
            Some(value)
        }
    }

    fn write_string(&self, domain: &str, key: &str, value: &str) -> bool {
        self.succeeded(&["write", domain, key, "-string", value])
    }

    fn write_bool(&self, domain: &str, key: &str, value: bool) -> bool {
        let value = if value { "true" } else { "false" };
        self.succeeded(&["write", domain, key, "-bool", value])
    }

    fn remove(&self, domain: &str, key: &str) -> bool {
        self.succeeded(&["delete", domain, key])
    }
}

/// The preference store for the current platform
///
/// Hosts without `defaults` get an empty in-memory store, so detection falls
/// back to `~/Desktop` and the `Screenshot` prefix.
pub fn platform_store() -> Arc<dyn PreferenceStore> {
    if cfg!(target_os = "macos") {
        Arc::new(DefaultsCommandStore::new())
    } else {
        Arc::new(InMemoryPreferenceStore::new())
    }
}
