//! Host screenshot preferences
//!
//! The rename engine and watcher only ever see a [`Settings`] value. This
//! module derives one from a key-value [`PreferenceStore`], the way macOS
//! exposes its screenshot location and filename prefix.

use crate::error::{Error, Result};
use crate::settings::{Settings, DEFAULT_PREFIX};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use tracing::{debug, info, warn};

/// Preference domain holding the system screenshot settings
pub const SCREENCAPTURE_DOMAIN: &str = "com.apple.screencapture";

/// Preference domain for this application's own keys
pub const APP_DOMAIN: &str = "io.shotrename";

/// Key under [`APP_DOMAIN`] overriding the detected location
pub const CUSTOM_LOCATION_KEY: &str = "customScreenshotLocation";

const LOCATION_KEY: &str = "location";
const PREFIX_KEY: &str = "name";

/// Key-value store of host preferences
pub trait PreferenceStore: Send + Sync {
    /// Read a string value, `None` when unset or unreadable
    fn read_string(&self, domain: &str, key: &str) -> Option<String>;

    /// Write a string value, returning whether the write succeeded
    fn write_string(&self, domain: &str, key: &str, value: &str) -> bool;

    /// Write a boolean value, returning whether the write succeeded
    fn write_bool(&self, domain: &str, key: &str, value: bool) -> bool;

    /// Remove a value, returning whether the removal succeeded
    fn remove(&self, domain: &str, key: &str) -> bool;
}

/// Process-local [`PreferenceStore`]
#[derive(Debug, Default)]
pub struct InMemoryPreferenceStore {
    values: RwLock<HashMap<(String, String), String>>,
}

impl InMemoryPreferenceStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceStore for InMemoryPreferenceStore {
    fn read_string(&self, domain: &str, key: &str) -> Option<String> {
        let values = self.values.read().ok()?;
        values.get(&(domain.to_string(), key.to_string())).cloned()
    }

    fn write_string(&self, domain: &str, key: &str, value: &str) -> bool {
        match self.values.write() {
            Ok(mut values) => {
                values.insert((domain.to_string(), key.to_string()), value.to_string());
                true
            }
            Err(_) => false,
        }
    }

    fn write_bool(&self, domain: &str, key: &str, value: bool) -> bool {
        // `defaults read` reports booleans as 1/0
        self.write_string(domain, key, if value { "1" } else { "0" })
    }

    fn remove(&self, domain: &str, key: &str) -> bool {
        match self.values.write() {
            Ok(mut values) => {
                values.remove(&(domain.to_string(), key.to_string()));
                true
            }
            Err(_) => false,
        }
    }
}

/// Derives [`Settings`] from a preference store
///
/// Location priority: the application's custom location, then the system
/// screenshot location, then `~/Desktop`. Locations that are not existing
/// directories are skipped.
pub struct SettingsDetector {
    store: Arc<dyn PreferenceStore>,
    home: PathBuf,
}

impl SettingsDetector {
    /// Create a detector resolving `~` against the current user's home
    pub fn new(store: Arc<dyn PreferenceStore>) -> Result<Self> {
        let home = dirs::home_dir()
            .ok_or_else(|| Error::config("Unable to determine home directory"))?;
        Ok(Self::with_home(store, home))
    }

    /// Create a detector resolving `~` against `home`
    pub fn with_home(store: Arc<dyn PreferenceStore>, home: PathBuf) -> Self {
        Self { store, home }
    }

    /// Detect the screenshot directory and prefix
    pub fn detect(&self) -> Settings {
        let settings = Settings::new(self.detect_location(), self.detect_prefix());
        info!(
            "Detected settings - Location: {}, Prefix: {}",
            settings.directory.display(),
            settings.prefix
        );
        settings
    }

    /// Detect the screenshot directory
    pub fn detect_location(&self) -> PathBuf {
        if let Some(custom) = self.store.read_string(APP_DOMAIN, CUSTOM_LOCATION_KEY) {
            let path = self.expand_tilde(&custom);
            if path.is_dir() {
                debug!("Using custom screenshot location: {}", path.display());
                return path;
            }
            warn!(
                "Custom location {} is not a directory, clearing it",
                path.display()
            );
            self.clear_custom_location();
        }

        match self.store.read_string(SCREENCAPTURE_DOMAIN, LOCATION_KEY) {
            Some(location) if !location.trim().is_empty() => {
                let path = self.expand_tilde(location.trim());
                if path.is_dir() {
                    return path;
                }
                debug!(
                    "Screenshot location invalid or not a directory: {}",
                    path.display()
                );
                self.default_location()
            }
            _ => self.default_location(),
        }
    }

    /// Detect the screenshot filename prefix
    pub fn detect_prefix(&self) -> String {
        match self.store.read_string(SCREENCAPTURE_DOMAIN, PREFIX_KEY) {
            Some(prefix) if !prefix.trim().is_empty() => prefix.trim().to_string(),
            _ => DEFAULT_PREFIX.to_string(),
        }
    }

    /// Override the detected location with `location`
    pub fn set_custom_location(&self, location: &Path) -> bool {
        let written = self.store.write_string(
            APP_DOMAIN,
            CUSTOM_LOCATION_KEY,
            &location.to_string_lossy(),
        );
        if written {
            info!("Custom screenshot location set: {}", location.display());
        }
        written
    }

    /// Remove the custom location override
    pub fn clear_custom_location(&self) -> bool {
        let removed = self.store.remove(APP_DOMAIN, CUSTOM_LOCATION_KEY);
        if removed {
            info!("Custom screenshot location cleared");
        }
        removed
    }

    /// `~/Desktop`
    pub fn default_location(&self) -> PathBuf {
        self.home.join("Desktop")
    }

    fn expand_tilde(&self, path: &str) -> PathBuf {
        if path == "~" {
            self.home.clone()
        } else if let Some(rest) = path.strip_prefix("~/") {
            self.home.join(rest)
        } else {
            PathBuf::from(path)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn detector(store: &Arc<InMemoryPreferenceStore>, home: &Path) -> SettingsDetector {
        let store: Arc<dyn PreferenceStore> = Arc::clone(store) as Arc<dyn PreferenceStore>;
        SettingsDetector::with_home(store, home.to_path_buf())
    }

    #[test]
    fn test_defaults_when_store_is_empty() {
        let home = TempDir::new().expect("test setup failed");
        let store = Arc::new(InMemoryPreferenceStore::new());
        let settings = detector(&store, home.path()).detect();

        assert_eq!(settings.directory, home.path().join("Desktop"));
        assert_eq!(settings.prefix, "Screenshot");
    }

    #[test]
    fn test_system_location_with_tilde() {
        let home = TempDir::new().expect("test setup failed");
        std::fs::create_dir(home.path().join("Shots")).expect("test setup failed");
        let store = Arc::new(InMemoryPreferenceStore::new());
        store.write_string(SCREENCAPTURE_DOMAIN, "location", "~/Shots\n");
        store.write_string(SCREENCAPTURE_DOMAIN, "name", "Capture");

        let settings = detector(&store, home.path()).detect();
        assert_eq!(settings.directory, home.path().join("Shots"));
        assert_eq!(settings.prefix, "Capture");
    }

    #[test]
    fn test_missing_system_location_falls_back_to_desktop() {
        let home = TempDir::new().expect("test setup failed");
        let store = Arc::new(InMemoryPreferenceStore::new());
        store.write_string(SCREENCAPTURE_DOMAIN, "location", "/definitely/not/here");

        let location = detector(&store, home.path()).detect_location();
        assert_eq!(location, home.path().join("Desktop"));
    }

    #[test]
    fn test_custom_location_takes_priority() {
        let home = TempDir::new().expect("test setup failed");
        let custom = TempDir::new().expect("test setup failed");
        std::fs::create_dir(home.path().join("Shots")).expect("test setup failed");
        let store = Arc::new(InMemoryPreferenceStore::new());
        store.write_string(SCREENCAPTURE_DOMAIN, "location", "~/Shots");

        let detector = detector(&store, home.path());
        assert!(detector.set_custom_location(custom.path()));
        assert_eq!(detector.detect_location(), custom.path());

        assert!(detector.clear_custom_location());
        assert_eq!(detector.detect_location(), home.path().join("Shots"));
    }

    #[test]
    fn test_stale_custom_location_is_cleared() {
        let home = TempDir::new().expect("test setup failed");
        let store = Arc::new(InMemoryPreferenceStore::new());
        store.write_string(APP_DOMAIN, CUSTOM_LOCATION_KEY, "/gone/away");

        let location = detector(&store, home.path()).detect_location();
        assert_eq!(location, home.path().join("Desktop"));
        assert_eq!(store.read_string(APP_DOMAIN, CUSTOM_LOCATION_KEY), None);
    }

    #[test]
    fn test_blank_prefix_uses_default() {
        let home = TempDir::new().expect("test setup failed");
        let store = Arc::new(InMemoryPreferenceStore::new());
        store.write_string(SCREENCAPTURE_DOMAIN, "name", "  ");
        assert_eq!(detector(&store, home.path()).detect_prefix(), "Screenshot");
    }

    #[test]
    fn test_in_memory_store_bool_encoding() {
        let store = InMemoryPreferenceStore::new();
        assert!(store.write_bool(SCREENCAPTURE_DOMAIN, "show-thumbnail", false));
        assert_eq!(
            store.read_string(SCREENCAPTURE_DOMAIN, "show-thumbnail").as_deref(),
            Some("0")
        );
    }
}
