//! Settings resolution for CLI commands
//!
//! Command-line flags win over the config file, which wins over whatever the
//! host preferences report.

use shotrename_core::{Config, Settings, SettingsDetector};
use std::path::PathBuf;
use tracing::debug;

/// Directory and prefix given on the command line
#[derive(Debug, Clone, Default)]
pub struct SettingsOverrides {
    pub directory: Option<PathBuf>,
    pub prefix: Option<String>,
}

/// Combine flags, config and detected preferences into session settings
pub fn resolve_settings(
    overrides: SettingsOverrides,
    config: &Config,
    detector: &SettingsDetector,
) -> Settings {
    let directory = overrides
        .directory
        .or_else(|| config.rename.directory.clone())
        .unwrap_or_else(|| detector.detect_location());
    let prefix = overrides
        .prefix
        .or_else(|| config.rename.prefix.clone())
        .unwrap_or_else(|| detector.detect_prefix());

    debug!(
        "Resolved settings - Location: {}, Prefix: {}",
        directory.display(),
        prefix
    );
    Settings::new(directory, prefix)
}

/// Whitelist for a one-off rename pass: flags plus configured entries
pub fn rename_whitelist(flags: Vec<PathBuf>, config: &Config) -> Option<Vec<PathBuf>> {
    let mut whitelist = flags;
    whitelist.extend(config.rename.whitelist.iter().cloned());
    if whitelist.is_empty() {
        None
    } else {
        Some(whitelist)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use shotrename_core::{InMemoryPreferenceStore, PreferenceStore};
    use std::sync::Arc;
    use tempfile::TempDir;

    fn detector(home: &TempDir, prefix: Option<&str>) -> SettingsDetector {
        let store = InMemoryPreferenceStore::new();
        if let Some(prefix) = prefix {
            store.write_string("com.apple.screencapture", "name", prefix);
        }
        SettingsDetector::with_home(Arc::new(store), home.path().to_path_buf())
    }

    #[test]
    fn test_flags_win() {
        let home = TempDir::new().expect("test setup failed");
        let mut config = Config::default();
        config.rename.directory = Some(PathBuf::from("/from/config"));
        config.rename.prefix = Some("Config".to_string());

        let settings = resolve_settings(
            SettingsOverrides {
                directory: Some(PathBuf::from("/from/flag")),
                prefix: Some("Flag".to_string()),
            },
            &config,
            &detector(&home, Some("Detected")),
        );

        assert_eq!(settings, Settings::new("/from/flag", "Flag"));
    }

    #[test]
    fn test_config_beats_detection() {
        let home = TempDir::new().expect("test setup failed");
        let mut config = Config::default();
        config.rename.prefix = Some("Config".to_string());

        let settings = resolve_settings(
            SettingsOverrides::default(),
            &config,
            &detector(&home, Some("Detected")),
        );

        assert_eq!(settings.prefix, "Config");
        assert_eq!(settings.directory, home.path().join("Desktop"));
    }

    #[test]
    fn test_detection_fills_gaps() {
        let home = TempDir::new().expect("test setup failed");
        let settings = resolve_settings(
            SettingsOverrides {
                directory: Some(PathBuf::from("/from/flag")),
                prefix: None,
            },
            &Config::default(),
            &detector(&home, Some("Capture")),
        );

        assert_eq!(settings, Settings::new("/from/flag", "Capture"));
    }

    #[test]
    fn test_rename_whitelist_merges_sources() {
        let mut config = Config::default();
        assert_eq!(rename_whitelist(Vec::new(), &config), None);

        config.rename.whitelist = vec![PathBuf::from("/config")];
        assert_eq!(
            rename_whitelist(vec![PathBuf::from("/flag")], &config),
            Some(vec![PathBuf::from("/flag"), PathBuf::from("/config")])
        );
    }
}
