//! shotrename CLI - Screenshot renamer
//!
//! This binary provides the command-line interface for one-off rename passes
//! and continuous directory watching.

#![deny(warnings)]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use shotrename::{platform_store, rename_whitelist, resolve_settings, SettingsOverrides};
use shotrename_core::config::Config;
use shotrename_core::{RenameEngine, SettingsDetector};
use shotrename_watcher::{DirectoryWatcher, WatcherConfig};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "shotrename")]
#[command(about = "Rename screenshots to sortable 24-hour filenames")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Rename existing screenshots once
    Rename {
        /// Directory to scan (defaults to the screenshot location)
        directory: Option<PathBuf>,

        /// Screenshot filename prefix
        #[arg(long)]
        prefix: Option<String>,

        /// Only operate inside these directories
        #[arg(long, value_name = "DIR")]
        whitelist: Vec<PathBuf>,
    },
    /// Watch a directory and rename new screenshots until interrupted
    Watch {
        /// Directory to watch (defaults to the screenshot location)
        directory: Option<PathBuf>,

        /// Screenshot filename prefix
        #[arg(long)]
        prefix: Option<String>,
    },
    /// Show the detected screenshot settings
    Detect {
        /// Remember a custom screenshot location
        #[arg(long, value_name = "DIR")]
        set_location: Option<PathBuf>,

        /// Forget the custom screenshot location
        #[arg(long, conflicts_with = "set_location")]
        clear_location: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    init_logging(cli.verbose)?;

    let config = load_config(cli.config.as_deref())?;
    let detector = SettingsDetector::new(platform_store())?;

    // Execute commands
    match cli.command {
        Commands::Rename {
            directory,
            prefix,
            whitelist,
        } => {
            let overrides = SettingsOverrides { directory, prefix };
            rename(overrides, whitelist, &config, &detector).await
        }
        Commands::Watch { directory, prefix } => {
            let overrides = SettingsOverrides { directory, prefix };
            watch(overrides, &config, &detector).await
        }
        Commands::Detect {
            set_location,
            clear_location,
        } => detect(set_location.as_deref(), clear_location, &detector),
    }
}

/// Initialize logging system
fn init_logging(verbose: bool) -> Result<()> {
    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "shotrename={level},shotrename_core={level},shotrename_watcher={level}"
        ))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {e}"))?;

    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    let config = Config::load(path).context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;
    Ok(config)
}

/// Run a single rename pass
async fn rename(
    overrides: SettingsOverrides,
    whitelist: Vec<PathBuf>,
    config: &Config,
    detector: &SettingsDetector,
) -> Result<()> {
    let settings = resolve_settings(overrides, config, detector);
    info!(
        "Renaming screenshots in {} (prefix: {})",
        settings.directory.display(),
        settings.prefix
    );

    let mut engine = RenameEngine::new(settings)?;
    if let Some(whitelist) = rename_whitelist(whitelist, config) {
        engine = engine.with_whitelist(whitelist);
    }

    let outcome = Arc::new(engine)
        .run_async()
        .await
        .context("Rename pass failed")?;

    if outcome.has_failures() {
        warn!("{} file(s) could not be renamed", outcome.failures().len());
    }
    println!("{}", outcome.detailed_summary());
    Ok(())
}

/// Watch until Ctrl-C, then stop cleanly
async fn watch(
    overrides: SettingsOverrides,
    config: &Config,
    detector: &SettingsDetector,
) -> Result<()> {
    let settings = resolve_settings(overrides, config, detector);

    let mut watcher_config = WatcherConfig::from(&config.watcher);
    watcher_config.whitelist = config.whitelist();

    let mut watcher = DirectoryWatcher::new(watcher_config);
    watcher
        .start(settings)
        .await
        .context("Failed to start watcher")?;

    println!("Watching for screenshots. Press Ctrl-C to stop.");
    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for Ctrl-C")?;

    info!("Shutting down watcher");
    watcher.stop().await.context("Failed to stop watcher")?;

    let stats = watcher.stats().snapshot();
    println!(
        "Renamed {} screenshot(s) in {} pass(es)",
        stats.files_renamed, stats.passes_completed
    );
    Ok(())
}

/// Print the detected settings, optionally changing the custom location first
fn detect(
    set_location: Option<&Path>,
    clear_location: bool,
    detector: &SettingsDetector,
) -> Result<()> {
    if let Some(location) = set_location {
        let location = location
            .canonicalize()
            .with_context(|| format!("Invalid location: {}", location.display()))?;
        if !detector.set_custom_location(&location) {
            anyhow::bail!("Failed to store custom location {}", location.display());
        }
    } else if clear_location && !detector.clear_custom_location() {
        anyhow::bail!("Failed to clear custom location");
    }

    let settings = detector.detect();
    let json =
        serde_json::to_string_pretty(&settings).context("Failed to serialize settings")?;
    println!("{json}");
    Ok(())
}
