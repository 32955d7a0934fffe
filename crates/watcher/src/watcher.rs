//! Directory watcher lifecycle
//!
//! This module owns the notify subscription and the processing worker and
//! moves them through the Stopped -> Starting -> Running -> Stopping states.

use crate::{
    config::WatcherConfig,
    events::ChangeBatch,
    queue::{RenameWorker, WatcherStats},
};
use notify::{
    Config as NotifyConfig, Event as NotifyEvent, RecommendedWatcher, RecursiveMode,
    Watcher as NotifyWatcher,
};
use shotrename_core::error::{Error, Result};
use shotrename_core::{PathValidator, RenameEngine, Settings};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace, warn};

/// Lifecycle state of a [`DirectoryWatcher`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatcherState {
    Stopped,
    Starting,
    Running,
    Stopping,
}

impl fmt::Display for WatcherState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Stopped => "stopped",
            Self::Starting => "starting",
            Self::Running => "running",
            Self::Stopping => "stopping",
        };
        f.write_str(name)
    }
}

/// Resources held while the watcher is running
struct Session {
    directory: PathBuf,
    notifier: RecommendedWatcher,
    /// Cleared before teardown so late notify callbacks become no-ops
    alive: Arc<AtomicBool>,
    cancel: CancellationToken,
    worker: JoinHandle<()>,
}

/// Watches one directory and renames screenshots as they appear
pub struct DirectoryWatcher {
    config: Arc<WatcherConfig>,
    state: WatcherState,
    session: Option<Session>,
    stats: Arc<WatcherStats>,
}

impl DirectoryWatcher {
    /// Create a stopped watcher
    pub fn new(config: WatcherConfig) -> Self {
        Self {
            config: Arc::new(config),
            state: WatcherState::Stopped,
            session: None,
            stats: Arc::new(WatcherStats::default()),
        }
    }

    /// Start watching `settings.directory`
    ///
    /// Does nothing when already running. Directory validation and
    /// subscription failures are returned and leave the watcher stopped.
    pub async fn start(&mut self, settings: Settings) -> Result<()> {
        if self.state == WatcherState::Running {
            debug!("Watcher already running");
            return Ok(());
        }

        self.state = WatcherState::Starting;
        match self.start_session(settings).await {
            Ok(session) => {
                info!("Started watching: {}", session.directory.display());
                self.session = Some(session);
                self.state = WatcherState::Running;
                Ok(())
            }
            Err(e) => {
                self.state = WatcherState::Stopped;
                Err(e)
            }
        }
    }

    async fn start_session(&self, settings: Settings) -> Result<Session> {
        if self.config.max_queue_size == 0 {
            return Err(Error::config("Watcher max_queue_size must be greater than 0"));
        }

        let whitelist = self
            .config
            .whitelist
            .clone()
            .unwrap_or_else(|| vec![settings.directory.clone()]);

        let directory = PathValidator::with_whitelist(whitelist.clone())
            .validate_directory(&settings.directory)?;

        let engine = RenameEngine::new(Settings::new(directory.clone(), settings.prefix))?
            .with_whitelist(whitelist);

        let (tx, rx) = mpsc::channel(self.config.max_queue_size);
        let cancel = CancellationToken::new();
        let alive = Arc::new(AtomicBool::new(true));

        let worker = RenameWorker::new(
            Arc::new(engine),
            self.config.debounce_duration(),
            rx,
            cancel.clone(),
            Arc::clone(&self.stats),
        );
        let worker = tokio::spawn(worker.run());

        let subscribed = match self.init_watcher_with_retry(&tx, &alive).await {
            Ok(mut notifier) => notifier
                .watch(&directory, RecursiveMode::NonRecursive)
                .map(|()| notifier)
                .map_err(|e| {
                    Error::watcher(format!("Failed to watch path {}: {e}", directory.display()))
                }),
            Err(e) => Err(e),
        };

        match subscribed {
            Ok(notifier) => Ok(Session {
                directory,
                notifier,
                alive,
                cancel,
                worker,
            }),
            Err(e) => {
                alive.store(false, Ordering::Release);
                cancel.cancel();
                if let Err(join_error) = worker.await {
                    error!("Rename worker failed during teardown: {}", join_error);
                }
                Err(e)
            }
        }
    }

    /// Initialize notify watcher with retry logic
    async fn init_watcher_with_retry(
        &self,
        tx: &mpsc::Sender<ChangeBatch>,
        alive: &Arc<AtomicBool>,
    ) -> Result<RecommendedWatcher> {
        let recovery = &self.config.recovery;
        let max_attempts = recovery.max_init_retries.max(1);
        let mut attempts = 0;

        loop {
            attempts += 1;

            match Self::create_notify_watcher(tx.clone(), Arc::clone(alive)) {
                Ok(watcher) => {
                    debug!("Directory watcher initialized");
                    return Ok(watcher);
                }
                Err(e) if attempts < max_attempts => {
                    warn!(
                        "Failed to initialize watcher (attempt {}/{}): {}",
                        attempts, max_attempts, e
                    );
                    tokio::time::sleep(recovery.retry_delay()).await;
                }
                Err(e) => {
                    error!("Failed to initialize watcher after {} attempts", attempts);
                    return Err(Error::watcher(format!(
                        "Watcher initialization failed: {e}"
                    )));
                }
            }
        }
    }

    /// Create a notify watcher feeding the change queue
    fn create_notify_watcher(
        tx: mpsc::Sender<ChangeBatch>,
        alive: Arc<AtomicBool>,
    ) -> Result<RecommendedWatcher> {
        RecommendedWatcher::new(
            move |res: std::result::Result<NotifyEvent, notify::Error>| {
                if !alive.load(Ordering::Acquire) {
                    return;
                }
                match res {
                    Ok(event) => {
                        trace!("Received notify event: {:?}", event);
                        let Some(batch) = ChangeBatch::from_notify(&event) else {
                            return;
                        };
                        match tx.try_send(batch) {
                            Ok(()) => {}
                            // The next pass rescans the directory anyway.
                            Err(TrySendError::Full(_)) => {
                                warn!("Change queue full, dropping notification")
                            }
                            Err(TrySendError::Closed(_)) => {
                                trace!("Change queue closed, dropping notification")
                            }
                        }
                    }
                    Err(e) => {
                        error!("Notify error: {}", e);
                    }
                }
            },
            NotifyConfig::default(),
        )
        .map_err(|e| Error::watcher(format!("Failed to create watcher: {e}")))
    }

    /// Stop watching
    ///
    /// Waits for an in-flight rename pass to finish; a pass that is only
    /// pending on the debounce never runs. Does nothing when stopped.
    pub async fn stop(&mut self) -> Result<()> {
        let Some(session) = self.session.take() else {
            return Ok(());
        };

        self.state = WatcherState::Stopping;
        session.alive.store(false, Ordering::Release);
        drop(session.notifier);
        session.cancel.cancel();

        let joined = session.worker.await;
        self.state = WatcherState::Stopped;
        joined.map_err(|e| Error::with_context("Rename worker failed", e))?;

        info!("Stopped watching: {}", session.directory.display());
        Ok(())
    }

    pub fn is_running(&self) -> bool {
        self.state == WatcherState::Running
    }

    pub fn state(&self) -> WatcherState {
        self.state
    }

    /// Canonical path of the watched directory while running
    pub fn watched_directory(&self) -> Option<&Path> {
        self.session.as_ref().map(|session| session.directory.as_path())
    }

    /// Counters shared with the processing worker
    pub fn stats(&self) -> Arc<WatcherStats> {
        Arc::clone(&self.stats)
    }
}

impl Drop for DirectoryWatcher {
    fn drop(&mut self) {
        if let Some(session) = self.session.take() {
            session.alive.store(false, Ordering::Release);
            session.cancel.cancel();
            debug!(
                "Watcher dropped while running: {}",
                session.directory.display()
            );
        }
    }
}
