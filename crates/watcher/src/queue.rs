//! Processing worker and its statistics
//!
//! One worker task per running watcher receives change batches, filters them,
//! drives the debouncer and runs rename passes. Passes are awaited inline, so
//! two passes from the same watcher never overlap.

use crate::debouncer::Debouncer;
use crate::events::ChangeBatch;
use crate::filter::BatchFilter;
use serde::Serialize;
use shotrename_core::RenameEngine;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace, warn};

/// Counters updated by the processing worker
#[derive(Debug, Default)]
pub struct WatcherStats {
    batches_received: AtomicU64,
    batches_matched: AtomicU64,
    passes_completed: AtomicU64,
    files_renamed: AtomicU64,
    pass_failures: AtomicU64,
}

/// Point-in-time copy of [`WatcherStats`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    pub batches_received: u64,
    pub batches_matched: u64,
    pub passes_completed: u64,
    pub files_renamed: u64,
    pub pass_failures: u64,
}

impl WatcherStats {
    /// Change batches that reached the worker
    pub fn batches_received(&self) -> u64 {
        self.batches_received.load(Ordering::Relaxed)
    }

    /// Batches that passed the pre-filter and (re)armed the debounce
    pub fn batches_matched(&self) -> u64 {
        self.batches_matched.load(Ordering::Relaxed)
    }

    /// Rename passes that ran to completion
    pub fn passes_completed(&self) -> u64 {
        self.passes_completed.load(Ordering::Relaxed)
    }

    /// Files renamed across all passes
    pub fn files_renamed(&self) -> u64 {
        self.files_renamed.load(Ordering::Relaxed)
    }

    /// Passes aborted by a directory-level error
    pub fn pass_failures(&self) -> u64 {
        self.pass_failures.load(Ordering::Relaxed)
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            batches_received: self.batches_received(),
            batches_matched: self.batches_matched(),
            passes_completed: self.passes_completed(),
            files_renamed: self.files_renamed(),
            pass_failures: self.pass_failures(),
        }
    }
}

/// The single consumer of a watcher's change queue
pub(crate) struct RenameWorker {
    engine: Arc<RenameEngine>,
    filter: BatchFilter,
    debouncer: Debouncer,
    rx: mpsc::Receiver<ChangeBatch>,
    cancel: CancellationToken,
    stats: Arc<WatcherStats>,
}

impl RenameWorker {
    pub(crate) fn new(
        engine: Arc<RenameEngine>,
        debounce: Duration,
        rx: mpsc::Receiver<ChangeBatch>,
        cancel: CancellationToken,
        stats: Arc<WatcherStats>,
    ) -> Self {
        let filter = BatchFilter::new(engine.grammar().clone());
        Self {
            engine,
            filter,
            debouncer: Debouncer::new(debounce),
            rx,
            cancel,
            stats,
        }
    }

    /// Process batches until cancelled or the queue closes
    ///
    /// An elapsed deadline wins over queued batches, so a steady stream of
    /// notifications cannot keep re-arming a pass that is already due.
    pub(crate) async fn run(mut self) {
        debug!(
            "Rename worker started for {}",
            self.engine.settings().directory.display()
        );

        loop {
            tokio::select! {
                biased;

                _ = self.cancel.cancelled() => {
                    if self.debouncer.cancel() {
                        debug!("Discarded pending rename pass on shutdown");
                    }
                    break;
                }
                _ = self.debouncer.elapsed() => self.run_pass().await,
                batch = self.rx.recv() => match batch {
                    Some(batch) => self.handle_batch(batch),
                    None => {
                        debug!("Change queue closed");
                        break;
                    }
                },
            }
        }

        debug!("Rename worker stopped");
    }

    fn handle_batch(&mut self, batch: ChangeBatch) {
        self.stats.batches_received.fetch_add(1, Ordering::Relaxed);

        if !self.filter.is_relevant(&batch) {
            trace!("Ignoring batch of {} path(s)", batch.len());
            return;
        }

        self.stats.batches_matched.fetch_add(1, Ordering::Relaxed);
        let rearmed = self.debouncer.is_pending();
        self.debouncer.schedule();
        trace!(rearmed, "Scheduled rename pass for {} path(s)", batch.len());
    }

    async fn run_pass(&mut self) {
        match Arc::clone(&self.engine).run_async().await {
            Ok(outcome) => {
                self.stats.passes_completed.fetch_add(1, Ordering::Relaxed);
                self.stats
                    .files_renamed
                    .fetch_add(outcome.renamed() as u64, Ordering::Relaxed);

                if outcome.has_failures() {
                    warn!("{}", outcome.detailed_summary());
                } else if outcome.renamed() > 0 {
                    info!("{}", outcome.summary());
                } else {
                    debug!("{}", outcome.summary());
                }
            }
            Err(e) => {
                self.stats.pass_failures.fetch_add(1, Ordering::Relaxed);
                if e.is_directory_error() {
                    error!(
                        "Watched directory {} is unusable: {}",
                        self.engine.settings().directory.display(),
                        e
                    );
                } else {
                    error!("Rename pass failed: {}", e);
                }
            }
        }
    }
}
