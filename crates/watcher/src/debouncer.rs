//! Trailing-edge debounce with a single deadline
//!
//! Every scheduled batch pushes the one deadline out to `now + window`, so a
//! burst of notifications produces exactly one rename pass once it settles.

use std::future::pending;
use std::pin::Pin;
use std::time::Duration;
use tokio::time::{sleep, Instant, Sleep};
use tracing::trace;

/// Owns the pending deadline of a watcher's processing worker
pub(crate) struct Debouncer {
    window: Duration,
    deadline: Option<Pin<Box<Sleep>>>,
}

impl Debouncer {
    pub(crate) fn new(window: Duration) -> Self {
        Self {
            window,
            deadline: None,
        }
    }

    /// Arm the deadline, superseding any pending one
    pub(crate) fn schedule(&mut self) {
        let next = Instant::now() + self.window;
        match self.deadline.as_mut() {
            Some(deadline) => {
                trace!("Resetting pending debounce deadline");
                deadline.as_mut().reset(next);
            }
            None => {
                trace!("Arming debounce deadline");
                self.deadline = Some(Box::pin(sleep(self.window)));
            }
        }
    }

    /// Drop the pending deadline, returning whether one was armed
    pub(crate) fn cancel(&mut self) -> bool {
        self.deadline.take().is_some()
    }

    pub(crate) fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// Resolve once the armed deadline passes; never resolves when disarmed
    ///
    /// Cancel safe: dropping the future before it resolves keeps the deadline.
    pub(crate) async fn elapsed(&mut self) {
        match self.deadline.as_mut() {
            Some(deadline) => {
                deadline.as_mut().await;
                self.deadline = None;
            }
            None => pending::<()>().await,
        }
    }
}
