//! Concurrent task supervision.
//!
//! # Responsibilities
//! - Launch independent tasks and track how many are still running
//! - Retain the first failure (write-once); log and discard later ones
//! - Trigger the shared [`Shutdown`] the first time any task fails
//! - Let any number of callers await group completion
//!
//! # Design Decisions
//! - "First failure" is defined by completion order, not launch order.
//!   Near-simultaneous failures may retain either one; that is intentional.
//! - The outstanding counter lives in a `watch` channel so waiters suspend
//!   without polling and multiple waiters (`run` and `stop`) can wait on
//!   the same completion.

use std::future::Future;
use std::sync::{Arc, Mutex};

use tokio::sync::watch;

use crate::error::Error;
use crate::shutdown::Shutdown;

/// Supervisor for a group of concurrently running tasks.
///
/// Mirrors an errgroup: the first task to fail cancels the shared
/// [`Shutdown`] token, and [`wait`](TaskGroup::wait) returns that first
/// failure once every launched task has completed.
pub struct TaskGroup {
    shutdown: Shutdown,
    outstanding: watch::Sender<usize>,
    first_error: Arc<Mutex<Option<Error>>>,
}

impl TaskGroup {
    /// Create a group bound to the given shutdown token.
    pub fn new(shutdown: Shutdown) -> Self {
        let (outstanding, _) = watch::channel(0);
        Self {
            shutdown,
            outstanding,
            first_error: Arc::new(Mutex::new(None)),
        }
    }

    /// Launch one more unit of work into the group.
    ///
    /// The task runs on the tokio runtime independently of the caller. If it
    /// completes with a failure and no prior failure has been retained, the
    /// group retains it and triggers the shared shutdown so all other tasks
    /// receive the cancellation signal.
    pub fn launch<F>(&self, label: &str, task: F)
    where
        F: Future<Output = Result<(), Error>> + Send + 'static,
    {
        // Counted before spawning so a wait() racing the spawn cannot
        // observe a spuriously-empty group.
        self.outstanding.send_modify(|n| *n += 1);

        let outstanding = self.outstanding.clone();
        let first_error = Arc::clone(&self.first_error);
        let shutdown = self.shutdown.clone();
        let label = label.to_string();

        tokio::spawn(async move {
            if let Err(err) = task.await {
                let retained = {
                    let mut slot = first_error.lock().unwrap_or_else(|e| e.into_inner());
                    if slot.is_none() {
                        *slot = Some(err.clone());
                        true
                    } else {
                        false
                    }
                };
                if retained {
                    tracing::error!(task = %label, error = %err, "task failed, cancelling group");
                    shutdown.trigger();
                } else {
                    // Observed but not retained; never dropped silently.
                    tracing::warn!(task = %label, error = %err, "additional task failure discarded");
                }
            }
            outstanding.send_modify(|n| *n -= 1);
        });
    }

    /// Wait until every launched task has completed.
    ///
    /// Returns the retained first failure, if any. Safe to call from any
    /// number of tasks concurrently; all of them observe the same outcome.
    /// A group with zero launched tasks completes immediately.
    pub async fn wait(&self) -> Result<(), Error> {
        let mut rx = self.outstanding.subscribe();
        // Cannot fail: `self` keeps the sender alive for the whole wait.
        let _ = rx.wait_for(|n| *n == 0).await;

        let slot = self.first_error.lock().unwrap_or_else(|e| e.into_inner());
        match slot.as_ref() {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}
