//! Shutdown coordination for hosted servers.
//!
//! # Responsibilities
//! - Provide one shared cancellation token all long-running tasks observe
//! - Guarantee set-once semantics: triggering twice is a no-op
//! - Guarantee stickiness: a task that starts waiting after the trigger
//!   still observes the cancellation
//!
//! # Design Decisions
//! - Built on `tokio::sync::watch` so the triggered state is readable at any
//!   time, not just deliverable to receivers that were already subscribed

use tokio::sync::watch;

/// Shared cancellation token for graceful shutdown.
///
/// Cloning is cheap; all clones observe the same trigger. The token is
/// one-way: once triggered it stays triggered.
#[derive(Debug, Clone)]
pub struct Shutdown {
    tx: watch::Sender<bool>,
}

impl Shutdown {
    /// Create a new, untriggered token.
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx }
    }

    /// Trigger the shutdown signal.
    ///
    /// Returns `true` if this call performed the trigger, `false` if the
    /// token was already triggered.
    pub fn trigger(&self) -> bool {
        self.tx.send_if_modified(|triggered| {
            if *triggered {
                false
            } else {
                *triggered = true;
                true
            }
        })
    }

    /// Whether the token has been triggered.
    pub fn is_triggered(&self) -> bool {
        *self.tx.borrow()
    }

    /// Wait until the token is triggered.
    ///
    /// Completes immediately if the trigger already happened.
    pub async fn cancelled(&self) {
        let mut rx = self.tx.subscribe();
        // Cannot fail: `self` keeps the sender alive for the whole wait.
        let _ = rx.wait_for(|triggered| *triggered).await;
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}
