//! Shared test adapters for the lifecycle integration tests.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use server_lifecycle::{Error, ServiceAdapter, Shutdown};

/// Controllable in-process adapter: serves until asked to stop, optionally
/// failing immediately or draining for a while before returning.
pub struct MockAdapter {
    endpoint: String,
    stop: Shutdown,
    stop_calls: AtomicUsize,
    drain: Option<Duration>,
    fail_on_start: bool,
    finished: AtomicBool,
}

#[allow(dead_code)]
impl MockAdapter {
    pub fn new(endpoint: &str) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            stop: Shutdown::new(),
            stop_calls: AtomicUsize::new(0),
            drain: None,
            fail_on_start: false,
            finished: AtomicBool::new(false),
        }
    }

    /// Adapter whose serve fails immediately instead of blocking.
    pub fn failing(endpoint: &str) -> Self {
        let mut adapter = Self::new(endpoint);
        adapter.fail_on_start = true;
        adapter
    }

    /// Simulate a slow connection drain after the stop request.
    pub fn with_drain(mut self, drain: Duration) -> Self {
        self.drain = Some(drain);
        self
    }

    /// How many times request_stop has been invoked.
    pub fn stop_calls(&self) -> usize {
        self.stop_calls.load(Ordering::SeqCst)
    }

    /// Whether serve has returned cleanly.
    pub fn finished(&self) -> bool {
        self.finished.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ServiceAdapter for MockAdapter {
    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn serve(&self) -> Result<(), Error> {
        if self.fail_on_start {
            return Err(Error::serve(&self.endpoint, "synthetic failure"));
        }
        self.stop.cancelled().await;
        if let Some(drain) = self.drain {
            tokio::time::sleep(drain).await;
        }
        self.finished.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn request_stop(&self) {
        self.stop_calls.fetch_add(1, Ordering::SeqCst);
        self.stop.trigger();
    }
}
