//! Lifecycle manager for a group of hosted servers.
//!
//! # Data Flow
//! ```text
//! Builder (options applied in order)
//!     → Manager { Shutdown, TaskGroup, adapters }
//!     → run(): launch signal watcher + one task per adapter, await group
//!     → stop(): trigger shutdown, await the same group
//! ```
//!
//! # Design Decisions
//! - The builder is consumed by `build`, so registering an adapter after
//!   `run` has started is unrepresentable
//! - `stop` mirrors `run`'s wait: it returns only once every adapter has
//!   actually stopped, and is safe to call repeatedly or concurrently
//! - Which adapter stops first during shutdown is unordered; the only
//!   guarantee is that no stop watcher fires before the trigger

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::Instrument;

use crate::adapter::{HttpAdapter, RpcAdapter, RpcService, ServiceAdapter};
use crate::error::Error;
use crate::group::TaskGroup;
use crate::shutdown::Shutdown;
use crate::signals;

/// Configuration options for a [`Manager`], applied in order.
pub struct Builder {
    adapters: Vec<Arc<dyn ServiceAdapter>>,
    shutdown: Option<Shutdown>,
    span: Option<tracing::Span>,
}

impl Builder {
    fn new() -> Self {
        Self {
            adapters: Vec::new(),
            shutdown: None,
            span: None,
        }
    }

    /// Register one HTTP server (an axum router) on `endpoint`.
    pub fn http(mut self, router: axum::Router, endpoint: impl Into<String>) -> Self {
        self.adapters.push(Arc::new(HttpAdapter::new(router, endpoint)));
        self
    }

    /// Register one RPC server on `endpoint`.
    pub fn rpc<S: RpcService>(mut self, service: S, endpoint: impl Into<String>) -> Self {
        self.adapters.push(Arc::new(RpcAdapter::new(service, endpoint)));
        self
    }

    /// Register a custom adapter.
    pub fn adapter(mut self, adapter: Arc<dyn ServiceAdapter>) -> Self {
        self.adapters.push(adapter);
        self
    }

    /// Scope the manager's log events inside `span` instead of the default
    /// `lifecycle` span.
    pub fn span(mut self, span: tracing::Span) -> Self {
        self.span = Some(span);
        self
    }

    /// Use a caller-supplied shutdown token as the root instead of creating
    /// one. Useful for tests and for hanging the manager off a pre-existing
    /// cancellation tree.
    pub fn shutdown(mut self, shutdown: Shutdown) -> Self {
        self.shutdown = Some(shutdown);
        self
    }

    /// Assemble the manager. The adapter list is frozen from here on.
    pub fn build(self) -> Manager {
        let shutdown = self.shutdown.unwrap_or_default();
        let group = TaskGroup::new(shutdown.clone());
        Manager {
            shutdown,
            group,
            adapters: self.adapters,
            span: self.span.unwrap_or_else(|| tracing::info_span!("lifecycle")),
            started: AtomicBool::new(false),
        }
    }
}

/// Owner of the shared shutdown token, the registered adapters, and the
/// task group supervising them.
///
/// Typically wrapped in an `Arc` so `run` and `stop` can be called from
/// different tasks.
pub struct Manager {
    shutdown: Shutdown,
    group: TaskGroup,
    adapters: Vec<Arc<dyn ServiceAdapter>>,
    span: tracing::Span,
    started: AtomicBool,
}

impl Manager {
    /// Start building a manager.
    pub fn builder() -> Builder {
        Builder::new()
    }

    /// Start every registered server plus the signal watcher, then block
    /// until the whole group has shut down.
    ///
    /// Returns `Ok(())` after an orderly stop, or the first retained
    /// failure: a bind or serve error naming the offending endpoint, or
    /// [`Error::Terminated`] for an OS signal.
    ///
    /// # Panics
    ///
    /// Panics if called more than once on the same manager; that is a
    /// caller contract violation, not a runtime condition.
    pub async fn run(&self) -> Result<(), Error> {
        assert!(
            !self.started.swap(true, Ordering::SeqCst),
            "Manager::run may be called at most once"
        );
        self.run_inner().instrument(self.span.clone()).await
    }

    async fn run_inner(&self) -> Result<(), Error> {
        tracing::info!(servers = self.adapters.len(), "starting");

        self.group.launch(
            "signal-watcher",
            signals::watch(self.shutdown.clone()).instrument(self.span.clone()),
        );

        for adapter in &self.adapters {
            // Each task captures its own adapter handle.
            let adapter = Arc::clone(adapter);
            let endpoint = adapter.endpoint().to_string();
            let shutdown = self.shutdown.clone();
            let span = self.span.clone();

            self.group.launch(
                &endpoint,
                async move {
                    // Stop watcher: fires once the shared shutdown triggers,
                    // whatever triggered it.
                    let watcher_adapter = Arc::clone(&adapter);
                    tokio::spawn(
                        async move {
                            shutdown.cancelled().await;
                            tracing::info!(
                                endpoint = %watcher_adapter.endpoint(),
                                "requesting server stop"
                            );
                            watcher_adapter.request_stop().await;
                        }
                        .instrument(span.clone()),
                    );

                    tracing::info!(endpoint = %adapter.endpoint(), "starting server");
                    adapter.serve().await
                }
                .instrument(self.span.clone()),
            );
        }

        self.group.wait().await
    }

    /// Trigger shutdown and block until every adapter has stopped.
    ///
    /// Mirrors `run`'s wait, so it is synchronous with the actual shutdown.
    /// Idempotent: triggering an already-triggered token is a no-op, and
    /// concurrent callers all wait for the same completion. Always returns
    /// `Ok(())` once the group has drained; a retained failure is `run`'s
    /// to report, so stopping after a failure is a safe no-op.
    pub async fn stop(&self) -> Result<(), Error> {
        async {
            tracing::info!("stopping all servers");
            self.shutdown.trigger();
            if let Err(err) = self.group.wait().await {
                tracing::debug!(error = %err, "group retained a failure, reported by run");
            }
            Ok(())
        }
        .instrument(self.span.clone())
        .await
    }
}
