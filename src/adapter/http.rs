//! HTTP server adapter.
//!
//! Wraps an `axum::Router` and a bind address. Graceful shutdown goes
//! through axum's `with_graceful_shutdown`, which stops accepting and lets
//! in-flight connections drain before the serve call returns.

use std::sync::Mutex;

use async_trait::async_trait;
use tokio::net::TcpListener;

use crate::adapter::ServiceAdapter;
use crate::error::Error;
use crate::shutdown::Shutdown;

/// Adapter hosting one axum HTTP server.
pub struct HttpAdapter {
    endpoint: String,
    // Consumed by the single permitted serve() call.
    router: Mutex<Option<axum::Router>>,
    stop: Shutdown,
}

impl HttpAdapter {
    /// Create an adapter serving `router` on `endpoint`
    /// (e.g. `"127.0.0.1:8080"`). Binding is deferred to `serve`.
    pub fn new(router: axum::Router, endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            router: Mutex::new(Some(router)),
            stop: Shutdown::new(),
        }
    }
}

#[async_trait]
impl ServiceAdapter for HttpAdapter {
    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn serve(&self) -> Result<(), Error> {
        let router = self
            .router
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take();
        let Some(router) = router else {
            return Err(Error::serve(&self.endpoint, "serve invoked more than once"));
        };

        let listener = TcpListener::bind(&self.endpoint)
            .await
            .map_err(|err| Error::bind(&self.endpoint, err))?;
        let local_addr = listener
            .local_addr()
            .map_err(|err| Error::bind(&self.endpoint, err))?;

        tracing::info!(endpoint = %local_addr, "http server starting");

        let stop = self.stop.clone();
        axum::serve(listener, router)
            .with_graceful_shutdown(async move { stop.cancelled().await })
            .await
            .map_err(|err| Error::serve(&self.endpoint, err))?;

        tracing::info!(endpoint = %self.endpoint, "http server stopped");
        Ok(())
    }

    async fn request_stop(&self) {
        self.stop.trigger();
    }
}
