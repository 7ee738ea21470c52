//! RPC server adapter.
//!
//! # Responsibilities
//! - Bind the endpoint and accept TCP connections for a connection-oriented
//!   RPC service
//! - Hand each connection to the wrapped [`RpcService`]
//! - On stop: close the listener, then drain in-flight connections
//!
//! # Design Decisions
//! - The drain is unbounded by default, delegated to the connection
//!   handlers; `with_grace_period` bounds it for deployments that prefer a
//!   deadline over a clean drain
//! - In-flight connections are counted in a `watch` channel so the drain
//!   suspends without polling

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::watch;

use crate::adapter::ServiceAdapter;
use crate::error::Error;
use crate::shutdown::Shutdown;

/// Connection handler supplied by the hosted RPC server.
#[async_trait]
pub trait RpcService: Send + Sync + 'static {
    /// Handle one accepted connection until it is finished.
    async fn handle(&self, stream: TcpStream, peer: SocketAddr);
}

/// Adapter hosting one connection-oriented RPC server on a TCP endpoint.
pub struct RpcAdapter<S> {
    endpoint: String,
    service: Arc<S>,
    stop: Shutdown,
    grace: Option<Duration>,
    in_flight: watch::Sender<usize>,
}

impl<S: RpcService> RpcAdapter<S> {
    /// Create an adapter serving `service` on `endpoint`. Binding is
    /// deferred to `serve`.
    pub fn new(service: S, endpoint: impl Into<String>) -> Self {
        let (in_flight, _) = watch::channel(0);
        Self {
            endpoint: endpoint.into(),
            service: Arc::new(service),
            stop: Shutdown::new(),
            grace: None,
            in_flight,
        }
    }

    /// Bound the shutdown drain: connections still in flight when the grace
    /// period elapses are abandoned instead of awaited.
    pub fn with_grace_period(mut self, grace: Duration) -> Self {
        self.grace = Some(grace);
        self
    }

    /// Wait for in-flight connections to finish, up to the grace period.
    async fn drain(&self) {
        let mut rx = self.in_flight.subscribe();
        let pending = *rx.borrow();
        if pending > 0 {
            tracing::info!(
                endpoint = %self.endpoint,
                in_flight = pending,
                "draining connections"
            );
        }

        let drained = async {
            let _ = rx.wait_for(|n| *n == 0).await;
        };
        match self.grace {
            Some(grace) => {
                if tokio::time::timeout(grace, drained).await.is_err() {
                    tracing::warn!(
                        endpoint = %self.endpoint,
                        "grace period elapsed, abandoning in-flight connections"
                    );
                }
            }
            None => drained.await,
        }
    }
}

#[async_trait]
impl<S: RpcService> ServiceAdapter for RpcAdapter<S> {
    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn serve(&self) -> Result<(), Error> {
        let listener = TcpListener::bind(&self.endpoint)
            .await
            .map_err(|err| Error::bind(&self.endpoint, err))?;

        tracing::info!(endpoint = %self.endpoint, "rpc server starting");

        loop {
            tokio::select! {
                accepted = listener.accept() => {
                    let (stream, peer) = match accepted {
                        Ok(conn) => conn,
                        Err(err) => return Err(Error::serve(&self.endpoint, err)),
                    };
                    tracing::debug!(endpoint = %self.endpoint, peer = %peer, "connection accepted");

                    self.in_flight.send_modify(|n| *n += 1);
                    let service = Arc::clone(&self.service);
                    let in_flight = self.in_flight.clone();
                    tokio::spawn(async move {
                        service.handle(stream, peer).await;
                        in_flight.send_modify(|n| *n -= 1);
                    });
                }
                _ = self.stop.cancelled() => break,
            }
        }

        // Stop accepting before draining what is already in flight.
        drop(listener);
        self.drain().await;

        tracing::info!(endpoint = %self.endpoint, "rpc server stopped");
        Ok(())
    }

    async fn request_stop(&self) {
        self.stop.trigger();
    }
}
