//! Hosted-service boundary.
//!
//! # Data Flow
//! ```text
//! Manager::run()
//!     → one task per adapter
//!         → spawns a stop watcher (awaits the shared Shutdown,
//!           then calls request_stop exactly once)
//!         → awaits serve() until stopped or failed
//!     → outcome, annotated with the adapter's endpoint,
//!       funnelled into the TaskGroup
//! ```
//!
//! # Design Decisions
//! - The manager depends only on this trait, never on concrete server
//!   types; new service kinds plug in without touching the manager
//! - Binding happens inside `serve` so a bind failure is reported as a
//!   distinct, immediate outcome
//! - A serve that returns because it was asked to stop is success, not
//!   failure: an orderly stop never surfaces as an error

use async_trait::async_trait;

use crate::error::Error;

pub mod http;
pub mod rpc;

pub use http::HttpAdapter;
pub use rpc::{RpcAdapter, RpcService};

/// Capability contract the manager requires from any hosted service.
#[async_trait]
pub trait ServiceAdapter: Send + Sync + 'static {
    /// Address or endpoint identifier, used for logging and error
    /// annotation (and, for listener adapters, for binding).
    fn endpoint(&self) -> &str;

    /// Serve until asked to stop or until the service fails on its own.
    ///
    /// Invoked at most once per adapter. Must return promptly once
    /// [`request_stop`](ServiceAdapter::request_stop) has been invoked,
    /// after whatever draining the implementation performs. Returning
    /// because of a requested stop is `Ok`.
    async fn serve(&self) -> Result<(), Error>;

    /// Cause a concurrently-running `serve` to return.
    ///
    /// Must be non-blocking or bounded. Invoked at most once by the
    /// manager, only after the shared shutdown has triggered.
    async fn request_stop(&self);
}
