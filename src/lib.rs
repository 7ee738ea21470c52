//! Coordinated startup and graceful shutdown for a group of servers.
//!
//! A [`Manager`] hosts any number of long-running server tasks (HTTP
//! listeners, RPC listeners, or custom [`ServiceAdapter`] implementations),
//! starts them together, and stops them together: the first failure from any
//! server, an OS termination signal, or an explicit [`Manager::stop`] call
//! all trigger one shared [`Shutdown`] token, after which every server is
//! asked to stop and drained before `run` returns.
//!
//! # Architecture Overview
//!
//! ```text
//!   Builder ──▶ Manager::run()
//!                   │
//!                   ├──▶ signal watcher task ────────┐
//!                   ├──▶ adapter task (serve) ────┐  │  first failure,
//!                   ├──▶ adapter task (serve) ────┼──┼─ SIGINT/SIGTERM,
//!                   └──▶ ...                      │  │  or stop()
//!                          TaskGroup ◀────────────┘  │      │
//!                              ▲                     ▼      ▼
//!                              │               Shutdown (shared token)
//!                      run() / stop()                │
//!                      await completion              ▼
//!                                          per-adapter stop watchers fire,
//!                                          request_stop() → serves return
//!                                          → group completes
//! ```
//!
//! # Example
//!
//! ```no_run
//! use server_lifecycle::Manager;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), server_lifecycle::Error> {
//!     let app = Manager::builder()
//!         .http(axum::Router::new(), "127.0.0.1:8082")
//!         .http(axum::Router::new(), "127.0.0.1:8083")
//!         .build();
//!
//!     // Blocks until a server fails, SIGINT/SIGTERM arrives,
//!     // or stop() is called from another task.
//!     app.run().await
//! }
//! ```

// Core coordination
pub mod group;
pub mod manager;
pub mod shutdown;
pub mod signals;

// Hosted-service boundary
pub mod adapter;
pub mod error;

pub use adapter::{HttpAdapter, RpcAdapter, RpcService, ServiceAdapter};
pub use error::Error;
pub use group::TaskGroup;
pub use manager::{Builder, Manager};
pub use shutdown::Shutdown;
