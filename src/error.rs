//! Error taxonomy for hosted servers.

use std::fmt;

/// Error surfaced by [`Manager::run`](crate::Manager::run) and
/// [`Manager::stop`](crate::Manager::stop).
///
/// `Clone` so every concurrent waiter on the task group observes the same
/// retained failure.
#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    /// An adapter could not acquire its listening socket. Reported before
    /// the server ever accepted a connection.
    #[error("failed to bind {endpoint}: {reason}")]
    Bind { endpoint: String, reason: String },

    /// An adapter's serve loop exited with an error that was not caused by
    /// a requested stop.
    #[error("server {endpoint} exited: {reason}")]
    Serve { endpoint: String, reason: String },

    /// The signal watcher observed an OS termination signal. A failure only
    /// in the sense that it cancels the group; see [`Error::is_termination`].
    #[error("received os signal: {signal}")]
    Terminated { signal: &'static str },
}

impl Error {
    /// Bind failure for the given endpoint.
    pub fn bind(endpoint: impl Into<String>, reason: impl fmt::Display) -> Self {
        Self::Bind {
            endpoint: endpoint.into(),
            reason: reason.to_string(),
        }
    }

    /// Runtime serve failure for the given endpoint.
    pub fn serve(endpoint: impl Into<String>, reason: impl fmt::Display) -> Self {
        Self::Serve {
            endpoint: endpoint.into(),
            reason: reason.to_string(),
        }
    }

    /// The endpoint of the adapter that produced this error, if any.
    pub fn endpoint(&self) -> Option<&str> {
        match self {
            Error::Bind { endpoint, .. } | Error::Serve { endpoint, .. } => Some(endpoint),
            Error::Terminated { .. } => None,
        }
    }

    /// Whether this is a clean termination by signal rather than a service
    /// error. Callers typically exit 0 for signal terminations.
    pub fn is_termination(&self) -> bool {
        matches!(self, Error::Terminated { .. })
    }
}
