//! OS signal handling.
//!
//! # Responsibilities
//! - Register interest in SIGINT (Ctrl-C) and SIGTERM
//! - Translate either signal into a cancellation of the shared [`Shutdown`]
//! - Deregister on every exit path, whether a signal arrived or the
//!   shutdown was triggered by someone else first
//!
//! # Design Decisions
//! - Both signals mean "termination requested" and behave identically
//!   (systemd sends SIGTERM in production, Ctrl-C sends SIGINT in
//!   development)
//! - Deregistration is scoped: dropping the signal future releases the
//!   handler registrations, so no exit path can leak one

use crate::error::Error;
use crate::shutdown::Shutdown;

/// Run the signal watcher until a termination signal arrives or the shared
/// shutdown is triggered by someone else.
///
/// Returns `Err(Error::Terminated)` for a received signal so the enclosing
/// task group cancels the remaining servers; returns `Ok(())` when released
/// by an external trigger, so it never overwrites an already-retained
/// failure.
pub async fn watch(shutdown: Shutdown) -> Result<(), Error> {
    tokio::select! {
        _ = shutdown.cancelled() => {
            tracing::debug!("signal watcher released by shutdown");
            Ok(())
        }
        signal = termination() => {
            tracing::info!(signal, "received os signal, initiating shutdown");
            Err(Error::Terminated { signal })
        }
    }
}

/// Wait for SIGINT or SIGTERM and report which one arrived.
async fn termination() -> &'static str {
    let ctrl_c = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {}
            Err(err) => {
                tracing::error!(error = %err, "failed to install Ctrl+C handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => "SIGINT",
        _ = terminate => "SIGTERM",
    }
}
