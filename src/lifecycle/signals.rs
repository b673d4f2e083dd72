//! OS signal handling.
//!
//! SIGINT (Ctrl+C) and, on Unix, SIGTERM are the process-exit hook: either
//! one triggers a graceful shutdown of the server.

use super::shutdown::Shutdown;

/// Wait for SIGINT or SIGTERM.
pub async fn exit_signal() -> std::io::Result<()> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut terminate = signal(SignalKind::terminate())?;
        tokio::select! {
            res = tokio::signal::ctrl_c() => res,
            _ = terminate.recv() => Ok(()),
        }
    }

    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c().await
    }
}

/// Spawn a task that triggers `shutdown` when the process is asked to exit.
///
/// The task also ends quietly if shutdown is triggered some other way.
pub fn install_exit_hook(shutdown: Shutdown) -> tokio::task::JoinHandle<()> {
    let done = shutdown.subscribe();
    tokio::spawn(async move {
        tokio::select! {
            res = exit_signal() => match res {
                Ok(()) => {
                    tracing::info!("Shutdown signal received");
                    shutdown.trigger();
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to install signal handler");
                }
            },
            _ = done.wait() => {}
        }
    })
}
