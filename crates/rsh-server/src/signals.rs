//! Signal wiring.
//!
//! SIGINT, SIGTERM and SIGQUIT all request a graceful shutdown through the
//! shared [`AbortSignal`]. SIGKILL cannot be caught.

use tracing::info;

use rsh_session::AbortSignal;

/// Spawn one listener task per shutdown signal. Must run inside a tokio runtime.
#[cfg(unix)]
pub fn install(abort: &AbortSignal) -> std::io::Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let kinds = [
        ("SIGINT", SignalKind::interrupt()),
        ("SIGTERM", SignalKind::terminate()),
        ("SIGQUIT", SignalKind::quit()),
    ];

    for (name, kind) in kinds {
        let mut stream = signal(kind)?;
        let abort = abort.clone();
        tokio::spawn(async move {
            while stream.recv().await.is_some() {
                info!("Received {}, shutting down", name);
                abort.trigger();
            }
        });
    }

    Ok(())
}

/// Spawn a Ctrl-C listener. Must run inside a tokio runtime.
#[cfg(not(unix))]
pub fn install(abort: &AbortSignal) -> std::io::Result<()> {
    let abort = abort.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Received Ctrl-C, shutting down");
                abort.trigger();
            }
            Err(e) => tracing::warn!("Failed to listen for Ctrl-C: {}", e),
        }
    });

    Ok(())
}
