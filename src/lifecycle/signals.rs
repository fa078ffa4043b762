//! OS signal handling.
//!
//! Translates SIGINT/SIGTERM into a return, which the caller turns into the
//! internal shutdown broadcast.

/// Wait for the first termination signal.
#[cfg(unix)]
pub async fn wait_for_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigterm = signal(SignalKind::terminate()).expect("Failed to install SIGTERM handler");

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            tracing::warn!("Received SIGINT, shutting down");
        }
        _ = sigterm.recv() => {
            tracing::warn!("Received SIGTERM, shutting down");
        }
    }
}

#[cfg(not(unix))]
pub async fn wait_for_signal() {
    let _ = tokio::signal::ctrl_c().await;
    tracing::warn!("Received Ctrl+C, shutting down");
}
