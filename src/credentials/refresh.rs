//! Background credential refresh.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::credentials::cache::CredentialCache;

/// Spawn the periodic reload task.
///
/// Failures are logged and the previous snapshot keeps serving; the task
/// never crashes the process. It stops as soon as the shutdown signal
/// arrives, so it cannot race a closing store.
pub fn spawn_refresh(
    cache: Arc<CredentialCache>,
    period: Duration,
    mut shutdown: broadcast::Receiver<()>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick fires immediately; startup already did that load.
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if let Err(e) = cache.reload().await {
                        tracing::error!(error = %e, "credential refresh failed, serving previous snapshot");
                    }
                }
                _ = shutdown.recv() => {
                    tracing::debug!("credential refresh task stopping");
                    break;
                }
            }
        }
    })
}
