//! Periodic `lastMessageAt` reconciliation over open sessions.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::state::ConcreteSessionManager;

/// Spawn the sweep, or return `None` when `interval_secs` is 0.
///
/// The task exits at the next tick boundary after `cancel` fires; a sweep
/// already in progress finishes its current session first.
pub fn spawn_reconcile_sweep(
    chat: Arc<ConcreteSessionManager>,
    interval_secs: u64,
    cancel: CancellationToken,
) -> Option<JoinHandle<()>> {
    if interval_secs == 0 {
        tracing::debug!("Reconcile sweep disabled");
        return None;
    }

    Some(tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_secs(interval_secs));
        // The first tick completes immediately; skip it so startup stays quiet.
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {
                    match chat.reconcile_open().await {
                        Ok(0) => tracing::debug!("Reconcile sweep found nothing to repair"),
                        Ok(repaired) => tracing::info!(repaired, "Reconcile sweep repaired sessions"),
                        Err(e) => tracing::warn!(error = %e, "Reconcile sweep failed"),
                    }
                }
            }
        }

        tracing::debug!("Reconcile sweep stopped");
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::AppState;
    use peerline_types::config::GlobalConfig;

    async fn test_state() -> (AppState, tempfile::TempDir) {
        let tmp = tempfile::tempdir().unwrap();
        let state = AppState::init(tmp.path().to_path_buf(), GlobalConfig::default())
            .await
            .unwrap();
        (state, tmp)
    }

    #[tokio::test]
    async fn zero_interval_disables_sweep() {
        let (state, _tmp) = test_state().await;
        assert!(spawn_reconcile_sweep(state.chat.clone(), 0, CancellationToken::new()).is_none());
    }

    #[tokio::test]
    async fn sweep_stops_on_cancel() {
        let (state, _tmp) = test_state().await;
        let cancel = CancellationToken::new();
        let handle = spawn_reconcile_sweep(state.chat.clone(), 3600, cancel.clone()).unwrap();

        cancel.cancel();
        tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .expect("sweep did not stop")
            .unwrap();
    }
}
