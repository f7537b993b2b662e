//! Supervises the connection to the persistence collaborator, retrying in
//! the background and toggling degraded mode when connectivity changes.

use std::time::Duration;

use tokio::time::sleep;
use tracing::{info, warn};

use crate::{
    dao::state_store::{
        StateStore,
        http::{HttpStateStore, HttpStoreConfig},
    },
    state::SharedState,
};

const INITIAL_DELAY: Duration = Duration::from_millis(1000);
const MAX_DELAY: Duration = Duration::from_secs(10);
const HEALTHY_PING_INTERVAL: Duration = Duration::from_secs(5);
const MAX_RECONNECT_ATTEMPTS: u32 = 3;

/// Keep the store connection alive for the lifetime of the process.
///
/// On first success the initial snapshot of the singleton record is fetched
/// and installed together with the store handle, which is what moves the
/// application out of degraded mode. A failed health check first tries to
/// reconnect the existing store; only after exhausting those attempts is the
/// store dropped and a fresh connection negotiated.
pub async fn run_store_supervisor(state: SharedState, config: HttpStoreConfig) {
    let mut delay = INITIAL_DELAY;

    loop {
        if let Some(store) = state.state_store().await {
            match store.health_check().await {
                Ok(_) => {
                    // Healthy connection: reset the retry backoff and avoid
                    // hammering the store with pings.
                    delay = INITIAL_DELAY;
                    sleep(HEALTHY_PING_INTERVAL).await;
                }
                Err(err) => {
                    warn!(error = %err, "store health check failed");
                    if reconnect_with_backoff(store.as_ref()).await {
                        info!("store reconnection succeeded after failed health check");
                        delay = INITIAL_DELAY;
                        sleep(HEALTHY_PING_INTERVAL).await;
                    } else {
                        // The existing connection is beyond saving: drop it,
                        // flip to degraded mode, and negotiate from scratch.
                        warn!("exhausted store reconnect attempts; entering degraded mode");
                        state.clear_state_store().await;
                        sleep(delay).await;
                        delay = (delay * 2).min(MAX_DELAY);
                    }
                }
            }
            continue;
        }

        match HttpStateStore::connect(config.clone()).await {
            Ok(store) => match store.fetch_state().await {
                Ok(initial) => {
                    // Fresh connection and initial snapshot in hand: install
                    // both and leave degraded mode.
                    info!("connected to store; leaving degraded mode");
                    state
                        .install_state_store(std::sync::Arc::new(store), initial)
                        .await;
                    delay = INITIAL_DELAY;
                }
                Err(err) => {
                    // Connection succeeded but the singleton could not be
                    // read: retry after backing off.
                    warn!(error = %err, "failed to fetch initial game state; retrying");
                    sleep(delay).await;
                    delay = (delay * 2).min(MAX_DELAY);
                }
            },
            Err(err) => {
                // Could not reach the store at all: wait and retry with
                // exponential backoff.
                warn!(error = %err, "store connection attempt failed");
                sleep(delay).await;
                delay = (delay * 2).min(MAX_DELAY);
            }
        }
    }
}

/// Try to revive an unhealthy store in place, backing off between attempts.
/// Returns false once [`MAX_RECONNECT_ATTEMPTS`] failures pile up.
async fn reconnect_with_backoff(store: &dyn StateStore) -> bool {
    let mut reconnect_delay = INITIAL_DELAY;

    for attempt in 0..MAX_RECONNECT_ATTEMPTS {
        match store.try_reconnect().await {
            Ok(()) => return true,
            Err(err) => {
                warn!(attempt, error = %err, "store reconnect attempt failed");
                sleep(reconnect_delay).await;
                reconnect_delay = (reconnect_delay * 2).min(MAX_DELAY);
            }
        }
    }

    false
}

#[cfg(test)]
mod tests {
    use std::sync::{
        Arc,
        atomic::{AtomicU32, Ordering},
    };

    use futures::future::BoxFuture;

    use crate::dao::storage::{StorageError, StorageResult};
    use crate::state::game::{GameState, GameStatePatch};

    use super::*;

    /// Store whose reconnect fails a configurable number of times first.
    #[derive(Debug)]
    struct FlakyStore {
        failures_left: Arc<AtomicU32>,
        attempts: Arc<AtomicU32>,
    }

    impl FlakyStore {
        fn failing(times: u32) -> Self {
            Self {
                failures_left: Arc::new(AtomicU32::new(times)),
                attempts: Arc::new(AtomicU32::new(0)),
            }
        }
    }

    impl StateStore for FlakyStore {
        fn fetch_state(&self) -> BoxFuture<'static, StorageResult<GameState>> {
            Box::pin(async { Ok(GameState::idle()) })
        }

        fn update_state(
            &self,
            _patch: GameStatePatch,
        ) -> BoxFuture<'static, StorageResult<GameState>> {
            Box::pin(async { Ok(GameState::idle()) })
        }

        fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
            Box::pin(async { Ok(()) })
        }

        fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            let failures_left = self.failures_left.clone();
            Box::pin(async move {
                if failures_left
                    .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| {
                        left.checked_sub(1)
                    })
                    .is_ok()
                {
                    Err(StorageError::rejected("still unreachable"))
                } else {
                    Ok(())
                }
            })
        }
    }

    #[tokio::test(start_paused = true)]
    async fn reconnect_recovers_within_the_attempt_budget() {
        let store = FlakyStore::failing(2);
        assert!(reconnect_with_backoff(&store).await);
        assert_eq!(store.attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn reconnect_gives_up_after_exhausting_attempts() {
        let store = FlakyStore::failing(u32::MAX);
        assert!(!reconnect_with_backoff(&store).await);
        assert_eq!(store.attempts.load(Ordering::SeqCst), MAX_RECONNECT_ATTEMPTS);
    }
}
