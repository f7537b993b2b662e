pub mod countdown;
pub mod game;
mod sync;

use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};

use crate::{dao::state_store::StateStore, error::ServiceError, state::game::GameState};

pub use self::sync::SyncHub;
use self::sync::SyncState;

/// Cheaply cloneable handle on the central application state.
pub type SharedState = Arc<AppState>;

/// Central application state: the store handle, the cached copy of the
/// singleton game record, and the snapshot fan-out hubs.
pub struct AppState {
    state_store: RwLock<Option<Arc<dyn StateStore>>>,
    sync: SyncState,
    game: RwLock<Option<GameState>>,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    ///
    /// The application starts in degraded mode, with no cached game state,
    /// until a storage backend is installed by the supervisor.
    pub fn new() -> SharedState {
        Arc::new(Self {
            state_store: RwLock::new(None),
            sync: SyncState::new(16, 16),
            game: RwLock::new(None),
        })
    }

    /// Obtain a handle to the current state store, if one is installed.
    pub async fn state_store(&self) -> Option<Arc<dyn StateStore>> {
        let guard = self.state_store.read().await;
        guard.as_ref().cloned()
    }

    /// Obtain the state store or fail with a degraded-mode error.
    pub async fn require_state_store(&self) -> Result<Arc<dyn StateStore>, ServiceError> {
        self.state_store().await.ok_or(ServiceError::Degraded)
    }

    /// Install a state store together with the initial snapshot it served,
    /// leaving degraded mode.
    pub async fn install_state_store(&self, store: Arc<dyn StateStore>, initial: GameState) {
        {
            let mut guard = self.state_store.write().await;
            *guard = Some(store);
        }
        {
            let mut guard = self.game.write().await;
            *guard = Some(initial);
        }
    }

    /// Remove the current state store and enter degraded mode.
    ///
    /// The cached snapshot is kept so read-only views can keep rendering the
    /// last confirmed state while the supervisor reconnects.
    pub async fn clear_state_store(&self) {
        let mut guard = self.state_store.write().await;
        guard.take();
    }

    /// Current degraded flag: true while no store is installed.
    pub async fn is_degraded(&self) -> bool {
        let guard = self.state_store.read().await;
        guard.is_none()
    }

    /// Hub used for the public snapshot stream.
    pub fn public_sync(&self) -> &SyncHub {
        self.sync.public()
    }

    /// Hub used for the admin snapshot stream.
    pub fn admin_sync(&self) -> &SyncHub {
        self.sync.admin().hub()
    }

    /// Token guard that ensures a single admin subscriber at a time.
    pub fn admin_token(&self) -> &Mutex<Option<String>> {
        self.sync.admin().token()
    }

    /// Clone of the last state confirmed by the store, if any was fetched.
    pub async fn cached_state(&self) -> Option<GameState> {
        let guard = self.game.read().await;
        guard.clone()
    }

    /// Lock guarding the cached game state.
    ///
    /// Commands hold the write guard across their read-modify-write span so
    /// concurrent toggles cannot interleave on a stale base.
    pub fn game(&self) -> &RwLock<Option<GameState>> {
        &self.game
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dao::state_store::memory::MemoryStateStore;

    #[tokio::test]
    async fn starts_degraded_until_a_store_is_installed() {
        let state = AppState::new();
        assert!(state.is_degraded().await);
        assert!(state.cached_state().await.is_none());
        assert!(matches!(
            state.require_state_store().await.unwrap_err(),
            ServiceError::Degraded
        ));

        state
            .install_state_store(Arc::new(MemoryStateStore::default()), GameState::idle())
            .await;
        assert!(!state.is_degraded().await);
        assert_eq!(state.cached_state().await, Some(GameState::idle()));
    }

    #[tokio::test]
    async fn clearing_the_store_keeps_the_last_snapshot() {
        let state = AppState::new();
        state
            .install_state_store(Arc::new(MemoryStateStore::default()), GameState::idle())
            .await;

        state.clear_state_store().await;

        assert!(state.is_degraded().await);
        // Read-only views keep rendering the last confirmed state.
        assert_eq!(state.cached_state().await, Some(GameState::idle()));
    }
}
