//! Service helpers that expose read-only projections of the current game.

use time::OffsetDateTime;

use crate::{
    dto::public::{AdminView, GameStateSnapshot, PlayerView},
    error::ServiceError,
    state::SharedState,
};

/// Return the last confirmed copy of the singleton record.
///
/// Until the initial fetch has succeeded there is no state to serve; that
/// surfaces as degraded mode rather than an empty default.
pub async fn game_snapshot(state: &SharedState) -> Result<GameStateSnapshot, ServiceError> {
    let game = state.cached_state().await.ok_or(ServiceError::Degraded)?;
    Ok(game.into())
}

/// Project the current state into the player display.
pub async fn player_view(state: &SharedState) -> Result<PlayerView, ServiceError> {
    let game = state.cached_state().await.ok_or(ServiceError::Degraded)?;
    Ok(PlayerView::project(&game, OffsetDateTime::now_utc()))
}

/// Project the current state into the admin control panel.
pub async fn admin_view(state: &SharedState) -> Result<AdminView, ServiceError> {
    let degraded = state.is_degraded().await;
    let game = state.cached_state().await.ok_or(ServiceError::Degraded)?;
    Ok(AdminView::project(&game, OffsetDateTime::now_utc(), degraded))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::dao::state_store::{StateStore, memory::MemoryStateStore};
    use crate::state::AppState;

    use super::*;

    #[tokio::test]
    async fn views_report_degraded_before_the_initial_fetch() {
        let state = AppState::new();
        assert!(matches!(
            player_view(&state).await.unwrap_err(),
            ServiceError::Degraded
        ));
        assert!(matches!(
            game_snapshot(&state).await.unwrap_err(),
            ServiceError::Degraded
        ));
    }

    #[tokio::test]
    async fn snapshot_serves_the_installed_state() {
        let state = AppState::new();
        let store = MemoryStateStore::default();
        let initial = store.fetch_state().await.unwrap();
        state.install_state_store(Arc::new(store), initial).await;

        let snapshot = game_snapshot(&state).await.unwrap();
        assert!(!snapshot.is_running);

        let view = admin_view(&state).await.unwrap();
        assert_eq!(view.status, "standby");
        assert!(!view.degraded);
    }
}
