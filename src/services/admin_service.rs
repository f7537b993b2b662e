//! Business logic powering the admin REST routes. Every command is an
//! idempotent partial update of the singleton record: build a patch, write
//! it through the store, adopt the record the store confirms, and fan the
//! new snapshot out to all subscribers.
//!
//! The cached-state write lock is held across the store round trip, so
//! commands are serialized and a toggle always computes its symmetric
//! difference against the freshest confirmed base. A rejected write leaves
//! the cache untouched; the caller sees the error synchronously.

use time::OffsetDateTime;
use tracing::info;

use crate::{
    dao::state_store::StateStore,
    dto::{admin::StartCountdownRequest, public::GameStateSnapshot, validation::validate_floor},
    error::ServiceError,
    services::sse_service,
    state::{
        SharedState,
        game::{GameState, GameStatePatch},
    },
};

/// Arm the main countdown and stop any leftover floor-closing countdown.
pub async fn start_game(
    state: &SharedState,
    payload: StartCountdownRequest,
) -> Result<GameStateSnapshot, ServiceError> {
    let now = OffsetDateTime::now_utc();
    let confirmed = submit(state, GameStatePatch::start_game(now, payload.duration_minutes)).await?;
    info!(duration_minutes = payload.duration_minutes, "game started");
    Ok(confirmed.into())
}

/// Arm the secondary floor-closing countdown.
pub async fn start_floor_countdown(
    state: &SharedState,
    payload: StartCountdownRequest,
) -> Result<GameStateSnapshot, ServiceError> {
    let now = OffsetDateTime::now_utc();
    let confirmed =
        submit(state, GameStatePatch::start_floor(now, payload.duration_minutes)).await?;
    info!(
        duration_minutes = payload.duration_minutes,
        "floor countdown started"
    );
    Ok(confirmed.into())
}

/// Toggle one floor: lit floors go dark, dark floors light up.
///
/// The new floor set is computed under the state lock from the last
/// confirmed record, so two admins toggling concurrently cannot clobber
/// each other with stale whole-set writes.
pub async fn toggle_floor(state: &SharedState, floor: u8) -> Result<GameStateSnapshot, ServiceError> {
    validate_floor(floor).map_err(|err| {
        ServiceError::InvalidInput(
            err.message
                .map(|m| m.to_string())
                .unwrap_or_else(|| "floor out of range".into()),
        )
    })?;

    let store = state.require_state_store().await?;
    let mut guard = state.game().write().await;
    let base = guard
        .as_ref()
        .ok_or_else(|| ServiceError::NotFound("game state not fetched yet".into()))?;

    let patch = GameStatePatch::set_floors(base.toggled_floors(floor));
    let confirmed = store.update_state(patch).await?;
    *guard = Some(confirmed.clone());
    // Publish before releasing the guard so snapshots fan out in commit order.
    sse_service::broadcast_state(state, &confirmed);
    drop(guard);

    info!(floor, "floor toggled");
    Ok(confirmed.into())
}

/// Stop both countdowns, darken the board, and clear the broadcast message.
pub async fn reset_game(state: &SharedState) -> Result<GameStateSnapshot, ServiceError> {
    let confirmed = submit(state, GameStatePatch::reset()).await?;
    info!("game reset");
    Ok(confirmed.into())
}

/// Replace the operator broadcast message verbatim.
pub async fn broadcast_message(
    state: &SharedState,
    message: String,
) -> Result<GameStateSnapshot, ServiceError> {
    let confirmed = submit(state, GameStatePatch::broadcast(message)).await?;
    info!("broadcast message updated");
    Ok(confirmed.into())
}

/// Write a patch through the store and adopt + publish the confirmed record.
async fn submit(state: &SharedState, patch: GameStatePatch) -> Result<GameState, ServiceError> {
    let store = state.require_state_store().await?;

    let mut guard = state.game().write().await;
    let confirmed = store.update_state(patch).await?;
    *guard = Some(confirmed.clone());
    // Publish before releasing the guard so snapshots fan out in commit order.
    sse_service::broadcast_state(state, &confirmed);
    drop(guard);

    Ok(confirmed)
}
