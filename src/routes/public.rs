use axum::{Json, Router, extract::State, routing::get};

use crate::{
    dto::public::{AdminView, GameStateSnapshot, PlayerView},
    error::AppError,
    services::public_service,
    state::SharedState,
};

/// Public read-only endpoints exposing the current game state and views.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/", get(player_page))
        .route("/admin", get(admin_page))
        .route("/state", get(game_state))
}

#[utoipa::path(
    get,
    path = "/",
    tag = "public",
    responses(
        (status = 200, description = "Player display projection", body = PlayerView),
        (status = 503, description = "No state fetched yet (degraded mode)")
    )
)]
/// Return the player display: clocks, floor board, and broadcast message.
pub async fn player_page(State(state): State<SharedState>) -> Result<Json<PlayerView>, AppError> {
    let payload = public_service::player_view(&state).await?;
    Ok(Json(payload))
}

#[utoipa::path(
    get,
    path = "/admin",
    tag = "public",
    responses(
        (status = 200, description = "Admin control panel projection", body = AdminView),
        (status = 503, description = "No state fetched yet (degraded mode)")
    )
)]
/// Return the admin panel projection of the current state.
pub async fn admin_page(State(state): State<SharedState>) -> Result<Json<AdminView>, AppError> {
    let payload = public_service::admin_view(&state).await?;
    Ok(Json(payload))
}

#[utoipa::path(
    get,
    path = "/state",
    tag = "public",
    responses(
        (status = 200, description = "Raw snapshot of the singleton record", body = GameStateSnapshot),
        (status = 503, description = "No state fetched yet (degraded mode)")
    )
)]
/// Return the last confirmed snapshot; clients fetch this once before
/// attaching to the snapshot stream.
pub async fn game_state(
    State(state): State<SharedState>,
) -> Result<Json<GameStateSnapshot>, AppError> {
    let payload = public_service::game_snapshot(&state).await?;
    Ok(Json(payload))
}
