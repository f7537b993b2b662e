use axum::{
    Json, Router,
    body::Body,
    extract::{Path, State},
    http::Request,
    middleware::{self, Next},
    response::Response,
    routing::post,
};
use validator::Validate;

use crate::{
    dto::{
        admin::{BroadcastRequest, StartCountdownRequest},
        public::GameStateSnapshot,
    },
    error::AppError,
    services::admin_service,
    state::SharedState,
};

const ADMIN_TOKEN_HEADER: &str = "x-admin-token";

/// Admin-only command endpoints mutating the singleton game state.
///
/// Every command answers with the snapshot the store confirmed, which is the
/// same payload pushed to the snapshot streams.
pub fn router(state: SharedState) -> Router<SharedState> {
    Router::new()
        .route("/admin/game/start", post(start_game))
        .route("/admin/game/floor/start", post(start_floor_countdown))
        .route("/admin/floors/{floor}/toggle", post(toggle_floor))
        .route("/admin/game/reset", post(reset_game))
        .route("/admin/broadcast", post(broadcast_message))
        .route_layer(middleware::from_fn_with_state(state, require_admin_token))
}

#[utoipa::path(
    post,
    path = "/admin/game/start",
    tag = "admin",
    params(("X-Admin-Token" = String, Header, description = "Admin token issued by the /sse/admin stream")),
    request_body = StartCountdownRequest,
    responses((status = 200, description = "Game started", body = GameStateSnapshot))
)]
/// Arm the main countdown for the requested number of minutes.
pub async fn start_game(
    State(state): State<SharedState>,
    Json(payload): Json<StartCountdownRequest>,
) -> Result<Json<GameStateSnapshot>, AppError> {
    payload.validate()?;
    Ok(Json(admin_service::start_game(&state, payload).await?))
}

#[utoipa::path(
    post,
    path = "/admin/game/floor/start",
    tag = "admin",
    params(("X-Admin-Token" = String, Header, description = "Admin token issued by the /sse/admin stream")),
    request_body = StartCountdownRequest,
    responses((status = 200, description = "Floor countdown started", body = GameStateSnapshot))
)]
/// Arm the secondary floor-closing countdown.
pub async fn start_floor_countdown(
    State(state): State<SharedState>,
    Json(payload): Json<StartCountdownRequest>,
) -> Result<Json<GameStateSnapshot>, AppError> {
    payload.validate()?;
    Ok(Json(
        admin_service::start_floor_countdown(&state, payload).await?,
    ))
}

#[utoipa::path(
    post,
    path = "/admin/floors/{floor}/toggle",
    tag = "admin",
    params(("X-Admin-Token" = String, Header, description = "Admin token issued by the /sse/admin stream"),
    ("floor" = u8, Path, description = "Floor index between 0 and 9")),
    responses((status = 200, description = "Floor toggled", body = GameStateSnapshot))
)]
/// Toggle one floor of the board on or off.
pub async fn toggle_floor(
    State(state): State<SharedState>,
    Path(floor): Path<u8>,
) -> Result<Json<GameStateSnapshot>, AppError> {
    Ok(Json(admin_service::toggle_floor(&state, floor).await?))
}

#[utoipa::path(
    post,
    path = "/admin/game/reset",
    tag = "admin",
    params(("X-Admin-Token" = String, Header, description = "Admin token issued by the /sse/admin stream")),
    responses((status = 200, description = "Game reset", body = GameStateSnapshot))
)]
/// Stop both countdowns, darken the board, and clear the broadcast message.
pub async fn reset_game(
    State(state): State<SharedState>,
) -> Result<Json<GameStateSnapshot>, AppError> {
    Ok(Json(admin_service::reset_game(&state).await?))
}

#[utoipa::path(
    post,
    path = "/admin/broadcast",
    tag = "admin",
    params(("X-Admin-Token" = String, Header, description = "Admin token issued by the /sse/admin stream")),
    request_body = BroadcastRequest,
    responses((status = 200, description = "Broadcast message updated", body = GameStateSnapshot))
)]
/// Replace the operator broadcast message shown on every player display.
pub async fn broadcast_message(
    State(state): State<SharedState>,
    Json(payload): Json<BroadcastRequest>,
) -> Result<Json<GameStateSnapshot>, AppError> {
    Ok(Json(
        admin_service::broadcast_message(&state, payload.message).await?,
    ))
}

async fn require_admin_token(
    State(state): State<SharedState>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let provided = req
        .headers()
        .get(ADMIN_TOKEN_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.to_owned())
        .ok_or_else(|| {
            AppError::Unauthorized("missing admin token header `X-Admin-Token`".into())
        })?;

    let expected = {
        let guard = state.admin_token().lock().await;
        guard.clone()
    };

    match expected {
        Some(token) if token == provided => Ok(next.run(req).await),
        Some(_) => Err(AppError::Unauthorized("invalid admin token".into())),
        None => Err(AppError::Unauthorized(
            "admin stream not initialised yet".into(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use tower::ServiceExt;

    use crate::dao::state_store::{StateStore, memory::MemoryStateStore};
    use crate::services::sse_service;
    use crate::state::AppState;

    use super::*;

    async fn ready_router() -> (axum::Router, SharedState) {
        let state = AppState::new();
        let store = MemoryStateStore::default();
        let initial = store.fetch_state().await.unwrap();
        state.install_state_store(Arc::new(store), initial).await;
        (crate::routes::router(state.clone()), state)
    }

    fn reset_request(token: Option<&str>) -> Request<Body> {
        let builder = Request::builder().method("POST").uri("/admin/game/reset");
        let builder = match token {
            Some(token) => builder.header(ADMIN_TOKEN_HEADER, token),
            None => builder,
        };
        builder.body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn commands_without_a_token_are_rejected() {
        let (router, _state) = ready_router().await;

        let response = router.oneshot(reset_request(None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn commands_with_a_wrong_token_are_rejected() {
        let (router, state) = ready_router().await;
        let (_receiver, _token) = sse_service::subscribe_admin(&state).await.unwrap();

        let response = router
            .oneshot(reset_request(Some("not-the-token")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn commands_with_the_claimed_token_go_through() {
        let (router, state) = ready_router().await;
        let (_receiver, token) = sse_service::subscribe_admin(&state).await.unwrap();

        let response = router.oneshot(reset_request(Some(&token))).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
