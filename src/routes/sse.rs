use std::convert::Infallible;

use axum::{Router, extract::State, response::sse::Sse, routing::get};
use futures::Stream;
use tracing::info;

use crate::{
    error::AppError,
    services::sse_service::{self, StreamKind},
    state::SharedState,
};

#[utoipa::path(
    get,
    path = "/sse/public",
    tag = "sse",
    responses((status = 200, description = "Whole-state snapshot stream", content_type = "text/event-stream", body = String))
)]
/// Stream full game-state snapshots to connected clients on every change.
pub async fn public_stream(
    State(state): State<SharedState>,
) -> Sse<impl Stream<Item = Result<axum::response::sse::Event, Infallible>>> {
    let receiver = sse_service::subscribe_public(&state);
    info!("New public snapshot connection");
    sse_service::broadcast_public_info(state.public_sync(), "public stream connected");
    sse_service::to_sse_stream(receiver, StreamKind::Public)
}

#[utoipa::path(
    get,
    path = "/sse/admin",
    tag = "sse",
    responses((status = 200, description = "Admin snapshot stream", content_type = "text/event-stream", body = String))
)]
/// Stream admin events, establishing or validating the admin token.
pub async fn admin_stream(
    State(state): State<SharedState>,
) -> Result<Sse<impl Stream<Item = Result<axum::response::sse::Event, Infallible>>>, AppError> {
    let (receiver, token) = sse_service::subscribe_admin(&state).await?;
    info!("New admin snapshot connection");
    sse_service::broadcast_admin_handshake(state.admin_sync(), &token);
    Ok(sse_service::to_sse_stream(
        receiver,
        StreamKind::Admin(state),
    ))
}

#[utoipa::path(
    get,
    path = "/sse/player",
    tag = "sse",
    responses((status = 200, description = "Ticking player view stream", content_type = "text/event-stream", body = String))
)]
/// Stream the derived player view, re-emitted every second and on change.
pub async fn player_stream(
    State(state): State<SharedState>,
) -> Sse<impl Stream<Item = Result<axum::response::sse::Event, Infallible>>> {
    info!("New player view connection");
    sse_service::player_view_stream(state)
}

/// Configure the SSE endpoints.
pub fn router() -> Router<SharedState> {
    Router::<SharedState>::new()
        .route("/sse/public", get(public_stream))
        .route("/sse/admin", get(admin_stream))
        .route("/sse/player", get(player_stream))
}
