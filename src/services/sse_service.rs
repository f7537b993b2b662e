//! Snapshot fan-out and SSE stream plumbing.
//!
//! Two kinds of stream exist: raw snapshot streams (public and admin) that
//! emit a `state` event whenever the singleton record changes, and the
//! player view stream that re-derives the display projection on a fixed
//! one-second tick in addition to every state change. All of them terminate
//! when the client disconnects; dropping the response stream is the
//! unsubscribe.

use std::{convert::Infallible, time::Duration};

use axum::response::sse::{Event, KeepAlive, Sse};
use futures::Stream;
use time::OffsetDateTime;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tokio_stream::wrappers::ReceiverStream;
use uuid::Uuid;

use crate::{
    dto::{
        public::{GameStateSnapshot, PlayerView},
        sse::{AdminHandshake, ServerEvent},
    },
    error::ServiceError,
    state::{SharedState, SyncHub, game::GameState},
};

const STATE_EVENT: &str = "state";
const VIEW_EVENT: &str = "view";

/// Subscribe to the shared public snapshot stream.
pub fn subscribe_public(state: &SharedState) -> broadcast::Receiver<ServerEvent> {
    state.public_sync().subscribe()
}

/// Subscribe to the admin-only snapshot stream.
pub async fn subscribe_admin(
    state: &SharedState,
) -> Result<(broadcast::Receiver<ServerEvent>, String), ServiceError> {
    let token = claim_admin_token(state).await?;
    let receiver = state.admin_sync().subscribe();
    Ok((receiver, token))
}

/// Identifies the target SSE stream so we can perform stream-specific
/// bookkeeping when the connection is torn down.
#[derive(Clone)]
pub enum StreamKind {
    Public,
    /// Carries a clone of the shared application state so teardown logic can
    /// reset the admin token after the spawned task completes. Cloning
    /// `SharedState` is cheap because it is just bumping the inner `Arc`.
    Admin(SharedState),
}

/// Convert a broadcast receiver into an SSE response, forwarding events and
/// cleaning up once the client disconnects.
pub fn to_sse_stream(
    mut receiver: broadcast::Receiver<ServerEvent>,
    kind: StreamKind,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    // small bounded channel between forwarder and response
    let (tx, rx) = mpsc::channel::<Result<Event, Infallible>>(8);

    // forwarder task: reads from broadcast and pushes into mpsc
    tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = tx.closed() => break,
                recv_result = receiver.recv() => {
                    match recv_result {
                        Ok(payload) => {
                            let mut event = Event::default().data(payload.data);
                            if let Some(name) = payload.event {
                                event = event.event(name);
                            }

                            if tx.send(Ok(event)).await.is_err() {
                                break;
                            }
                        }
                        Err(RecvError::Closed) => break,
                        Err(RecvError::Lagged(_)) => {
                            // Skip lagged messages but keep the stream alive.
                            continue;
                        }
                    }
                }
            }
        }

        match kind {
            StreamKind::Public => tracing::info!("Public snapshot stream disconnected"),
            StreamKind::Admin(state) => {
                // Own the necessary state inside the spawned task so we can
                // clean up even if the request context has already dropped.
                reset_admin_token(state).await;
                tracing::info!("Admin snapshot stream disconnected")
            }
        }
    });

    // response stream reads from mpsc; when client disconnects axum drops this stream
    let stream = ReceiverStream::new(rx);
    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}

/// SSE stream carrying a freshly derived [`PlayerView`] every second and on
/// every state change. Dropping the response cancels the tick.
pub fn player_view_stream(
    state: SharedState,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let mut receiver = state.public_sync().subscribe();
    let (tx, rx) = mpsc::channel::<Result<Event, Infallible>>(8);

    tokio::spawn(async move {
        let mut tick = tokio::time::interval(Duration::from_secs(1));
        tick.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = tx.closed() => break,
                _ = tick.tick() => {}
                recv_result = receiver.recv() => {
                    match recv_result {
                        // The view below is rebuilt from the cache either
                        // way; the event payload itself is not forwarded.
                        Ok(_) | Err(RecvError::Lagged(_)) => {}
                        Err(RecvError::Closed) => break,
                    }
                }
            }

            // Until the initial fetch succeeds there is nothing to render.
            let Some(game) = state.cached_state().await else {
                continue;
            };

            let view = PlayerView::project(&game, OffsetDateTime::now_utc());
            let event = match serde_json::to_string(&view) {
                Ok(data) => Event::default().event(VIEW_EVENT).data(data),
                Err(err) => {
                    tracing::warn!(error = %err, "failed to serialize player view");
                    continue;
                }
            };

            if tx.send(Ok(event)).await.is_err() {
                break;
            }
        }

        tracing::info!("Player view stream disconnected");
    });

    let stream = ReceiverStream::new(rx);
    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}

/// Publish a confirmed snapshot of the singleton record to both hubs.
pub fn broadcast_state(state: &SharedState, game: &GameState) {
    let snapshot = GameStateSnapshot::from(game.clone());
    match ServerEvent::json(Some(STATE_EVENT.to_string()), &snapshot) {
        Ok(event) => {
            state.public_sync().broadcast(event.clone());
            state.admin_sync().broadcast(event);
        }
        Err(err) => tracing::warn!(error = %err, "failed to serialize state snapshot"),
    }
}

/// Reserve the admin token for a new stream, generating one when none exists
/// and failing if another connection already holds it.
async fn claim_admin_token(state: &SharedState) -> Result<String, ServiceError> {
    let mut guard = state.admin_token().lock().await;
    match &mut *guard {
        slot @ None => {
            let token = Uuid::new_v4().simple().to_string();
            slot.replace(token.clone());
            Ok(token)
        }
        Some(_) => Err(ServiceError::Unauthorized(
            "Another admin stream is already active".into(),
        )),
    }
}

/// Broadcast a token handshake event to the admin stream.
pub fn broadcast_admin_handshake(hub: &SyncHub, token: &str) {
    if let Ok(event) = ServerEvent::json(
        Some("admin_token".to_string()),
        &AdminHandshake {
            token: token.to_string(),
        },
    ) {
        hub.broadcast(event);
    }
}

/// Send a human-readable info message onto the public stream.
pub fn broadcast_public_info(hub: &SyncHub, message: &str) {
    hub.broadcast(ServerEvent::new(
        Some("info".to_string()),
        message.to_string(),
    ));
}

/// Clear any stored admin token so the next admin connection negotiates a
/// fresh credential.
async fn reset_admin_token(state: SharedState) {
    let mut guard = state.admin_token().lock().await;
    guard.take();
}

#[cfg(test)]
mod tests {
    use crate::state::AppState;

    use super::*;

    #[tokio::test]
    async fn second_admin_subscription_is_refused() {
        let state = AppState::new();

        let (_receiver, token) = subscribe_admin(&state).await.unwrap();
        assert!(!token.is_empty());

        let err = subscribe_admin(&state).await.unwrap_err();
        assert!(matches!(err, ServiceError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn token_reset_allows_a_new_admin() {
        let state = AppState::new();

        let (_receiver, _token) = subscribe_admin(&state).await.unwrap();
        reset_admin_token(state.clone()).await;
        assert!(subscribe_admin(&state).await.is_ok());
    }

    #[tokio::test]
    async fn broadcast_state_reaches_public_and_admin_hubs() {
        let state = AppState::new();
        let mut public = state.public_sync().subscribe();
        let mut admin = state.admin_sync().subscribe();

        broadcast_state(&state, &GameState::idle());

        assert_eq!(public.recv().await.unwrap().event.as_deref(), Some("state"));
        assert_eq!(admin.recv().await.unwrap().event.as_deref(), Some("state"));
    }
}
