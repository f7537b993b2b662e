use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for Floor Rush Back.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::public::player_page,
        crate::routes::public::admin_page,
        crate::routes::public::game_state,
        crate::routes::sse::public_stream,
        crate::routes::sse::admin_stream,
        crate::routes::sse::player_stream,
        crate::routes::admin::start_game,
        crate::routes::admin::start_floor_countdown,
        crate::routes::admin::toggle_floor,
        crate::routes::admin::reset_game,
        crate::routes::admin::broadcast_message,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::sse::AdminHandshake,
            crate::dto::public::GameStateSnapshot,
            crate::dto::public::PlayerView,
            crate::dto::public::AdminView,
            crate::dto::public::FloorCell,
            crate::dto::admin::StartCountdownRequest,
            crate::dto::admin::BroadcastRequest,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "public", description = "Read-only game state and views"),
        (name = "sse", description = "Server-sent events streams"),
        (name = "admin", description = "Admin commands mutating the game state"),
    )
)]
pub struct ApiDoc;
