/// Admin command surface mutating the singleton record.
pub mod admin_service;
/// OpenAPI documentation generation.
pub mod documentation;
/// Health check service.
pub mod health_service;
/// Read-only projections of the current game state.
pub mod public_service;
/// Snapshot fan-out and SSE stream plumbing.
pub mod sse_service;
/// Background store connection supervisor.
#[cfg(feature = "http-store")]
pub mod store_supervisor;
