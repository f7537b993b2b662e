/// Admin command payloads.
pub mod admin;
/// Health check payloads.
pub mod health;
/// Read-side snapshot and view payloads.
pub mod public;
/// Event payloads carried over the SSE streams.
pub mod sse;
/// Field-level validation helpers.
pub mod validation;
