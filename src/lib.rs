//! Library crate for floor-rush-back, exposing modules for binaries and integration tests.

/// Environment-driven application configuration.
pub mod config;
/// Persistence backends for the singleton game state.
pub mod dao;
/// Request, response, and event payload definitions.
pub mod dto;
/// Service- and HTTP-level error types.
pub mod error;
/// HTTP route trees.
pub mod routes;
/// Business logic behind the routes.
pub mod services;
/// Shared application state, game model, and countdown derivation.
pub mod state;
