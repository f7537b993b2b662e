//! Application-level configuration pulled from the environment at startup.

use std::env;

use thiserror::Error;

/// Environment variable naming the store endpoint URL.
const STORE_URL_ENV: &str = "FLOOR_RUSH_STORE_URL";
/// Environment variable carrying the store access key.
const STORE_KEY_ENV: &str = "FLOOR_RUSH_STORE_KEY";
/// Environment variable overriding the store database name.
const STORE_DB_ENV: &str = "FLOOR_RUSH_STORE_DB";
/// Database used when [`STORE_DB_ENV`] is not set.
const DEFAULT_DATABASE: &str = "floor_rush";

/// Error raised when the environment does not carry a required value.
///
/// Both the store endpoint and the access key are fatal startup conditions;
/// the binary refuses to boot without them.
#[derive(Debug, Error)]
#[error("missing required environment variable `{var}`")]
pub struct MissingEnvVar {
    /// Name of the absent variable.
    pub var: &'static str,
}

/// Immutable runtime configuration shared across the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Endpoint URL of the persistence collaborator.
    pub store_url: String,
    /// Access key presented to the store on every request.
    pub store_key: String,
    /// Database holding the singleton record.
    pub store_database: String,
    /// TCP port the HTTP server binds.
    pub port: u16,
}

impl AppConfig {
    /// Read the configuration from the environment.
    pub fn from_env() -> Result<Self, MissingEnvVar> {
        let store_url =
            env::var(STORE_URL_ENV).map_err(|_| MissingEnvVar { var: STORE_URL_ENV })?;
        let store_key =
            env::var(STORE_KEY_ENV).map_err(|_| MissingEnvVar { var: STORE_KEY_ENV })?;
        let store_database =
            env::var(STORE_DB_ENV).unwrap_or_else(|_| DEFAULT_DATABASE.to_string());

        let port = env::var("PORT")
            .or_else(|_| env::var("SERVER_PORT"))
            .ok()
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(8080);

        Ok(Self {
            store_url,
            store_key,
            store_database,
            port,
        })
    }
}
