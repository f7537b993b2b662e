//! DTO definitions used by the admin REST API and documentation layer.

use serde::Deserialize;
use utoipa::ToSchema;
use validator::{Validate, ValidationErrors};

use crate::dto::validation::validate_duration_minutes;

/// Payload arming the main or floor-closing countdown.
#[derive(Debug, Deserialize, ToSchema)]
pub struct StartCountdownRequest {
    /// Countdown length in minutes; fractional values are allowed.
    pub duration_minutes: f64,
}

impl Validate for StartCountdownRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if let Err(e) = validate_duration_minutes(self.duration_minutes) {
            errors.add("duration_minutes", e);
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

/// Payload replacing the operator broadcast message.
///
/// The message is stored verbatim; there is no length cap or sanitization.
#[derive(Debug, Deserialize, ToSchema)]
pub struct BroadcastRequest {
    pub message: String,
}
