//! Validation helpers for DTOs.

use validator::ValidationError;

use crate::state::game::FLOOR_COUNT;

/// Validates that a countdown duration is a finite, strictly positive number
/// of minutes.
///
/// The original operator UI accepted free text here and happily produced a
/// NaN deadline; the API boundary rejects that instead.
pub fn validate_duration_minutes(minutes: f64) -> Result<(), ValidationError> {
    if !minutes.is_finite() {
        let mut err = ValidationError::new("duration_not_finite");
        err.message = Some("Duration must be a finite number of minutes".into());
        return Err(err);
    }

    if minutes <= 0.0 {
        let mut err = ValidationError::new("duration_not_positive");
        err.message = Some(format!("Duration must be positive (got {minutes})").into());
        return Err(err);
    }

    Ok(())
}

/// Validates that a floor index lies on the board.
pub fn validate_floor(floor: u8) -> Result<(), ValidationError> {
    if floor >= FLOOR_COUNT {
        let mut err = ValidationError::new("floor_out_of_range");
        err.message = Some(
            format!("Floor must be between 0 and {} (got {floor})", FLOOR_COUNT - 1).into(),
        );
        return Err(err);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_reasonable_durations() {
        assert!(validate_duration_minutes(10.0).is_ok());
        assert!(validate_duration_minutes(0.5).is_ok());
    }

    #[test]
    fn rejects_non_finite_durations() {
        assert!(validate_duration_minutes(f64::NAN).is_err());
        assert!(validate_duration_minutes(f64::INFINITY).is_err());
    }

    #[test]
    fn rejects_zero_and_negative_durations() {
        assert!(validate_duration_minutes(0.0).is_err());
        assert!(validate_duration_minutes(-3.0).is_err());
    }

    #[test]
    fn floor_bounds() {
        assert!(validate_floor(0).is_ok());
        assert!(validate_floor(9).is_ok());
        assert!(validate_floor(10).is_err());
    }
}
