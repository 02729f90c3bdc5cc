//! Common validation utilities.

use chrono::{DateTime, Utc};
use validator::ValidationError;

/// Validates that an event time range is well-formed (end strictly after start).
pub fn validate_time_range(
    starts_at: Option<DateTime<Utc>>,
    ends_at: Option<DateTime<Utc>>,
) -> Result<(), ValidationError> {
    if let (Some(start), Some(end)) = (starts_at, ends_at) {
        if end <= start {
            let mut err = ValidationError::new("time_range");
            err.message = Some("End time must be after start time".into());
            return Err(err);
        }
    }
    Ok(())
}

/// Validates that a requested inventory quantity is positive.
pub fn validate_quantity(quantity: i32) -> Result<(), ValidationError> {
    if quantity >= 1 {
        Ok(())
    } else {
        let mut err = ValidationError::new("quantity_range");
        err.message = Some("Quantity must be at least 1".into());
        Err(err)
    }
}
