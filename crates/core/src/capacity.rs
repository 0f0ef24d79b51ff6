//! Capacity decision function for capacity-based events.
//!
//! Pure and deterministic; the reservation transaction engine re-reads the
//! live counter and applies this decision inside its serializable
//! transaction.

use crate::error::CoreError;

/// Outcome of a capacity check: the registration is either confirmed or
/// goes to the waitlist. Rejection is not a decision this function makes --
/// invalid inputs are errors, a full event is a waitlist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapacityDecision {
    Confirmed,
    Waitlist,
}

/// Decide whether `requested_spots` fit into the remaining capacity.
///
/// Confirmed iff `current_reserved + requested_spots <= total_capacity`;
/// the boundary itself (filling the event exactly) confirms.
///
/// # Errors
///
/// [`CoreError::Validation`] when `requested_spots <= 0`,
/// `total_capacity <= 0`, or `current_reserved < 0`.
pub fn can_register(
    current_reserved: i32,
    total_capacity: i32,
    requested_spots: i32,
) -> Result<CapacityDecision, CoreError> {
    if requested_spots <= 0 {
        return Err(CoreError::Validation(
            "requested spots must be positive".into(),
        ));
    }
    if total_capacity <= 0 {
        return Err(CoreError::Validation(
            "total capacity must be positive".into(),
        ));
    }
    if current_reserved < 0 {
        return Err(CoreError::Validation(
            "current reserved cannot be negative".into(),
        ));
    }

    if current_reserved + requested_spots <= total_capacity {
        Ok(CapacityDecision::Confirmed)
    } else {
        Ok(CapacityDecision::Waitlist)
    }
}
