use crate::types::DbId;

/// Domain error taxonomy.
///
/// Allocation engines never fold an internal failure into a WAITLIST
/// outcome; a waitlisted registration is a normal result, every variant
/// here is an error.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Registration is already cancelled")]
    AlreadyCancelled,

    #[error("Cannot cancel less than {hours} hours before the event")]
    DeadlineExceeded { hours: i32 },

    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("Internal error: {0}")]
    Internal(String),
}
