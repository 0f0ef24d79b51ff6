//! Persistence error type.
//!
//! The one classification that matters for correctness: PostgreSQL
//! serialization failures (SQLSTATE 40001) and deadlocks (40P01) become
//! [`DbError::RetryableConflict`], which callers may retry; everything else
//! is a terminal failure or a domain error.

use rsvp_core::error::CoreError;

#[derive(Debug, thiserror::Error)]
pub enum DbError {
    /// A domain-level error from `rsvp-core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The transaction lost a serialization race and can be retried.
    #[error("serialization conflict; the operation may be retried")]
    RetryableConflict,

    /// Any other database failure.
    #[error(transparent)]
    Sqlx(sqlx::Error),
}

/// Convenience alias for repository return values.
pub type DbResult<T> = Result<T, DbError>;

impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if matches!(db_err.code().as_deref(), Some("40001") | Some("40P01")) {
                return DbError::RetryableConflict;
            }
            // Two waitlist inserts can race to the same priority; the
            // unique index turns that into a 23505 instead of a 40001.
            // Same race, same remedy.
            if db_err.code().as_deref() == Some("23505")
                && db_err.constraint() == Some("uq_registrations_waitlist_priority")
            {
                return DbError::RetryableConflict;
            }
        }
        DbError::Sqlx(err)
    }
}

impl DbError {
    /// Whether retrying the whole transaction could succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, DbError::RetryableConflict)
    }
}
