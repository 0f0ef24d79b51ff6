//! Capability tokens for self-service cancellation.
//!
//! A cancellation token is a signed JWT carrying the event id and the
//! normalized phone identity, valid for thirty days. Possession of the
//! token is the authorization -- no session is involved.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::DbId;

/// How long a cancellation link stays valid.
pub const CANCELLATION_TOKEN_TTL_DAYS: i64 = 30;

/// Claims embedded in a cancellation capability token.
#[derive(Debug, Serialize, Deserialize)]
pub struct CancellationClaims {
    /// Event the registration belongs to.
    pub event_id: DbId,
    /// Normalized phone identity of the registrant.
    pub phone: String,
    /// Expiry, seconds since epoch.
    pub exp: i64,
    /// Issued-at, seconds since epoch.
    pub iat: i64,
}

/// Sign a cancellation token for (event, phone) with the given lifetime.
pub fn sign_cancellation_token(
    secret: &str,
    event_id: DbId,
    phone: &str,
    ttl: Duration,
) -> Result<String, CoreError> {
    let now = Utc::now();
    let claims = CancellationClaims {
        event_id,
        phone: phone.to_string(),
        exp: (now + ttl).timestamp(),
        iat: now.timestamp(),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| CoreError::Internal(format!("failed to sign cancellation token: {e}")))
}

/// Verify a cancellation token and return its claims.
///
/// Any failure -- bad signature, malformed token, expired -- collapses to
/// [`CoreError::InvalidToken`]; callers must not learn why a token was
/// rejected.
pub fn verify_cancellation_token(
    secret: &str,
    token: &str,
) -> Result<CancellationClaims, CoreError> {
    let validation = Validation::new(Algorithm::HS256);
    decode::<CancellationClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|_| CoreError::InvalidToken)
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    const SECRET: &str = "test-secret";

    #[test]
    fn round_trip() {
        let token =
            sign_cancellation_token(SECRET, 42, "0501234567", Duration::days(30)).unwrap();
        let claims = verify_cancellation_token(SECRET, &token).unwrap();
        assert_eq!(claims.event_id, 42);
        assert_eq!(claims.phone, "0501234567");
    }

    #[test]
    fn wrong_secret_is_invalid() {
        let token =
            sign_cancellation_token(SECRET, 42, "0501234567", Duration::days(30)).unwrap();
        assert_matches!(
            verify_cancellation_token("other-secret", &token),
            Err(CoreError::InvalidToken)
        );
    }

    #[test]
    fn expired_token_is_invalid() {
        // Well past the default decode leeway.
        let token =
            sign_cancellation_token(SECRET, 42, "0501234567", Duration::hours(-2)).unwrap();
        assert_matches!(
            verify_cancellation_token(SECRET, &token),
            Err(CoreError::InvalidToken)
        );
    }

    #[test]
    fn garbage_is_invalid() {
        assert_matches!(
            verify_cancellation_token(SECRET, "not-a-jwt"),
            Err(CoreError::InvalidToken)
        );
    }
}
