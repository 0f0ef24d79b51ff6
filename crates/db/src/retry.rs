//! Bounded retry for serializable transactions.
//!
//! Under contention a SERIALIZABLE transaction may abort with a
//! serialization failure. The policy is caller-side and bounded: up to
//! three attempts with jittered exponential backoff, then the conflict
//! surfaces to the caller. Under heavy contention some requests
//! legitimately end in a conflict; that is accepted behavior, not a bug.

use std::future::Future;
use std::time::Duration;

use rand::Rng;

use crate::error::{DbError, DbResult};

/// Maximum attempts per operation (first try included).
const MAX_ATTEMPTS: u32 = 3;

/// Base backoff; attempt n sleeps up to `BASE * 2^n` with full jitter.
const BASE_BACKOFF_MS: u64 = 20;

/// Run `op` until it succeeds, fails terminally, or exhausts its attempts.
///
/// `op` must open (and commit or abort) its own transaction on every call.
pub async fn serializable<T, F, Fut>(op: F) -> DbResult<T>
where
    F: Fn() -> Fut,
    Fut: Future<Output = DbResult<T>>,
{
    let mut attempt = 0;
    loop {
        match op().await {
            Err(DbError::RetryableConflict) if attempt + 1 < MAX_ATTEMPTS => {
                attempt += 1;
                let cap = BASE_BACKOFF_MS << attempt;
                let sleep_ms = rand::rng().random_range(0..=cap);
                tracing::debug!(attempt, sleep_ms, "serialization conflict, retrying");
                tokio::time::sleep(Duration::from_millis(sleep_ms)).await;
            }
            other => return other,
        }
    }
}
