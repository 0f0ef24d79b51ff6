//! User bans: date-based or game-count-based, school-scoped.

use rsvp_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `user_bans` table.
///
/// Exactly one termination mode per row: `expires_at` set means
/// date-based; `expires_at` NULL means the ban covers the next
/// `banned_games_count` events, with `events_blocked` counting progress.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct UserBan {
    pub id: DbId,
    pub school_id: DbId,
    pub phone_number: String,
    pub reason: Option<String>,
    pub active: bool,
    pub expires_at: Option<Timestamp>,
    pub banned_games_count: i32,
    pub events_blocked: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl UserBan {
    /// Remaining events for a game-count ban; `None` for date-based bans.
    pub fn remaining_games(&self) -> Option<i32> {
        match self.expires_at {
            Some(_) => None,
            None => Some(self.banned_games_count - self.events_blocked),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateBan {
    pub phone_number: String,
    pub reason: Option<String>,
    /// Date-based mode; mutually exclusive with `banned_games_count`.
    pub expires_at: Option<Timestamp>,
    /// Game-count mode; mutually exclusive with `expires_at`.
    pub banned_games_count: Option<i32>,
}

/// Aggregate ban counts for a school's settings page.
#[derive(Debug, Clone, Serialize)]
pub struct BanStats {
    pub active: i64,
    pub expired: i64,
    pub total: i64,
}
