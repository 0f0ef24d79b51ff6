//! Check-in records: one per registration, undo is non-destructive.

use rsvp_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

use crate::models::registration::RegistrationStatus;

/// A row from the `check_ins` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CheckIn {
    pub id: DbId,
    pub registration_id: DbId,
    pub checked_in_at: Timestamp,
    pub checked_in_by: Option<String>,
    /// Arrived more than the grace period after event start.
    pub is_late: bool,
    pub minutes_late: Option<i32>,
    pub undone_at: Option<Timestamp>,
    pub undone_by: Option<String>,
    pub undone_reason: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// One row of the check-in page roster: a live registration joined with
/// its check-in record, if any.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct RosterEntry {
    pub registration_id: DbId,
    pub phone_number: String,
    pub spots_count: i32,
    pub guests_count: Option<i32>,
    pub status: RegistrationStatus,
    pub confirmation_code: String,
    pub registered_at: Timestamp,
    pub checked_in_at: Option<Timestamp>,
    pub checked_in_by: Option<String>,
    pub is_late: Option<bool>,
    pub undone_at: Option<Timestamp>,
}

/// Attendance counts for an event's check-in page.
#[derive(Debug, Clone, Serialize)]
pub struct CheckInStats {
    /// Non-cancelled registrations eligible to appear on the page.
    pub eligible: i64,
    /// Currently checked in (not undone).
    pub checked_in: i64,
    pub late: i64,
}
