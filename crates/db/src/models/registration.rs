//! Registration entity: the row the allocation engines fight over.

use rsvp_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "registration_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RegistrationStatus {
    Confirmed,
    Waitlist,
    /// Terminal: a cancelled registration never transitions again.
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "cancellation_actor", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CancellationActor {
    Customer,
    Admin,
}

/// A row from the `registrations` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Registration {
    pub id: DbId,
    pub event_id: DbId,
    /// Normalized phone: the registrant's identity key.
    pub phone_number: String,
    pub spots_count: i32,
    pub guests_count: Option<i32>,
    pub status: RegistrationStatus,
    /// Per-event monotonic sequence; assigned only to WAITLIST rows.
    pub waitlist_priority: Option<i32>,
    pub confirmation_code: String,
    pub cancellation_token: String,
    pub assigned_table_id: Option<DbId>,
    pub form_data: serde_json::Value,
    pub cancelled_at: Option<Timestamp>,
    pub cancelled_by: Option<CancellationActor>,
    pub cancellation_reason: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Input to the allocation engines. The phone number must already be
/// normalized and the form data already validated against the event's
/// schema; the confirmation code and cancellation token are generated by
/// the caller.
#[derive(Debug, Clone)]
pub struct NewRegistration {
    pub phone_number: String,
    /// Spots requested (capacity-based engines).
    pub spots_count: i32,
    /// Party size (table-based engines).
    pub guests_count: Option<i32>,
    pub form_data: serde_json::Value,
    pub confirmation_code: String,
    pub cancellation_token: String,
}

/// One status rewrite performed by the repair job.
#[derive(Debug, Clone, Serialize)]
pub struct StatusCorrection {
    pub registration_id: DbId,
    pub confirmation_code: String,
    pub old_status: RegistrationStatus,
    pub new_status: RegistrationStatus,
}
