//! Event entity and its allocation mode / lifecycle enums.

use rsvp_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// How an event allocates its slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "event_type", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventType {
    /// A single numeric counter against a total capacity.
    CapacityBased,
    /// Discrete table inventory matched by guest count.
    TableBased,
}

/// Registration lifecycle of the event itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "event_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventStatus {
    Open,
    Closed,
    Completed,
}

/// A row from the `events` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Event {
    pub id: DbId,
    pub school_id: DbId,
    pub title: String,
    pub slug: String,
    pub event_type: EventType,
    pub status: EventStatus,
    /// Total capacity; set for capacity-based events only.
    pub capacity: Option<i32>,
    /// Atomic counter of confirmed spots; equals the sum of CONFIRMED
    /// registrations' spots_count after every commit.
    pub spots_reserved: i32,
    pub max_spots_per_person: i32,
    pub cancellation_deadline_hours: i32,
    pub start_at: Timestamp,
    pub end_at: Option<Timestamp>,
    pub check_in_token: String,
    /// Declared registration form schema (`Vec<FormField>` as JSON).
    pub form_fields: serde_json::Value,
    pub ban_counters_applied: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Deserialize)]
pub struct CreateEvent {
    pub title: String,
    pub slug: String,
    pub event_type: EventType,
    pub capacity: Option<i32>,
    pub max_spots_per_person: Option<i32>,
    pub cancellation_deadline_hours: Option<i32>,
    pub start_at: Timestamp,
    pub end_at: Option<Timestamp>,
    #[serde(default)]
    pub form_fields: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateEvent {
    pub title: Option<String>,
    pub status: Option<EventStatus>,
    pub max_spots_per_person: Option<i32>,
    pub cancellation_deadline_hours: Option<i32>,
    pub start_at: Option<Timestamp>,
    pub end_at: Option<Timestamp>,
    pub form_fields: Option<serde_json::Value>,
}
