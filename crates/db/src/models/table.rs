//! Table inventory for table-based events.

use rsvp_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "table_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TableStatus {
    Available,
    Reserved,
    Inactive,
}

/// A row from the `event_tables` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct EventTable {
    pub id: DbId,
    pub event_id: DbId,
    pub table_number: i32,
    /// Maximum guests the table seats.
    pub capacity: i32,
    /// Minimum party size the table accepts.
    pub min_order: i32,
    pub status: TableStatus,
    /// Display / best-fit tiebreak order.
    pub table_order: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A table together with the registration currently holding it, if any.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TableWithReservation {
    pub id: DbId,
    pub event_id: DbId,
    pub table_number: i32,
    pub capacity: i32,
    pub min_order: i32,
    pub status: TableStatus,
    pub table_order: i32,
    pub reservation_id: Option<DbId>,
    pub reservation_code: Option<String>,
    pub reservation_guests: Option<i32>,
    pub reservation_phone: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateTable {
    pub table_number: i32,
    pub capacity: i32,
    pub min_order: i32,
    pub table_order: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateTable {
    pub table_number: Option<i32>,
    pub capacity: Option<i32>,
    pub min_order: Option<i32>,
    pub status: Option<TableStatus>,
    pub table_order: Option<i32>,
}
