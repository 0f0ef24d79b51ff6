//! Reusable table layouts.

use rsvp_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `table_templates` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TableTemplate {
    pub id: DbId,
    pub school_id: DbId,
    pub name: String,
    /// Ordered list of [`TemplateSlot`] as JSON.
    pub layout: serde_json::Value,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// One table in a stored layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateSlot {
    pub table_number: i32,
    pub capacity: i32,
    pub min_order: i32,
}
