//! Read side of the waitlist: pair waitlisted parties with the tables
//! that could seat them right now.
//!
//! Never mutates. Promotion is `RegistrationRepo::promote`.

use rsvp_core::types::DbId;
use rsvp_core::waitlist::{best_fit, fitting_tables, TableSlot};
use serde::Serialize;
use sqlx::PgPool;

use crate::error::DbResult;
use crate::models::registration::Registration;
use crate::repositories::registration_repo::COLUMNS;

/// One waitlisted registration with its current table matches.
#[derive(Debug, Serialize)]
pub struct WaitlistEntry {
    pub registration: Registration,
    pub matching_tables: Vec<TableSlot>,
    pub best_table: Option<TableSlot>,
    pub has_match: bool,
}

#[derive(Debug, Serialize)]
pub struct WaitlistStats {
    pub total_waitlist: usize,
    pub with_matches: usize,
    pub without_matches: usize,
    pub available_tables: usize,
}

#[derive(Debug, Serialize)]
pub struct WaitlistOverview {
    pub entries: Vec<WaitlistEntry>,
    pub stats: WaitlistStats,
}

pub struct WaitlistRepo;

impl WaitlistRepo {
    /// The admin waitlist view for a table-based event: entries in
    /// priority order, each annotated with its fitting tables and the
    /// best (smallest sufficient) one.
    pub async fn overview(pool: &PgPool, event_id: DbId) -> DbResult<WaitlistOverview> {
        let query = format!(
            "SELECT {COLUMNS} FROM registrations \
             WHERE event_id = $1 AND status = 'WAITLIST' \
             ORDER BY waitlist_priority ASC"
        );
        let waitlisted: Vec<Registration> = sqlx::query_as(&query)
            .bind(event_id)
            .fetch_all(pool)
            .await?;

        let available: Vec<TableSlot> = sqlx::query_as::<_, (DbId, i32, i32, i32, i32)>(
            "SELECT id, table_number, capacity, min_order, table_order \
             FROM event_tables \
             WHERE event_id = $1 AND status = 'AVAILABLE' \
             ORDER BY table_order ASC",
        )
        .bind(event_id)
        .fetch_all(pool)
        .await?
        .into_iter()
        .map(
            |(id, table_number, capacity, min_order, table_order)| TableSlot {
                id,
                table_number,
                capacity,
                min_order,
                table_order,
            },
        )
        .collect();

        let available_tables = available.len();
        let entries: Vec<WaitlistEntry> = waitlisted
            .into_iter()
            .map(|registration| {
                let guests = registration.guests_count.unwrap_or(0);
                let matching: Vec<TableSlot> = fitting_tables(guests, &available)
                    .into_iter()
                    .cloned()
                    .collect();
                let best = best_fit(guests, &available).cloned();
                let has_match = !matching.is_empty();
                WaitlistEntry {
                    registration,
                    matching_tables: matching,
                    best_table: best,
                    has_match,
                }
            })
            .collect();

        let with_matches = entries.iter().filter(|e| e.has_match).count();
        let stats = WaitlistStats {
            total_waitlist: entries.len(),
            with_matches,
            without_matches: entries.len() - with_matches,
            available_tables,
        };

        Ok(WaitlistOverview { entries, stats })
    }
}
