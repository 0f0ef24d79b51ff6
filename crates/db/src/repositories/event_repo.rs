//! Repository for the `events` table.
//!
//! Allocation-time mutation of `spots_reserved` lives in
//! `RegistrationRepo`; this repository covers administrative CRUD and
//! read paths.

use rsvp_core::error::CoreError;
use rsvp_core::types::DbId;
use sqlx::PgPool;

use crate::error::DbResult;
use crate::models::event::{CreateEvent, Event, EventType, UpdateEvent};

const COLUMNS: &str = "\
    id, school_id, title, slug, event_type, status, capacity, spots_reserved, \
    max_spots_per_person, cancellation_deadline_hours, start_at, end_at, \
    check_in_token, form_fields, ban_counters_applied, created_at, updated_at";

pub struct EventRepo;

impl EventRepo {
    /// Create an event. `check_in_token` is generated by the caller
    /// (`rsvp_core::codes::generate_check_in_token`).
    pub async fn create(
        pool: &PgPool,
        school_id: DbId,
        check_in_token: &str,
        input: &CreateEvent,
    ) -> DbResult<Event> {
        if input.event_type == EventType::CapacityBased
            && input.capacity.map_or(true, |c| c <= 0)
        {
            return Err(CoreError::Validation(
                "capacity-based events require a positive capacity".into(),
            )
            .into());
        }

        let query = format!(
            "INSERT INTO events \
                 (school_id, title, slug, event_type, capacity, \
                  max_spots_per_person, cancellation_deadline_hours, \
                  start_at, end_at, check_in_token, form_fields) \
             VALUES ($1, $2, $3, $4, $5, COALESCE($6, 10), COALESCE($7, 24), \
                     $8, $9, $10, COALESCE($11, '[]'::jsonb)) \
             RETURNING {COLUMNS}"
        );
        let event = sqlx::query_as(&query)
            .bind(school_id)
            .bind(&input.title)
            .bind(&input.slug)
            .bind(input.event_type)
            .bind(input.capacity)
            .bind(input.max_spots_per_person)
            .bind(input.cancellation_deadline_hours)
            .bind(input.start_at)
            .bind(input.end_at)
            .bind(check_in_token)
            .bind(&input.form_fields)
            .fetch_one(pool)
            .await?;
        Ok(event)
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> DbResult<Option<Event>> {
        let query = format!("SELECT {COLUMNS} FROM events WHERE id = $1");
        let event = sqlx::query_as(&query).bind(id).fetch_optional(pool).await?;
        Ok(event)
    }

    /// Public lookup within a school (the school itself is resolved from
    /// its slug first).
    pub async fn find_by_slug(
        pool: &PgPool,
        school_id: DbId,
        slug: &str,
    ) -> DbResult<Option<Event>> {
        let query = format!(
            "SELECT {COLUMNS} FROM events WHERE school_id = $1 AND slug = $2"
        );
        let event = sqlx::query_as(&query)
            .bind(school_id)
            .bind(slug)
            .fetch_optional(pool)
            .await?;
        Ok(event)
    }

    pub async fn list_for_school(pool: &PgPool, school_id: DbId) -> DbResult<Vec<Event>> {
        let query = format!(
            "SELECT {COLUMNS} FROM events WHERE school_id = $1 ORDER BY start_at DESC"
        );
        let events = sqlx::query_as(&query)
            .bind(school_id)
            .fetch_all(pool)
            .await?;
        Ok(events)
    }

    /// Patch mutable fields. Capacity and event type are fixed at
    /// creation; status changes flow through here (OPEN/CLOSED/COMPLETED).
    pub async fn update(pool: &PgPool, id: DbId, input: &UpdateEvent) -> DbResult<Event> {
        let query = format!(
            "UPDATE events SET \
                 title = COALESCE($2, title), \
                 status = COALESCE($3, status), \
                 max_spots_per_person = COALESCE($4, max_spots_per_person), \
                 cancellation_deadline_hours = COALESCE($5, cancellation_deadline_hours), \
                 start_at = COALESCE($6, start_at), \
                 end_at = COALESCE($7, end_at), \
                 form_fields = COALESCE($8, form_fields) \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        let event = sqlx::query_as(&query)
            .bind(id)
            .bind(&input.title)
            .bind(input.status)
            .bind(input.max_spots_per_person)
            .bind(input.cancellation_deadline_hours)
            .bind(input.start_at)
            .bind(input.end_at)
            .bind(&input.form_fields)
            .fetch_optional(pool)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "Event",
                id,
            })?;
        Ok(event)
    }

    /// Delete an event; tables and registrations cascade.
    pub async fn delete(pool: &PgPool, id: DbId) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM events WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(CoreError::NotFound {
                entity: "Event",
                id,
            }
            .into());
        }
        Ok(())
    }

    /// Events that have ended but whose game-count ban counters have not
    /// been applied yet; consumed by the ban sweeper.
    pub async fn list_ended_unswept(pool: &PgPool) -> DbResult<Vec<Event>> {
        let query = format!(
            "SELECT {COLUMNS} FROM events \
             WHERE ban_counters_applied = FALSE \
               AND ((end_at IS NOT NULL AND end_at <= NOW()) \
                    OR status = 'COMPLETED') \
             ORDER BY id ASC"
        );
        let events = sqlx::query_as(&query).fetch_all(pool).await?;
        Ok(events)
    }
}
