//! Repository for the `check_ins` table.
//!
//! One record per registration. Undo never deletes -- it stamps the undo
//! fields and a later re-check-in reuses the same row.

use chrono::{Datelike, Utc};
use rsvp_core::error::CoreError;
use rsvp_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::error::DbResult;
use crate::models::check_in::{CheckIn, CheckInStats, RosterEntry};
use crate::models::registration::RegistrationStatus;

const COLUMNS: &str = "\
    id, registration_id, checked_in_at, checked_in_by, is_late, minutes_late, \
    undone_at, undone_by, undone_reason, created_at, updated_at";

/// Minutes after event start before an arrival counts as late.
const GRACE_PERIOD_MINUTES: i64 = 30;

pub struct CheckInRepo;

impl CheckInRepo {
    /// Check a registration in.
    ///
    /// Allowed only on the event's calendar day; cancelled registrations
    /// are refused outright and waitlisted ones must be promoted to a
    /// table or spot first. A registration already checked in (and not
    /// undone) is a conflict.
    pub async fn check_in(
        pool: &PgPool,
        event_id: DbId,
        registration_id: DbId,
        checked_in_by: Option<&str>,
    ) -> DbResult<CheckIn> {
        let start_at = Self::event_day_guard(pool, event_id, "check in").await?;

        let registration: Option<(DbId, RegistrationStatus)> =
            sqlx::query_as("SELECT event_id, status FROM registrations WHERE id = $1")
                .bind(registration_id)
                .fetch_optional(pool)
                .await?;

        let (reg_event_id, status) = registration.ok_or(CoreError::NotFound {
            entity: "Registration",
            id: registration_id,
        })?;

        if reg_event_id != event_id {
            return Err(CoreError::Validation(
                "registration is for a different event".into(),
            )
            .into());
        }
        match status {
            RegistrationStatus::Cancelled => {
                return Err(CoreError::Conflict("registration is cancelled".into()).into())
            }
            RegistrationStatus::Waitlist => {
                return Err(CoreError::Conflict(
                    "waitlisted registrations cannot check in; assign a table first".into(),
                )
                .into())
            }
            RegistrationStatus::Confirmed => {}
        }

        let now = Utc::now();
        let minutes_past_start = (now - start_at).num_minutes();
        let is_late = minutes_past_start > GRACE_PERIOD_MINUTES;
        let minutes_late = is_late.then_some(minutes_past_start as i32);

        let existing = Self::find_by_registration(pool, registration_id).await?;

        let check_in = match existing {
            Some(existing) if existing.undone_at.is_none() => {
                return Err(CoreError::Conflict("already checked in".into()).into());
            }
            Some(existing) => {
                // Re-check-in after an undo reuses the record.
                let query = format!(
                    "UPDATE check_ins \
                     SET checked_in_at = NOW(), checked_in_by = $2, \
                         is_late = $3, minutes_late = $4, \
                         undone_at = NULL, undone_by = NULL, undone_reason = NULL \
                     WHERE id = $1 \
                     RETURNING {COLUMNS}"
                );
                sqlx::query_as(&query)
                    .bind(existing.id)
                    .bind(checked_in_by)
                    .bind(is_late)
                    .bind(minutes_late)
                    .fetch_one(pool)
                    .await?
            }
            None => {
                let query = format!(
                    "INSERT INTO check_ins \
                         (registration_id, checked_in_by, is_late, minutes_late) \
                     VALUES ($1, $2, $3, $4) \
                     RETURNING {COLUMNS}"
                );
                sqlx::query_as(&query)
                    .bind(registration_id)
                    .bind(checked_in_by)
                    .bind(is_late)
                    .bind(minutes_late)
                    .fetch_one(pool)
                    .await?
            }
        };

        Ok(check_in)
    }

    /// Undo a check-in, preserving the record for audit.
    pub async fn undo(
        pool: &PgPool,
        event_id: DbId,
        registration_id: DbId,
        undone_by: Option<&str>,
        reason: Option<&str>,
    ) -> DbResult<CheckIn> {
        Self::event_day_guard(pool, event_id, "undo a check-in").await?;

        let reg_event_id: Option<DbId> =
            sqlx::query_scalar("SELECT event_id FROM registrations WHERE id = $1")
                .bind(registration_id)
                .fetch_optional(pool)
                .await?;
        if reg_event_id != Some(event_id) {
            return Err(CoreError::Validation(
                "registration is for a different event".into(),
            )
            .into());
        }

        let existing = Self::find_by_registration(pool, registration_id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "CheckIn",
                id: registration_id,
            })?;

        if existing.undone_at.is_some() {
            return Err(CoreError::Conflict("check-in already undone".into()).into());
        }

        let query = format!(
            "UPDATE check_ins \
             SET undone_at = NOW(), undone_by = $2, undone_reason = $3 \
             WHERE id = $1 AND undone_at IS NULL \
             RETURNING {COLUMNS}"
        );
        let check_in = sqlx::query_as(&query)
            .bind(existing.id)
            .bind(undone_by)
            .bind(reason)
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| CoreError::Conflict("check-in already undone".into()))?;
        Ok(check_in)
    }

    pub async fn find_by_registration(
        pool: &PgPool,
        registration_id: DbId,
    ) -> DbResult<Option<CheckIn>> {
        let query = format!("SELECT {COLUMNS} FROM check_ins WHERE registration_id = $1");
        let check_in = sqlx::query_as(&query)
            .bind(registration_id)
            .fetch_optional(pool)
            .await?;
        Ok(check_in)
    }

    /// The check-in page roster: every live registration of the event in
    /// arrival order, with its check-in record joined on.
    pub async fn roster(pool: &PgPool, event_id: DbId) -> DbResult<Vec<RosterEntry>> {
        let entries = sqlx::query_as(
            "SELECT r.id AS registration_id, r.phone_number, r.spots_count, \
                    r.guests_count, r.status, r.confirmation_code, \
                    r.created_at AS registered_at, \
                    c.checked_in_at, c.checked_in_by, c.is_late, c.undone_at \
             FROM registrations r \
             LEFT JOIN check_ins c ON c.registration_id = r.id \
             WHERE r.event_id = $1 AND r.status <> 'CANCELLED' \
             ORDER BY r.created_at ASC, r.id ASC",
        )
        .bind(event_id)
        .fetch_all(pool)
        .await?;
        Ok(entries)
    }

    /// Attendance counts for an event.
    pub async fn stats(pool: &PgPool, event_id: DbId) -> DbResult<CheckInStats> {
        let (eligible, checked_in, late): (i64, i64, i64) = sqlx::query_as(
            "SELECT \
                 COUNT(DISTINCT r.id), \
                 COUNT(c.id) FILTER (WHERE c.undone_at IS NULL), \
                 COUNT(c.id) FILTER (WHERE c.undone_at IS NULL AND c.is_late) \
             FROM registrations r \
             LEFT JOIN check_ins c ON c.registration_id = r.id \
             WHERE r.event_id = $1 AND r.status <> 'CANCELLED'",
        )
        .bind(event_id)
        .fetch_one(pool)
        .await?;
        Ok(CheckInStats {
            eligible,
            checked_in,
            late,
        })
    }

    /// Attendance is recorded on the day of the event, not before or
    /// after. Returns the event's start time for lateness math.
    async fn event_day_guard(
        pool: &PgPool,
        event_id: DbId,
        action: &str,
    ) -> DbResult<Timestamp> {
        let start_at: Option<Timestamp> =
            sqlx::query_scalar("SELECT start_at FROM events WHERE id = $1")
                .bind(event_id)
                .fetch_optional(pool)
                .await?;
        let start_at = start_at.ok_or(CoreError::NotFound {
            entity: "Event",
            id: event_id,
        })?;

        let now = Utc::now();
        let same_day = now.year() == start_at.year()
            && now.month() == start_at.month()
            && now.day() == start_at.day();

        if !same_day {
            let when = if now < start_at {
                "before the event day"
            } else {
                "after the event day"
            };
            return Err(CoreError::Forbidden(format!("cannot {action} {when}")).into());
        }

        Ok(start_at)
    }
}
