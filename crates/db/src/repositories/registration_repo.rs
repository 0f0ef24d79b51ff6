//! Registration repository: the serializable allocation engines.
//!
//! Every method that touches `spots_reserved` or a table's status runs a
//! single SERIALIZABLE transaction that also writes the dependent
//! registration row. The counter and the table status are never mutated
//! outside such a transaction.

use rsvp_core::capacity::{can_register, CapacityDecision};
use rsvp_core::error::CoreError;
use rsvp_core::types::DbId;
use sqlx::{PgPool, Postgres, Transaction};

use crate::error::{DbError, DbResult};
use crate::models::event::{EventStatus, EventType};
use crate::models::registration::{
    CancellationActor, NewRegistration, Registration, RegistrationStatus, StatusCorrection,
};
use crate::models::table::EventTable;
use crate::repositories::begin_serializable;
use crate::repositories::table_repo::TABLE_COLUMNS;

/// Column list for `registrations` queries.
pub(crate) const COLUMNS: &str = "\
    id, event_id, phone_number, spots_count, guests_count, status, \
    waitlist_priority, confirmation_code, cancellation_token, \
    assigned_table_id, form_data, cancelled_at, cancelled_by, \
    cancellation_reason, created_at, updated_at";

/// Result of an allocation attempt. The registration's status says whether
/// it was confirmed or waitlisted; `table` carries the claimed table for
/// table-based confirmations.
#[derive(Debug)]
pub struct AllocationOutcome {
    pub registration: Registration,
    pub table: Option<EventTable>,
}

/// Provides allocation, cancellation, promotion, and repair for
/// registrations.
pub struct RegistrationRepo;

impl RegistrationRepo {
    /// Register against a capacity-based event.
    ///
    /// One SERIALIZABLE transaction: re-read the counter, apply the
    /// capacity decision, then either increment `spots_reserved` under a
    /// guard and insert CONFIRMED, or insert WAITLIST with the next
    /// priority. Winners are decided by commit order, not submission
    /// order; a serialization abort surfaces as
    /// [`DbError::RetryableConflict`] for the caller to retry.
    pub async fn register_capacity(
        pool: &PgPool,
        event_id: DbId,
        input: &NewRegistration,
    ) -> DbResult<AllocationOutcome> {
        let mut tx = begin_serializable(pool).await?;

        let event: Option<(EventType, EventStatus, i32, Option<i32>)> = sqlx::query_as(
            "SELECT event_type, status, spots_reserved, capacity FROM events WHERE id = $1",
        )
        .bind(event_id)
        .fetch_optional(&mut *tx)
        .await?;

        let (event_type, status, spots_reserved, capacity) =
            event.ok_or(CoreError::NotFound {
                entity: "Event",
                id: event_id,
            })?;

        if event_type != EventType::CapacityBased {
            return Err(CoreError::Validation(
                "event does not take capacity-based registrations".into(),
            )
            .into());
        }
        if status != EventStatus::Open {
            return Err(CoreError::Conflict("registration is closed".into()).into());
        }
        let capacity = capacity.ok_or_else(|| {
            CoreError::Internal("capacity-based event has no capacity".into())
        })?;

        Self::ensure_not_registered(&mut tx, event_id, &input.phone_number).await?;

        let registration = match can_register(spots_reserved, capacity, input.spots_count)? {
            CapacityDecision::Confirmed => {
                let updated = sqlx::query(
                    "UPDATE events \
                     SET spots_reserved = spots_reserved + $2 \
                     WHERE id = $1 AND spots_reserved + $2 <= capacity",
                )
                .bind(event_id)
                .bind(input.spots_count)
                .execute(&mut *tx)
                .await?;

                // The guard re-checks what this transaction already read;
                // a zero here means the snapshot was invalidated.
                if updated.rows_affected() == 0 {
                    return Err(DbError::RetryableConflict);
                }

                Self::insert(&mut tx, event_id, input, RegistrationStatus::Confirmed, None, None)
                    .await?
            }
            CapacityDecision::Waitlist => {
                let priority = Self::next_waitlist_priority(&mut tx, event_id).await?;
                Self::insert(
                    &mut tx,
                    event_id,
                    input,
                    RegistrationStatus::Waitlist,
                    Some(priority),
                    None,
                )
                .await?
            }
        };

        tx.commit().await?;
        Ok(AllocationOutcome {
            registration,
            table: None,
        })
    }

    /// Register against a table-based event.
    ///
    /// The claim is a single conditional update: flip the smallest
    /// sufficient AVAILABLE table to RESERVED and insert the CONFIRMED
    /// registration in the same transaction, or insert WAITLIST when no
    /// table came back. Of N concurrent claimants for one table exactly
    /// one commits the flip.
    pub async fn register_table(
        pool: &PgPool,
        event_id: DbId,
        input: &NewRegistration,
    ) -> DbResult<AllocationOutcome> {
        let guests = input.guests_count.ok_or_else(|| {
            CoreError::Validation("guest count is required for table reservations".into())
        })?;
        if guests <= 0 {
            return Err(CoreError::Validation("guest count must be positive".into()).into());
        }

        let mut tx = begin_serializable(pool).await?;

        let event: Option<(EventType, EventStatus)> =
            sqlx::query_as("SELECT event_type, status FROM events WHERE id = $1")
                .bind(event_id)
                .fetch_optional(&mut *tx)
                .await?;

        let (event_type, status) = event.ok_or(CoreError::NotFound {
            entity: "Event",
            id: event_id,
        })?;

        if event_type != EventType::TableBased {
            return Err(CoreError::Validation(
                "event does not take table reservations".into(),
            )
            .into());
        }
        if status != EventStatus::Open {
            return Err(CoreError::Conflict("registration is closed".into()).into());
        }

        Self::ensure_not_registered(&mut tx, event_id, &input.phone_number).await?;

        let claim = format!(
            "UPDATE event_tables SET status = 'RESERVED' \
             WHERE id = ( \
                 SELECT id FROM event_tables \
                 WHERE event_id = $1 AND status = 'AVAILABLE' \
                   AND min_order <= $2 AND capacity >= $2 \
                 ORDER BY capacity ASC, table_order ASC \
                 LIMIT 1 \
             ) AND status = 'AVAILABLE' \
             RETURNING {TABLE_COLUMNS}"
        );
        let table: Option<EventTable> = sqlx::query_as(&claim)
            .bind(event_id)
            .bind(guests)
            .fetch_optional(&mut *tx)
            .await?;

        let (registration, table) = match table {
            Some(table) => {
                let registration = Self::insert(
                    &mut tx,
                    event_id,
                    input,
                    RegistrationStatus::Confirmed,
                    None,
                    Some(table.id),
                )
                .await?;
                (registration, Some(table))
            }
            None => {
                let priority = Self::next_waitlist_priority(&mut tx, event_id).await?;
                let registration = Self::insert(
                    &mut tx,
                    event_id,
                    input,
                    RegistrationStatus::Waitlist,
                    Some(priority),
                    None,
                )
                .await?;
                (registration, None)
            }
        };

        tx.commit().await?;
        Ok(AllocationOutcome {
            registration,
            table,
        })
    }

    /// Customer self-service cancellation, authorized by a verified
    /// capability token's (event, phone) claims.
    ///
    /// Enforces the event's cancellation deadline, then cancels and
    /// compensates in one transaction.
    pub async fn cancel_with_token(
        pool: &PgPool,
        event_id: DbId,
        phone_number: &str,
        reason: Option<&str>,
    ) -> DbResult<Registration> {
        let mut tx = begin_serializable(pool).await?;

        let event: Option<(EventType, chrono::DateTime<chrono::Utc>, i32)> = sqlx::query_as(
            "SELECT event_type, start_at, cancellation_deadline_hours \
             FROM events WHERE id = $1",
        )
        .bind(event_id)
        .fetch_optional(&mut *tx)
        .await?;

        let (event_type, start_at, deadline_hours) = event.ok_or(CoreError::NotFound {
            entity: "Event",
            id: event_id,
        })?;

        let query = format!(
            "SELECT {COLUMNS} FROM registrations \
             WHERE event_id = $1 AND phone_number = $2 AND status <> 'CANCELLED'"
        );
        let registration: Option<Registration> = sqlx::query_as(&query)
            .bind(event_id)
            .bind(phone_number)
            .fetch_optional(&mut *tx)
            .await?;

        let registration = match registration {
            Some(r) => r,
            None => {
                let was_cancelled: bool = sqlx::query_scalar(
                    "SELECT EXISTS( \
                         SELECT 1 FROM registrations \
                         WHERE event_id = $1 AND phone_number = $2 AND status = 'CANCELLED' \
                     )",
                )
                .bind(event_id)
                .bind(phone_number)
                .fetch_one(&mut *tx)
                .await?;
                if was_cancelled {
                    return Err(CoreError::AlreadyCancelled.into());
                }
                return Err(CoreError::NotFound {
                    entity: "Registration",
                    id: event_id,
                }
                .into());
            }
        };

        let remaining = start_at - chrono::Utc::now();
        if remaining < chrono::Duration::hours(deadline_hours as i64) {
            return Err(CoreError::DeadlineExceeded {
                hours: deadline_hours,
            }
            .into());
        }

        let cancelled = Self::mark_cancelled(
            &mut tx,
            registration.id,
            CancellationActor::Customer,
            reason,
        )
        .await?
        .ok_or(CoreError::AlreadyCancelled)?;

        Self::compensate(&mut tx, &registration, event_type).await?;

        tx.commit().await?;
        Ok(cancelled)
    }

    /// Admin-initiated cancellation: same compensation, no deadline check.
    pub async fn cancel_by_admin(
        pool: &PgPool,
        registration_id: DbId,
        reason: Option<&str>,
    ) -> DbResult<Registration> {
        let mut tx = begin_serializable(pool).await?;

        let query = format!("SELECT {COLUMNS} FROM registrations WHERE id = $1");
        let registration: Registration = sqlx::query_as(&query)
            .bind(registration_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "Registration",
                id: registration_id,
            })?;

        if registration.status == RegistrationStatus::Cancelled {
            return Err(CoreError::AlreadyCancelled.into());
        }

        let event_type: EventType =
            sqlx::query_scalar("SELECT event_type FROM events WHERE id = $1")
                .bind(registration.event_id)
                .fetch_one(&mut *tx)
                .await?;

        let cancelled =
            Self::mark_cancelled(&mut tx, registration.id, CancellationActor::Admin, reason)
                .await?
                .ok_or(CoreError::AlreadyCancelled)?;

        Self::compensate(&mut tx, &registration, event_type).await?;

        tx.commit().await?;
        Ok(cancelled)
    }

    /// Promote a waitlisted registration to CONFIRMED.
    ///
    /// Explicit admin action; uses the same conditional claims as the
    /// registration engines so a promotion cannot race a concurrent
    /// incoming registration into over-booking. For table-based events an
    /// explicit `table_id` pins the table, otherwise best-fit applies.
    pub async fn promote(
        pool: &PgPool,
        registration_id: DbId,
        table_id: Option<DbId>,
    ) -> DbResult<AllocationOutcome> {
        let mut tx = begin_serializable(pool).await?;

        let query = format!("SELECT {COLUMNS} FROM registrations WHERE id = $1");
        let registration: Registration = sqlx::query_as(&query)
            .bind(registration_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "Registration",
                id: registration_id,
            })?;

        if registration.status != RegistrationStatus::Waitlist {
            return Err(CoreError::Conflict(
                "only waitlisted registrations can be promoted".into(),
            )
            .into());
        }

        let event_type: EventType =
            sqlx::query_scalar("SELECT event_type FROM events WHERE id = $1")
                .bind(registration.event_id)
                .fetch_one(&mut *tx)
                .await?;

        let (promoted, table) = match event_type {
            EventType::TableBased => {
                let guests = registration.guests_count.ok_or_else(|| {
                    CoreError::Validation("registration has no guest count".into())
                })?;

                let table = match table_id {
                    Some(table_id) => {
                        let claim = format!(
                            "UPDATE event_tables SET status = 'RESERVED' \
                             WHERE id = $1 AND event_id = $2 AND status = 'AVAILABLE' \
                               AND min_order <= $3 AND capacity >= $3 \
                             RETURNING {TABLE_COLUMNS}"
                        );
                        sqlx::query_as::<_, EventTable>(&claim)
                            .bind(table_id)
                            .bind(registration.event_id)
                            .bind(guests)
                            .fetch_optional(&mut *tx)
                            .await?
                    }
                    None => {
                        let claim = format!(
                            "UPDATE event_tables SET status = 'RESERVED' \
                             WHERE id = ( \
                                 SELECT id FROM event_tables \
                                 WHERE event_id = $1 AND status = 'AVAILABLE' \
                                   AND min_order <= $2 AND capacity >= $2 \
                                 ORDER BY capacity ASC, table_order ASC \
                                 LIMIT 1 \
                             ) AND status = 'AVAILABLE' \
                             RETURNING {TABLE_COLUMNS}"
                        );
                        sqlx::query_as::<_, EventTable>(&claim)
                            .bind(registration.event_id)
                            .bind(guests)
                            .fetch_optional(&mut *tx)
                            .await?
                    }
                };

                let table = table.ok_or_else(|| {
                    CoreError::Conflict("no available table fits this party".into())
                })?;

                let update = format!(
                    "UPDATE registrations SET status = 'CONFIRMED', assigned_table_id = $2 \
                     WHERE id = $1 RETURNING {COLUMNS}"
                );
                let promoted: Registration = sqlx::query_as(&update)
                    .bind(registration.id)
                    .bind(table.id)
                    .fetch_one(&mut *tx)
                    .await?;
                (promoted, Some(table))
            }
            EventType::CapacityBased => {
                let updated = sqlx::query(
                    "UPDATE events \
                     SET spots_reserved = spots_reserved + $2 \
                     WHERE id = $1 AND spots_reserved + $2 <= capacity",
                )
                .bind(registration.event_id)
                .bind(registration.spots_count)
                .execute(&mut *tx)
                .await?;

                if updated.rows_affected() == 0 {
                    return Err(CoreError::Conflict(
                        "not enough spots remaining to promote".into(),
                    )
                    .into());
                }

                let update = format!(
                    "UPDATE registrations SET status = 'CONFIRMED' \
                     WHERE id = $1 RETURNING {COLUMNS}"
                );
                let promoted: Registration = sqlx::query_as(&update)
                    .bind(registration.id)
                    .fetch_one(&mut *tx)
                    .await?;
                (promoted, None)
            }
        };

        tx.commit().await?;
        Ok(AllocationOutcome {
            registration: promoted,
            table,
        })
    }

    /// Re-derive every non-cancelled registration's status from scratch.
    ///
    /// Replays the capacity decision in arrival order, rewrites any row
    /// whose stored status disagrees, and re-syncs `spots_reserved` to
    /// the recomputed confirmed sum. Idempotent: a second run on an
    /// already-consistent event corrects nothing.
    pub async fn repair_event(
        pool: &PgPool,
        event_id: DbId,
    ) -> DbResult<Vec<StatusCorrection>> {
        let mut tx = begin_serializable(pool).await?;

        let event: Option<(EventType, Option<i32>)> =
            sqlx::query_as("SELECT event_type, capacity FROM events WHERE id = $1")
                .bind(event_id)
                .fetch_optional(&mut *tx)
                .await?;

        let (event_type, capacity) = event.ok_or(CoreError::NotFound {
            entity: "Event",
            id: event_id,
        })?;

        if event_type != EventType::CapacityBased {
            return Err(CoreError::Validation(
                "status repair applies to capacity-based events only".into(),
            )
            .into());
        }
        let capacity = capacity.ok_or_else(|| {
            CoreError::Internal("capacity-based event has no capacity".into())
        })?;

        let query = format!(
            "SELECT {COLUMNS} FROM registrations \
             WHERE event_id = $1 AND status <> 'CANCELLED' \
             ORDER BY created_at ASC, id ASC"
        );
        let registrations: Vec<Registration> = sqlx::query_as(&query)
            .bind(event_id)
            .fetch_all(&mut *tx)
            .await?;

        let mut next_priority = registrations
            .iter()
            .filter_map(|r| r.waitlist_priority)
            .max()
            .unwrap_or(0)
            + 1;

        let mut confirmed_spots = 0;
        let mut corrections = Vec::new();

        for registration in &registrations {
            let desired = match can_register(confirmed_spots, capacity, registration.spots_count)?
            {
                CapacityDecision::Confirmed => RegistrationStatus::Confirmed,
                CapacityDecision::Waitlist => RegistrationStatus::Waitlist,
            };

            if desired == RegistrationStatus::Confirmed {
                confirmed_spots += registration.spots_count;
            }

            if registration.status == desired {
                continue;
            }

            let priority = match (desired, registration.waitlist_priority) {
                (RegistrationStatus::Waitlist, None) => {
                    let p = next_priority;
                    next_priority += 1;
                    Some(p)
                }
                (_, existing) => existing,
            };

            sqlx::query(
                "UPDATE registrations SET status = $2, waitlist_priority = $3 WHERE id = $1",
            )
            .bind(registration.id)
            .bind(desired)
            .bind(priority)
            .execute(&mut *tx)
            .await?;

            tracing::info!(
                registration_id = registration.id,
                confirmation_code = %registration.confirmation_code,
                old_status = ?registration.status,
                new_status = ?desired,
                "repaired registration status",
            );

            corrections.push(StatusCorrection {
                registration_id: registration.id,
                confirmation_code: registration.confirmation_code.clone(),
                old_status: registration.status,
                new_status: desired,
            });
        }

        sqlx::query("UPDATE events SET spots_reserved = $2 WHERE id = $1")
            .bind(event_id)
            .bind(confirmed_spots)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(corrections)
    }

    /// Find a registration by its ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> DbResult<Option<Registration>> {
        let query = format!("SELECT {COLUMNS} FROM registrations WHERE id = $1");
        let registration = sqlx::query_as(&query).bind(id).fetch_optional(pool).await?;
        Ok(registration)
    }

    /// All registrations of an event in arrival order.
    pub async fn list_for_event(pool: &PgPool, event_id: DbId) -> DbResult<Vec<Registration>> {
        let query = format!(
            "SELECT {COLUMNS} FROM registrations \
             WHERE event_id = $1 ORDER BY created_at ASC, id ASC"
        );
        let registrations = sqlx::query_as(&query)
            .bind(event_id)
            .fetch_all(pool)
            .await?;
        Ok(registrations)
    }

    /// Sum of CONFIRMED spots for an event (test and dashboard helper).
    pub async fn confirmed_spots(pool: &PgPool, event_id: DbId) -> DbResult<i64> {
        let sum: i64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM(spots_count), 0) FROM registrations \
             WHERE event_id = $1 AND status = 'CONFIRMED'",
        )
        .bind(event_id)
        .fetch_one(pool)
        .await?;
        Ok(sum)
    }

    // -----------------------------------------------------------------------
    // Transaction-internal helpers
    // -----------------------------------------------------------------------

    /// One live registration per phone per event; backed by the partial
    /// unique index for the race the pre-check cannot see.
    async fn ensure_not_registered(
        tx: &mut Transaction<'_, Postgres>,
        event_id: DbId,
        phone_number: &str,
    ) -> DbResult<()> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS( \
                 SELECT 1 FROM registrations \
                 WHERE event_id = $1 AND phone_number = $2 AND status <> 'CANCELLED' \
             )",
        )
        .bind(event_id)
        .bind(phone_number)
        .fetch_one(&mut **tx)
        .await?;

        if exists {
            return Err(CoreError::Conflict(
                "phone number already registered for this event".into(),
            )
            .into());
        }
        Ok(())
    }

    async fn next_waitlist_priority(
        tx: &mut Transaction<'_, Postgres>,
        event_id: DbId,
    ) -> DbResult<i32> {
        let next: i32 = sqlx::query_scalar(
            "SELECT COALESCE(MAX(waitlist_priority), 0) + 1 \
             FROM registrations WHERE event_id = $1",
        )
        .bind(event_id)
        .fetch_one(&mut **tx)
        .await?;
        Ok(next)
    }

    async fn insert(
        tx: &mut Transaction<'_, Postgres>,
        event_id: DbId,
        input: &NewRegistration,
        status: RegistrationStatus,
        waitlist_priority: Option<i32>,
        assigned_table_id: Option<DbId>,
    ) -> DbResult<Registration> {
        let query = format!(
            "INSERT INTO registrations \
                 (event_id, phone_number, spots_count, guests_count, status, \
                  waitlist_priority, confirmation_code, cancellation_token, \
                  assigned_table_id, form_data) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
             RETURNING {COLUMNS}"
        );
        let registration = sqlx::query_as(&query)
            .bind(event_id)
            .bind(&input.phone_number)
            .bind(input.spots_count)
            .bind(input.guests_count)
            .bind(status)
            .bind(waitlist_priority)
            .bind(&input.confirmation_code)
            .bind(&input.cancellation_token)
            .bind(assigned_table_id)
            .bind(&input.form_data)
            .fetch_one(&mut **tx)
            .await?;
        Ok(registration)
    }

    /// Flip to CANCELLED if still live; `None` means a concurrent cancel
    /// got there first.
    async fn mark_cancelled(
        tx: &mut Transaction<'_, Postgres>,
        registration_id: DbId,
        by: CancellationActor,
        reason: Option<&str>,
    ) -> DbResult<Option<Registration>> {
        let query = format!(
            "UPDATE registrations \
             SET status = 'CANCELLED', cancelled_at = NOW(), \
                 cancelled_by = $2, cancellation_reason = $3 \
             WHERE id = $1 AND status <> 'CANCELLED' \
             RETURNING {COLUMNS}"
        );
        let cancelled = sqlx::query_as(&query)
            .bind(registration_id)
            .bind(by)
            .bind(reason)
            .fetch_optional(&mut **tx)
            .await?;
        Ok(cancelled)
    }

    /// Reverse the allocation effects of a registration that was CONFIRMED:
    /// release its table or return its spots to the counter. WAITLIST rows
    /// held no resources, so there is nothing to reverse.
    async fn compensate(
        tx: &mut Transaction<'_, Postgres>,
        registration: &Registration,
        event_type: EventType,
    ) -> DbResult<()> {
        if registration.status != RegistrationStatus::Confirmed {
            return Ok(());
        }

        match event_type {
            EventType::TableBased => {
                if let Some(table_id) = registration.assigned_table_id {
                    sqlx::query(
                        "UPDATE event_tables SET status = 'AVAILABLE' \
                         WHERE id = $1 AND status = 'RESERVED'",
                    )
                    .bind(table_id)
                    .execute(&mut **tx)
                    .await?;
                }
            }
            EventType::CapacityBased => {
                sqlx::query(
                    "UPDATE events \
                     SET spots_reserved = GREATEST(0, spots_reserved - $2) \
                     WHERE id = $1",
                )
                .bind(registration.event_id)
                .bind(registration.spots_count)
                .execute(&mut **tx)
                .await?;
            }
        }
        Ok(())
    }
}
