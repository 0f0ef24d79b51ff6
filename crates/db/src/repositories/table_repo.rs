//! Repository for the `event_tables` table.
//!
//! Administrative CRUD only -- the AVAILABLE→RESERVED flip happens
//! exclusively inside `RegistrationRepo`'s allocation transactions, and a
//! RESERVED table can be neither deleted nor structurally edited.

use rsvp_core::error::CoreError;
use rsvp_core::types::DbId;
use sqlx::PgPool;

use crate::error::DbResult;
use crate::models::table::{CreateTable, EventTable, TableStatus, TableWithReservation, UpdateTable};

/// Column list for `event_tables` queries.
pub(crate) const TABLE_COLUMNS: &str = "\
    id, event_id, table_number, capacity, min_order, status, table_order, \
    created_at, updated_at";

pub struct TableRepo;

impl TableRepo {
    pub async fn create(
        pool: &PgPool,
        event_id: DbId,
        input: &CreateTable,
    ) -> DbResult<EventTable> {
        validate_dimensions(input.capacity, input.min_order)?;

        let query = format!(
            "INSERT INTO event_tables \
                 (event_id, table_number, capacity, min_order, table_order) \
             VALUES ($1, $2, $3, $4, COALESCE($5, \
                 (SELECT COALESCE(MAX(table_order), 0) + 1 \
                  FROM event_tables WHERE event_id = $1))) \
             RETURNING {TABLE_COLUMNS}"
        );
        let table = sqlx::query_as(&query)
            .bind(event_id)
            .bind(input.table_number)
            .bind(input.capacity)
            .bind(input.min_order)
            .bind(input.table_order)
            .fetch_one(pool)
            .await?;
        Ok(table)
    }

    /// Bulk insert, used when stamping a template onto an event.
    pub async fn create_many(
        pool: &PgPool,
        event_id: DbId,
        inputs: &[CreateTable],
    ) -> DbResult<Vec<EventTable>> {
        let mut tx = pool.begin().await?;
        let mut tables = Vec::with_capacity(inputs.len());

        for (index, input) in inputs.iter().enumerate() {
            validate_dimensions(input.capacity, input.min_order)?;
            let query = format!(
                "INSERT INTO event_tables \
                     (event_id, table_number, capacity, min_order, table_order) \
                 VALUES ($1, $2, $3, $4, $5) \
                 RETURNING {TABLE_COLUMNS}"
            );
            let table: EventTable = sqlx::query_as(&query)
                .bind(event_id)
                .bind(input.table_number)
                .bind(input.capacity)
                .bind(input.min_order)
                .bind(input.table_order.unwrap_or(index as i32 + 1))
                .fetch_one(&mut *tx)
                .await?;
            tables.push(table);
        }

        tx.commit().await?;
        Ok(tables)
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> DbResult<Option<EventTable>> {
        let query = format!("SELECT {TABLE_COLUMNS} FROM event_tables WHERE id = $1");
        let table = sqlx::query_as(&query).bind(id).fetch_optional(pool).await?;
        Ok(table)
    }

    pub async fn list_for_event(pool: &PgPool, event_id: DbId) -> DbResult<Vec<EventTable>> {
        let query = format!(
            "SELECT {TABLE_COLUMNS} FROM event_tables \
             WHERE event_id = $1 ORDER BY table_order ASC, id ASC"
        );
        let tables = sqlx::query_as(&query)
            .bind(event_id)
            .fetch_all(pool)
            .await?;
        Ok(tables)
    }

    /// Tables with the registration currently holding each, for the admin
    /// board. The reservation join goes through
    /// `registrations.assigned_table_id` -- the only allocation link.
    pub async fn list_with_reservations(
        pool: &PgPool,
        event_id: DbId,
    ) -> DbResult<Vec<TableWithReservation>> {
        let tables = sqlx::query_as(
            "SELECT t.id, t.event_id, t.table_number, t.capacity, t.min_order, \
                    t.status, t.table_order, \
                    r.id AS reservation_id, \
                    r.confirmation_code AS reservation_code, \
                    r.guests_count AS reservation_guests, \
                    r.phone_number AS reservation_phone \
             FROM event_tables t \
             LEFT JOIN registrations r \
                    ON r.assigned_table_id = t.id AND r.status = 'CONFIRMED' \
             WHERE t.event_id = $1 \
             ORDER BY t.table_order ASC, t.id ASC",
        )
        .bind(event_id)
        .fetch_all(pool)
        .await?;
        Ok(tables)
    }

    /// Update a table. Structural edits (capacity, min_order, number) are
    /// rejected while the table is RESERVED; releasing it first is the
    /// cancellation engine's job.
    pub async fn update(pool: &PgPool, id: DbId, input: &UpdateTable) -> DbResult<EventTable> {
        let current = Self::find_by_id(pool, id).await?.ok_or(CoreError::NotFound {
            entity: "Table",
            id,
        })?;

        let structural = input.capacity.is_some()
            || input.min_order.is_some()
            || input.table_number.is_some()
            || input.status.is_some();
        if current.status == TableStatus::Reserved && structural {
            return Err(CoreError::Conflict(
                "table is reserved; cancel its registration first".into(),
            )
            .into());
        }

        let capacity = input.capacity.unwrap_or(current.capacity);
        let min_order = input.min_order.unwrap_or(current.min_order);
        validate_dimensions(capacity, min_order)?;

        let query = format!(
            "UPDATE event_tables SET \
                 table_number = COALESCE($2, table_number), \
                 capacity = COALESCE($3, capacity), \
                 min_order = COALESCE($4, min_order), \
                 status = COALESCE($5, status), \
                 table_order = COALESCE($6, table_order) \
             WHERE id = $1 \
             RETURNING {TABLE_COLUMNS}"
        );
        let table = sqlx::query_as(&query)
            .bind(id)
            .bind(input.table_number)
            .bind(input.capacity)
            .bind(input.min_order)
            .bind(input.status)
            .bind(input.table_order)
            .fetch_one(pool)
            .await?;
        Ok(table)
    }

    /// Delete a table. Refused while RESERVED.
    pub async fn delete(pool: &PgPool, id: DbId) -> DbResult<()> {
        let result = sqlx::query(
            "DELETE FROM event_tables WHERE id = $1 AND status <> 'RESERVED'",
        )
        .bind(id)
        .execute(pool)
        .await?;

        if result.rows_affected() == 0 {
            let exists: bool =
                sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM event_tables WHERE id = $1)")
                    .bind(id)
                    .fetch_one(pool)
                    .await?;
            if exists {
                return Err(CoreError::Conflict(
                    "table is reserved and cannot be deleted".into(),
                )
                .into());
            }
            return Err(CoreError::NotFound {
                entity: "Table",
                id,
            }
            .into());
        }
        Ok(())
    }

    /// Rewrite display order: position in `ordered_ids` becomes
    /// `table_order`.
    pub async fn reorder(pool: &PgPool, event_id: DbId, ordered_ids: &[DbId]) -> DbResult<()> {
        let mut tx = pool.begin().await?;
        for (index, table_id) in ordered_ids.iter().enumerate() {
            sqlx::query(
                "UPDATE event_tables SET table_order = $3 \
                 WHERE id = $1 AND event_id = $2",
            )
            .bind(table_id)
            .bind(event_id)
            .bind(index as i32 + 1)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    /// Copy a table within its event: next free table number, appended to
    /// the display order, always AVAILABLE.
    pub async fn duplicate(pool: &PgPool, id: DbId) -> DbResult<EventTable> {
        let query = format!(
            "INSERT INTO event_tables \
                 (event_id, table_number, capacity, min_order, table_order) \
             SELECT event_id, \
                    (SELECT COALESCE(MAX(table_number), 0) + 1 \
                     FROM event_tables WHERE event_id = src.event_id), \
                    capacity, min_order, \
                    (SELECT COALESCE(MAX(table_order), 0) + 1 \
                     FROM event_tables WHERE event_id = src.event_id) \
             FROM event_tables src WHERE src.id = $1 \
             RETURNING {TABLE_COLUMNS}"
        );
        let table = sqlx::query_as(&query)
            .bind(id)
            .fetch_optional(pool)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "Table",
                id,
            })?;
        Ok(table)
    }
}

fn validate_dimensions(capacity: i32, min_order: i32) -> Result<(), CoreError> {
    if capacity <= 0 {
        return Err(CoreError::Validation("table capacity must be positive".into()));
    }
    if min_order <= 0 || min_order > capacity {
        return Err(CoreError::Validation(
            "min order must be between 1 and the table capacity".into(),
        ));
    }
    Ok(())
}
