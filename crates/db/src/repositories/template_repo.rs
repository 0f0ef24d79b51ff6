//! Repository for reusable table layouts.

use rsvp_core::error::CoreError;
use rsvp_core::types::DbId;
use sqlx::PgPool;

use crate::error::DbResult;
use crate::models::table::{CreateTable, EventTable};
use crate::models::template::{TableTemplate, TemplateSlot};
use crate::repositories::TableRepo;

const COLUMNS: &str = "id, school_id, name, layout, created_at, updated_at";

pub struct TableTemplateRepo;

impl TableTemplateRepo {
    /// Snapshot an event's table plan under a name.
    pub async fn save_from_event(
        pool: &PgPool,
        school_id: DbId,
        event_id: DbId,
        name: &str,
    ) -> DbResult<TableTemplate> {
        let slots: Vec<(i32, i32, i32)> = sqlx::query_as(
            "SELECT table_number, capacity, min_order FROM event_tables \
             WHERE event_id = $1 ORDER BY table_order ASC, id ASC",
        )
        .bind(event_id)
        .fetch_all(pool)
        .await?;

        if slots.is_empty() {
            return Err(CoreError::Validation(
                "event has no tables to save as a template".into(),
            )
            .into());
        }

        let layout: Vec<TemplateSlot> = slots
            .into_iter()
            .map(|(table_number, capacity, min_order)| TemplateSlot {
                table_number,
                capacity,
                min_order,
            })
            .collect();

        let query = format!(
            "INSERT INTO table_templates (school_id, name, layout) \
             VALUES ($1, $2, $3) RETURNING {COLUMNS}"
        );
        let template = sqlx::query_as(&query)
            .bind(school_id)
            .bind(name)
            .bind(serde_json::to_value(&layout).map_err(|e| {
                CoreError::Internal(format!("failed to encode template layout: {e}"))
            })?)
            .fetch_one(pool)
            .await?;
        Ok(template)
    }

    /// Stamp a template's tables onto an event.
    pub async fn apply_to_event(
        pool: &PgPool,
        template_id: DbId,
        event_id: DbId,
    ) -> DbResult<Vec<EventTable>> {
        let template = Self::find_by_id(pool, template_id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "TableTemplate",
                id: template_id,
            })?;

        let slots: Vec<TemplateSlot> = serde_json::from_value(template.layout)
            .map_err(|e| CoreError::Internal(format!("corrupt template layout: {e}")))?;

        let inputs: Vec<CreateTable> = slots
            .into_iter()
            .map(|slot| CreateTable {
                table_number: slot.table_number,
                capacity: slot.capacity,
                min_order: slot.min_order,
                table_order: None,
            })
            .collect();

        TableRepo::create_many(pool, event_id, &inputs).await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> DbResult<Option<TableTemplate>> {
        let query = format!("SELECT {COLUMNS} FROM table_templates WHERE id = $1");
        let template = sqlx::query_as(&query).bind(id).fetch_optional(pool).await?;
        Ok(template)
    }

    pub async fn list_for_school(pool: &PgPool, school_id: DbId) -> DbResult<Vec<TableTemplate>> {
        let query = format!(
            "SELECT {COLUMNS} FROM table_templates \
             WHERE school_id = $1 ORDER BY name ASC"
        );
        let templates = sqlx::query_as(&query)
            .bind(school_id)
            .fetch_all(pool)
            .await?;
        Ok(templates)
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM table_templates WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(CoreError::NotFound {
                entity: "TableTemplate",
                id,
            }
            .into());
        }
        Ok(())
    }
}
