//! Repository for the `schools` table.

use rsvp_core::types::DbId;
use sqlx::PgPool;

use crate::error::DbResult;
use crate::models::school::{CreateSchool, School};

const COLUMNS: &str = "id, name, slug, created_at, updated_at";

pub struct SchoolRepo;

impl SchoolRepo {
    pub async fn create(pool: &PgPool, input: &CreateSchool) -> DbResult<School> {
        let query = format!(
            "INSERT INTO schools (name, slug) VALUES ($1, $2) RETURNING {COLUMNS}"
        );
        let school = sqlx::query_as(&query)
            .bind(&input.name)
            .bind(&input.slug)
            .fetch_one(pool)
            .await?;
        Ok(school)
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> DbResult<Option<School>> {
        let query = format!("SELECT {COLUMNS} FROM schools WHERE id = $1");
        let school = sqlx::query_as(&query).bind(id).fetch_optional(pool).await?;
        Ok(school)
    }

    pub async fn find_by_slug(pool: &PgPool, slug: &str) -> DbResult<Option<School>> {
        let query = format!("SELECT {COLUMNS} FROM schools WHERE slug = $1");
        let school = sqlx::query_as(&query)
            .bind(slug)
            .fetch_optional(pool)
            .await?;
        Ok(school)
    }
}
