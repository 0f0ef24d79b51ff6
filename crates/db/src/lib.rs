//! PostgreSQL persistence layer: models, repositories, and the
//! serializable allocation engines.
//!
//! Repositories are zero-sized structs with async methods taking `&PgPool`.
//! Every allocation-affecting operation (registration, promotion,
//! cancellation) runs inside its own SERIALIZABLE transaction; callers wrap
//! those calls in [`retry::serializable`] to absorb transient aborts.

pub mod error;
pub mod models;
pub mod repositories;
pub mod retry;

use sqlx::postgres::PgPoolOptions;

pub use error::{DbError, DbResult};

pub type DbPool = sqlx::PgPool;

/// Create a connection pool from a database URL.
pub async fn create_pool(database_url: &str) -> Result<DbPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(20)
        .connect(database_url)
        .await
}

/// Verify the database answers trivial queries.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Apply any pending migrations from `db/migrations`.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("../../db/migrations").run(pool).await
}
