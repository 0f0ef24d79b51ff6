//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument. Allocation-affecting methods
//! open their own SERIALIZABLE transactions via [`begin_serializable`].

pub mod ban_repo;
pub mod check_in_repo;
pub mod event_repo;
pub mod registration_repo;
pub mod school_repo;
pub mod table_repo;
pub mod template_repo;
pub mod waitlist_repo;

pub use ban_repo::BanRepo;
pub use check_in_repo::CheckInRepo;
pub use event_repo::EventRepo;
pub use registration_repo::{AllocationOutcome, RegistrationRepo};
pub use school_repo::SchoolRepo;
pub use table_repo::TableRepo;
pub use template_repo::TableTemplateRepo;
pub use waitlist_repo::{WaitlistEntry, WaitlistOverview, WaitlistRepo, WaitlistStats};

use sqlx::{PgPool, Postgres, Transaction};

use crate::error::DbResult;

/// Open a transaction at SERIALIZABLE isolation.
///
/// Weaker isolation would let two concurrent transactions both read the
/// capacity as available and both commit; every allocation-affecting
/// operation must go through here.
pub(crate) async fn begin_serializable(
    pool: &PgPool,
) -> DbResult<Transaction<'static, Postgres>> {
    let mut tx = pool.begin().await?;
    sqlx::query("SET TRANSACTION ISOLATION LEVEL SERIALIZABLE")
        .execute(&mut *tx)
        .await?;
    Ok(tx)
}
