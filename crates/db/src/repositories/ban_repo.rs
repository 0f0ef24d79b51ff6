//! Repository for the `user_bans` table: the ban gate and its lifecycle.

use rsvp_core::error::CoreError;
use rsvp_core::types::DbId;
use sqlx::PgPool;

use crate::error::DbResult;
use crate::models::ban::{BanStats, CreateBan, UserBan};

const COLUMNS: &str = "\
    id, school_id, phone_number, reason, active, expires_at, \
    banned_games_count, events_blocked, created_at, updated_at";

pub struct BanRepo;

impl BanRepo {
    /// Create a ban. Exactly one termination mode: an expiry date or a
    /// positive game count.
    pub async fn create(pool: &PgPool, school_id: DbId, input: &CreateBan) -> DbResult<UserBan> {
        let games = input.banned_games_count.unwrap_or(0);
        match (input.expires_at, games) {
            (Some(_), 0) => {}
            (None, g) if g > 0 => {}
            _ => {
                return Err(CoreError::Validation(
                    "a ban is either date-based or game-count-based, not both".into(),
                )
                .into())
            }
        }

        let query = format!(
            "INSERT INTO user_bans \
                 (school_id, phone_number, reason, expires_at, banned_games_count) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {COLUMNS}"
        );
        let ban = sqlx::query_as(&query)
            .bind(school_id)
            .bind(&input.phone_number)
            .bind(&input.reason)
            .bind(input.expires_at)
            .bind(games)
            .fetch_one(pool)
            .await?;
        Ok(ban)
    }

    /// The ban gate: first ban still blocking this identity at `NOW()`.
    ///
    /// Matches (date-based AND not expired) OR (game-count AND games
    /// remaining). Consulted before any allocation attempt so a banned
    /// identity never opens an allocation transaction.
    pub async fn find_active(
        pool: &PgPool,
        school_id: DbId,
        phone_number: &str,
    ) -> DbResult<Option<UserBan>> {
        let query = format!(
            "SELECT {COLUMNS} FROM user_bans \
             WHERE school_id = $1 AND phone_number = $2 AND active \
               AND ((expires_at IS NOT NULL AND expires_at >= NOW()) \
                    OR (expires_at IS NULL AND events_blocked < banned_games_count)) \
             ORDER BY created_at ASC \
             LIMIT 1"
        );
        let ban = sqlx::query_as(&query)
            .bind(school_id)
            .bind(phone_number)
            .fetch_optional(pool)
            .await?;
        Ok(ban)
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> DbResult<Option<UserBan>> {
        let query = format!("SELECT {COLUMNS} FROM user_bans WHERE id = $1");
        let ban = sqlx::query_as(&query).bind(id).fetch_optional(pool).await?;
        Ok(ban)
    }

    pub async fn list_for_school(pool: &PgPool, school_id: DbId) -> DbResult<Vec<UserBan>> {
        let query = format!(
            "SELECT {COLUMNS} FROM user_bans \
             WHERE school_id = $1 ORDER BY created_at DESC"
        );
        let bans = sqlx::query_as(&query)
            .bind(school_id)
            .fetch_all(pool)
            .await?;
        Ok(bans)
    }

    /// Lift a ban early. Terminal; the row stays for audit.
    pub async fn lift(pool: &PgPool, id: DbId) -> DbResult<UserBan> {
        let query = format!(
            "UPDATE user_bans SET active = FALSE WHERE id = $1 RETURNING {COLUMNS}"
        );
        let ban = sqlx::query_as(&query)
            .bind(id)
            .fetch_optional(pool)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "UserBan",
                id,
            })?;
        Ok(ban)
    }

    /// Periodic sweep: deactivate date-based bans past their expiry.
    /// Returns how many were deactivated; safe to run repeatedly.
    pub async fn deactivate_expired(pool: &PgPool) -> DbResult<u64> {
        let result = sqlx::query(
            "UPDATE user_bans SET active = FALSE \
             WHERE active AND expires_at IS NOT NULL AND expires_at < NOW()",
        )
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Event-completion hook: count one ended event against every active
    /// game-count ban in the event's school, deactivating bans that reach
    /// their count.
    ///
    /// The `ban_counters_applied` flag is claimed first, in the same
    /// transaction, so the hook applies each event at most once no matter
    /// how often the sweeper fires. Returns the number of bans advanced
    /// (0 when the event was already counted or has not ended).
    pub async fn apply_event_completion(pool: &PgPool, event_id: DbId) -> DbResult<u64> {
        let mut tx = pool.begin().await?;

        let school_id: Option<DbId> = sqlx::query_scalar(
            "UPDATE events SET ban_counters_applied = TRUE \
             WHERE id = $1 AND ban_counters_applied = FALSE \
               AND ((end_at IS NOT NULL AND end_at <= NOW()) OR status = 'COMPLETED') \
             RETURNING school_id",
        )
        .bind(event_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(school_id) = school_id else {
            tx.rollback().await?;
            return Ok(0);
        };

        let advanced = sqlx::query(
            "UPDATE user_bans SET events_blocked = events_blocked + 1 \
             WHERE school_id = $1 AND active AND expires_at IS NULL \
               AND events_blocked < banned_games_count",
        )
        .bind(school_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        sqlx::query(
            "UPDATE user_bans SET active = FALSE \
             WHERE school_id = $1 AND active AND expires_at IS NULL \
               AND events_blocked >= banned_games_count",
        )
        .bind(school_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(advanced)
    }

    /// Aggregate counts for a school's ban settings page.
    pub async fn stats(pool: &PgPool, school_id: DbId) -> DbResult<BanStats> {
        let (active, expired, total): (i64, i64, i64) = sqlx::query_as(
            "SELECT \
                 COUNT(*) FILTER (WHERE active \
                     AND ((expires_at IS NOT NULL AND expires_at >= NOW()) \
                          OR (expires_at IS NULL AND events_blocked < banned_games_count))), \
                 COUNT(*) FILTER (WHERE NOT active \
                     OR (expires_at IS NOT NULL AND expires_at < NOW())), \
                 COUNT(*) \
             FROM user_bans WHERE school_id = $1",
        )
        .bind(school_id)
        .fetch_one(pool)
        .await?;
        Ok(BanStats {
            active,
            expired,
            total,
        })
    }
}
