//! Periodic ban maintenance.
//!
//! [`BanSweeper`] runs as a background task: it deactivates date-based
//! bans past their expiry and counts ended events against active
//! game-count bans. Both passes are idempotent, so the interval is a
//! freshness knob, not a correctness one.

use std::time::Duration;

use tokio_util::sync::CancellationToken;

use rsvp_db::repositories::{BanRepo, EventRepo};
use rsvp_db::{DbError, DbPool};

/// How often the sweeper polls.
const SWEEP_INTERVAL: Duration = Duration::from_secs(3600);

/// Background service that maintains ban lifecycles.
pub struct BanSweeper {
    pool: DbPool,
}

impl BanSweeper {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Run the sweep loop until the token is cancelled.
    pub async fn run(&self, cancel: CancellationToken) {
        let mut interval = tokio::time::interval(SWEEP_INTERVAL);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("ban sweeper cancelled");
                    break;
                }
                _ = interval.tick() => {
                    if let Err(e) = self.sweep().await {
                        tracing::error!(error = %e, "ban sweep failed");
                    }
                }
            }
        }
    }

    /// One full pass: expire date-based bans, then apply every ended,
    /// not-yet-counted event to its school's game-count bans.
    pub async fn sweep(&self) -> Result<(), DbError> {
        let expired = BanRepo::deactivate_expired(&self.pool).await?;
        if expired > 0 {
            tracing::info!(count = expired, "deactivated expired date-based bans");
        }

        let ended = EventRepo::list_ended_unswept(&self.pool).await?;
        for event in &ended {
            match BanRepo::apply_event_completion(&self.pool, event.id).await {
                Ok(advanced) => {
                    tracing::info!(
                        event_id = event.id,
                        school_id = event.school_id,
                        bans_advanced = advanced,
                        "counted ended event against game-count bans",
                    );
                }
                Err(e) => {
                    tracing::error!(
                        event_id = event.id,
                        error = %e,
                        "failed to apply event completion to bans",
                    );
                }
            }
        }

        Ok(())
    }
}
