//! Route definitions for the `/bans` resource (admin).

use axum::routing::{delete, get};
use axum::Router;

use crate::handlers::bans;
use crate::state::AppState;

/// ```text
/// GET    /        -> list_bans
/// POST   /        -> create_ban
/// GET    /stats   -> ban_stats
/// DELETE /{id}    -> lift_ban
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(bans::list_bans).post(bans::create_ban))
        .route("/stats", get(bans::ban_stats))
        .route("/{id}", delete(bans::lift_ban))
}
