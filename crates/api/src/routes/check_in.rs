//! Route definitions for the token-gated check-in pages.

use axum::routing::{delete, get};
use axum::Router;

use crate::handlers::check_in;
use crate::state::AppState;

/// Routes mounted at `/check-in`.
///
/// ```text
/// GET    /{event_id}/{token}                     -> roster
/// POST   /{event_id}/{token}                     -> check_in
/// GET    /{event_id}/{token}/stats               -> stats
/// DELETE /{event_id}/{token}/{registration_id}   -> undo_check_in
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/{event_id}/{token}",
            get(check_in::roster).post(check_in::check_in),
        )
        .route("/{event_id}/{token}/stats", get(check_in::stats))
        .route(
            "/{event_id}/{token}/{registration_id}",
            delete(check_in::undo_check_in),
        )
}
