//! Public (unauthenticated) routes: event view, registration,
//! token-based cancellation.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{cancel, events, register};
use crate::state::AppState;

/// ```text
/// GET  /p/{school_slug}/{event_slug}           -> public_view
/// POST /p/{school_slug}/{event_slug}/register  -> register
/// POST /cancel                                 -> cancel
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/p/{school_slug}/{event_slug}",
            get(events::public_view),
        )
        .route(
            "/p/{school_slug}/{event_slug}/register",
            post(register::register),
        )
        .route("/cancel", post(cancel::cancel))
}
