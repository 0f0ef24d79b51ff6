//! Route definitions for the `/templates` resource (admin).

use axum::routing::{delete, get};
use axum::Router;

use crate::handlers::tables;
use crate::state::AppState;

/// ```text
/// GET    /       -> list_templates
/// DELETE /{id}   -> delete_template
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(tables::list_templates))
        .route("/{id}", delete(tables::delete_template))
}
