//! Route definitions for the `/events` resource (admin).

use axum::routing::{delete, get, post};
use axum::Router;

use crate::handlers::{events, registrations, repair, tables, waitlist};
use crate::state::AppState;

/// Routes mounted at `/events`.
///
/// ```text
/// GET    /                                      -> list_events
/// POST   /                                      -> create_event
/// GET    /{id}                                  -> get_event
/// PATCH  /{id}                                  -> update_event
/// DELETE /{id}                                  -> delete_event
/// POST   /{id}/repair                           -> repair_event
/// GET    /{id}/waitlist                         -> waitlist
/// GET    /{id}/registrations                    -> list_registrations
/// DELETE /{id}/registrations/{rid}              -> cancel_registration
/// POST   /{id}/registrations/{rid}/promote      -> promote_registration
/// GET    /{id}/tables                           -> list_tables
/// POST   /{id}/tables                           -> create_table
/// POST   /{id}/tables/reorder                   -> reorder_tables
/// POST   /{id}/tables/save-as-template          -> save_as_template
/// POST   /{id}/tables/from-template             -> create_from_template
/// PATCH  /{id}/tables/{table_id}                -> update_table
/// DELETE /{id}/tables/{table_id}                -> delete_table
/// POST   /{id}/tables/{table_id}/duplicate      -> duplicate_table
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(events::list_events).post(events::create_event))
        .route(
            "/{id}",
            get(events::get_event)
                .patch(events::update_event)
                .delete(events::delete_event),
        )
        .route("/{id}/repair", post(repair::repair_event))
        .route("/{id}/waitlist", get(waitlist::waitlist))
        .route(
            "/{id}/registrations",
            get(registrations::list_registrations),
        )
        .route(
            "/{id}/registrations/{rid}",
            delete(registrations::cancel_registration),
        )
        .route(
            "/{id}/registrations/{rid}/promote",
            post(registrations::promote_registration),
        )
        .route(
            "/{id}/tables",
            get(tables::list_tables).post(tables::create_table),
        )
        .route("/{id}/tables/reorder", post(tables::reorder_tables))
        .route(
            "/{id}/tables/save-as-template",
            post(tables::save_as_template),
        )
        .route(
            "/{id}/tables/from-template",
            post(tables::create_from_template),
        )
        .route(
            "/{id}/tables/{table_id}",
            axum::routing::patch(tables::update_table).delete(tables::delete_table),
        )
        .route(
            "/{id}/tables/{table_id}/duplicate",
            post(tables::duplicate_table),
        )
}
