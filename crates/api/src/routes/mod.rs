//! Route tree for `/api/v1`.

pub mod bans;
pub mod check_in;
pub mod events;
pub mod health;
pub mod public;
pub mod templates;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /p/{school_slug}/{event_slug}                    public event view
/// /p/{school_slug}/{event_slug}/register           public registration
/// /cancel                                          token cancellation
///
/// /check-in/{event_id}/{token}                     roster, check in
/// /check-in/{event_id}/{token}/stats               attendance stats
/// /check-in/{event_id}/{token}/{registration_id}   undo
///
/// /events                                          list, create (admin)
/// /events/{id}                                     get, update, delete
/// /events/{id}/repair                              status repair (super admin)
/// /events/{id}/registrations                       list
/// /events/{id}/registrations/{rid}                 cancel (admin)
/// /events/{id}/registrations/{rid}/promote         waitlist promotion
/// /events/{id}/waitlist                            waitlist view
/// /events/{id}/tables                              list, create
/// /events/{id}/tables/reorder                      reorder
/// /events/{id}/tables/save-as-template             snapshot template
/// /events/{id}/tables/from-template                stamp template
/// /events/{id}/tables/{table_id}                   update, delete
/// /events/{id}/tables/{table_id}/duplicate         duplicate
///
/// /templates                                       list (admin)
/// /templates/{id}                                  delete
///
/// /bans                                            list, create (admin)
/// /bans/stats                                      aggregate counts
/// /bans/{id}                                       lift
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(public::router())
        .nest("/check-in", check_in::router())
        .nest("/events", events::router())
        .nest("/templates", templates::router())
        .nest("/bans", bans::router())
}
