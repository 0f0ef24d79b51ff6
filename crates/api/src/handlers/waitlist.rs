//! Admin waitlist view for table-based events.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;

use rsvp_core::error::CoreError;
use rsvp_core::types::DbId;
use rsvp_db::models::event::EventType;
use rsvp_db::repositories::WaitlistRepo;

use crate::error::{AppError, AppResult};
use crate::handlers::events::find_scoped_event;
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/events/{id}/waitlist
///
/// Waitlisted parties in priority order, each with its currently fitting
/// tables and best match. Entries no table can ever seat still appear,
/// with `has_match = false`.
pub async fn waitlist(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(event_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let event = find_scoped_event(&state, &admin, event_id).await?;

    if event.event_type != EventType::TableBased {
        return Err(AppError::Core(CoreError::Validation(
            "waitlist management is only for table-based events".into(),
        )));
    }

    let overview = WaitlistRepo::overview(&state.pool, event_id).await?;
    Ok(Json(DataResponse { data: overview }))
}
