//! Admin repair job: full status re-derivation for an event.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

use rsvp_core::types::DbId;
use rsvp_db::models::registration::StatusCorrection;
use rsvp_db::repositories::RegistrationRepo;
use rsvp_db::retry;

use crate::error::AppResult;
use crate::middleware::rbac::RequireSuperAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct RepairResponse {
    pub message: String,
    pub corrections: Vec<StatusCorrection>,
}

/// POST /api/v1/events/{id}/repair
///
/// Replays the capacity decision over the event's registrations in
/// arrival order and rewrites any drifted status, re-syncing the
/// reserved-spots counter. Zero corrections is success; running it twice
/// corrects nothing the second time. Super admin only.
pub async fn repair_event(
    RequireSuperAdmin(admin): RequireSuperAdmin,
    State(state): State<AppState>,
    Path(event_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let corrections =
        retry::serializable(|| RegistrationRepo::repair_event(&state.pool, event_id)).await?;

    tracing::info!(
        event_id,
        admin_id = admin.user_id,
        corrections = corrections.len(),
        "registration status repair completed",
    );

    Ok(Json(DataResponse {
        data: RepairResponse {
            message: format!("Fixed {} registration status issues", corrections.len()),
            corrections,
        },
    }))
}
