//! Check-in page endpoints: token-gated, public-but-unguessable.
//!
//! The URL token is the authorization; there is no session. Format is
//! checked before the database is consulted, and the stored token is
//! compared verbatim.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;

use rsvp_core::codes::is_valid_check_in_token;
use rsvp_core::error::CoreError;
use rsvp_core::types::DbId;
use rsvp_db::models::event::Event;
use rsvp_db::repositories::{CheckInRepo, EventRepo};

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/check-in/{event_id}/{token}
///
/// The roster: every live registration with its check-in state.
pub async fn roster(
    State(state): State<AppState>,
    Path((event_id, token)): Path<(DbId, String)>,
) -> AppResult<impl IntoResponse> {
    verify_event_token(&state, event_id, &token).await?;
    let entries = CheckInRepo::roster(&state.pool, event_id).await?;
    Ok(Json(DataResponse { data: entries }))
}

#[derive(Debug, Deserialize)]
pub struct CheckInBody {
    pub registration_id: DbId,
    pub checked_in_by: Option<String>,
}

/// POST /api/v1/check-in/{event_id}/{token}
///
/// Record attendance. Allowed only on the event day; lateness is derived
/// against the event start with a grace period.
pub async fn check_in(
    State(state): State<AppState>,
    Path((event_id, token)): Path<(DbId, String)>,
    Json(body): Json<CheckInBody>,
) -> AppResult<impl IntoResponse> {
    verify_event_token(&state, event_id, &token).await?;

    let check_in = CheckInRepo::check_in(
        &state.pool,
        event_id,
        body.registration_id,
        body.checked_in_by.as_deref(),
    )
    .await?;

    tracing::info!(
        event_id,
        registration_id = body.registration_id,
        is_late = check_in.is_late,
        "attendance recorded",
    );

    Ok(Json(DataResponse { data: check_in }))
}

#[derive(Debug, Deserialize, Default)]
pub struct UndoBody {
    pub undone_by: Option<String>,
    pub undone_reason: Option<String>,
}

/// DELETE /api/v1/check-in/{event_id}/{token}/{registration_id}
///
/// Undo an attendance record without deleting it.
pub async fn undo_check_in(
    State(state): State<AppState>,
    Path((event_id, token, registration_id)): Path<(DbId, String, DbId)>,
    body: Option<Json<UndoBody>>,
) -> AppResult<impl IntoResponse> {
    verify_event_token(&state, event_id, &token).await?;

    let body = body.map(|Json(b)| b).unwrap_or_default();
    let check_in = CheckInRepo::undo(
        &state.pool,
        event_id,
        registration_id,
        body.undone_by.as_deref(),
        body.undone_reason.as_deref(),
    )
    .await?;

    tracing::info!(event_id, registration_id, "check-in undone");

    Ok(Json(DataResponse { data: check_in }))
}

/// GET /api/v1/check-in/{event_id}/{token}/stats
pub async fn stats(
    State(state): State<AppState>,
    Path((event_id, token)): Path<(DbId, String)>,
) -> AppResult<impl IntoResponse> {
    verify_event_token(&state, event_id, &token).await?;
    let stats = CheckInRepo::stats(&state.pool, event_id).await?;
    Ok(Json(DataResponse { data: stats }))
}

/// Validate the token format, then compare against the event's stored
/// token. Both failures collapse to the same 401.
async fn verify_event_token(
    state: &AppState,
    event_id: DbId,
    token: &str,
) -> Result<Event, AppError> {
    if !is_valid_check_in_token(token) {
        return Err(AppError::Core(CoreError::InvalidToken));
    }

    let event = EventRepo::find_by_id(&state.pool, event_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Event",
            id: event_id,
        }))?;

    if event.check_in_token != token {
        return Err(AppError::Core(CoreError::InvalidToken));
    }

    Ok(event)
}
