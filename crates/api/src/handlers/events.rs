//! Event administration and the public event view.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

use rsvp_core::codes::generate_check_in_token;
use rsvp_core::error::CoreError;
use rsvp_core::form::FormField;
use rsvp_core::types::{DbId, Timestamp};
use rsvp_db::models::event::{CreateEvent, Event, EventStatus, EventType, UpdateEvent};
use rsvp_db::repositories::{EventRepo, RegistrationRepo, SchoolRepo};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::{ensure_school_access, RequireAdmin};
use crate::response::DataResponse;
use crate::state::AppState;

/// Public projection of an event for the registration page.
#[derive(Debug, Serialize)]
pub struct PublicEvent {
    pub title: String,
    pub event_type: EventType,
    pub status: EventStatus,
    pub start_at: Timestamp,
    pub spots_left: Option<i32>,
    pub max_spots_per_person: i32,
    pub form_fields: Vec<FormField>,
}

/// GET /api/v1/p/{school_slug}/{event_slug}
pub async fn public_view(
    State(state): State<AppState>,
    Path((school_slug, event_slug)): Path<(String, String)>,
) -> AppResult<impl IntoResponse> {
    let school = SchoolRepo::find_by_slug(&state.pool, &school_slug)
        .await?
        .ok_or_else(|| AppError::NotFound("School not found".into()))?;
    let event = EventRepo::find_by_slug(&state.pool, school.id, &event_slug)
        .await?
        .ok_or_else(|| AppError::NotFound("Event not found".into()))?;

    let form_fields: Vec<FormField> = serde_json::from_value(event.form_fields.clone())
        .map_err(|e| AppError::InternalError(format!("corrupt event form schema: {e}")))?;

    let spots_left = event
        .capacity
        .map(|c| (c - event.spots_reserved).max(0));

    Ok(Json(DataResponse {
        data: PublicEvent {
            title: event.title,
            event_type: event.event_type,
            status: event.status,
            start_at: event.start_at,
            spots_left,
            max_spots_per_person: event.max_spots_per_person,
            form_fields,
        },
    }))
}

/// POST /api/v1/events
///
/// Creates an event in the caller's school with a fresh check-in token.
pub async fn create_event(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Json(input): Json<CreateEvent>,
) -> AppResult<impl IntoResponse> {
    let school_id = admin.school_id.ok_or_else(|| {
        AppError::Core(CoreError::Forbidden("Admin must have a school assigned".into()))
    })?;

    let check_in_token = generate_check_in_token();
    let event = EventRepo::create(&state.pool, school_id, &check_in_token, &input).await?;

    tracing::info!(
        event_id = event.id,
        school_id,
        event_type = ?event.event_type,
        "event created",
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: event })))
}

/// GET /api/v1/events
pub async fn list_events(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let school_id = admin.school_id.ok_or_else(|| {
        AppError::Core(CoreError::Forbidden("Admin must have a school assigned".into()))
    })?;
    let events = EventRepo::list_for_school(&state.pool, school_id).await?;
    Ok(Json(DataResponse { data: events }))
}

/// Admin detail view: the event plus its confirmed-spots sum, which must
/// track `spots_reserved`.
#[derive(Debug, Serialize)]
pub struct EventDetail {
    #[serde(flatten)]
    pub event: Event,
    pub confirmed_spots: i64,
}

/// GET /api/v1/events/{id}
pub async fn get_event(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let event = find_scoped_event(&state, &admin, id).await?;
    let confirmed_spots = RegistrationRepo::confirmed_spots(&state.pool, event.id).await?;
    Ok(Json(DataResponse {
        data: EventDetail {
            event,
            confirmed_spots,
        },
    }))
}

/// PATCH /api/v1/events/{id}
pub async fn update_event(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateEvent>,
) -> AppResult<impl IntoResponse> {
    find_scoped_event(&state, &admin, id).await?;
    let event = EventRepo::update(&state.pool, id, &input).await?;
    Ok(Json(DataResponse { data: event }))
}

/// DELETE /api/v1/events/{id}
///
/// Tables and registrations cascade.
pub async fn delete_event(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    find_scoped_event(&state, &admin, id).await?;
    EventRepo::delete(&state.pool, id).await?;
    tracing::info!(event_id = id, "event deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// Fetch an event and enforce the caller's school scope.
pub(crate) async fn find_scoped_event(
    state: &AppState,
    admin: &AuthUser,
    event_id: DbId,
) -> Result<Event, AppError> {
    let event = EventRepo::find_by_id(&state.pool, event_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Event",
            id: event_id,
        }))?;
    ensure_school_access(admin, event.school_id)?;
    Ok(event)
}
