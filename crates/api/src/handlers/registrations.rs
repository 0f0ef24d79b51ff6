//! Admin-side registration management: listing, cancellation, promotion.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;

use rsvp_core::types::DbId;
use rsvp_db::repositories::RegistrationRepo;
use rsvp_db::retry;
use rsvp_events::{RegistrationEvent, RegistrationEventKind};

use crate::error::AppResult;
use crate::handlers::events::find_scoped_event;
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/events/{id}/registrations
///
/// All registrations of the event in arrival order, cancelled included
/// (the audit trail is part of the view).
pub async fn list_registrations(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(event_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    find_scoped_event(&state, &admin, event_id).await?;
    let registrations = RegistrationRepo::list_for_event(&state.pool, event_id).await?;
    Ok(Json(DataResponse {
        data: registrations,
    }))
}

#[derive(Debug, Deserialize, Default)]
pub struct AdminCancelBody {
    pub reason: Option<String>,
}

/// DELETE /api/v1/events/{id}/registrations/{registration_id}
///
/// Admin cancellation: no deadline check, same compensation as the
/// customer path, `cancelled_by = ADMIN`.
pub async fn cancel_registration(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path((event_id, registration_id)): Path<(DbId, DbId)>,
    body: Option<Json<AdminCancelBody>>,
) -> AppResult<impl IntoResponse> {
    find_scoped_event(&state, &admin, event_id).await?;

    let reason = body.as_ref().and_then(|b| b.reason.as_deref());
    let cancelled = retry::serializable(|| {
        RegistrationRepo::cancel_by_admin(&state.pool, registration_id, reason)
    })
    .await?;

    state.event_bus.publish(RegistrationEvent::new(
        RegistrationEventKind::Cancelled,
        cancelled.id,
        cancelled.event_id,
        cancelled.confirmation_code.clone(),
        cancelled.cancellation_token.clone(),
    ));

    tracing::info!(
        event_id,
        registration_id,
        admin_id = admin.user_id,
        "registration cancelled by admin",
    );

    Ok(Json(DataResponse { data: cancelled }))
}

#[derive(Debug, Deserialize, Default)]
pub struct PromoteBody {
    /// Pin a specific table; best-fit applies when absent (table-based
    /// events only).
    pub table_id: Option<DbId>,
}

/// POST /api/v1/events/{id}/registrations/{registration_id}/promote
///
/// Explicit WAITLIST → CONFIRMED transition. Runs through the same
/// conditional claims as incoming registrations, so it cannot race one
/// into over-booking.
pub async fn promote_registration(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path((event_id, registration_id)): Path<(DbId, DbId)>,
    body: Option<Json<PromoteBody>>,
) -> AppResult<impl IntoResponse> {
    find_scoped_event(&state, &admin, event_id).await?;

    let table_id = body.as_ref().and_then(|b| b.table_id);
    let outcome = retry::serializable(|| {
        RegistrationRepo::promote(&state.pool, registration_id, table_id)
    })
    .await?;

    state.event_bus.publish(RegistrationEvent::new(
        RegistrationEventKind::Confirmed,
        outcome.registration.id,
        outcome.registration.event_id,
        outcome.registration.confirmation_code.clone(),
        outcome.registration.cancellation_token.clone(),
    ));

    tracing::info!(
        event_id,
        registration_id,
        table_id = outcome.table.as_ref().map(|t| t.id),
        admin_id = admin.user_id,
        "waitlisted registration promoted",
    );

    Ok(Json(DataResponse {
        data: outcome.registration,
    }))
}
