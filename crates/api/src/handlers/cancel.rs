//! Customer self-service cancellation, authorized by capability token.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use validator::Validate;

use rsvp_core::token::verify_cancellation_token;
use rsvp_core::types::DbId;
use rsvp_db::models::registration::RegistrationStatus;
use rsvp_db::repositories::RegistrationRepo;
use rsvp_db::retry;
use rsvp_events::{RegistrationEvent, RegistrationEventKind};

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct CancelBody {
    #[validate(length(min = 1))]
    pub token: String,
    #[validate(length(max = 500))]
    pub reason: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CancelResponse {
    pub registration_id: DbId,
    pub status: RegistrationStatus,
}

/// POST /api/v1/cancel
///
/// Verifies the signed cancellation token, enforces the event's deadline,
/// and reverses the registration's allocation effects. Double
/// cancellation is reported as a conflict, not silently accepted.
pub async fn cancel(
    State(state): State<AppState>,
    Json(body): Json<CancelBody>,
) -> AppResult<impl IntoResponse> {
    body.validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let claims =
        verify_cancellation_token(&state.config.jwt.secret, &body.token).map_err(AppError::Core)?;

    let cancelled = retry::serializable(|| {
        RegistrationRepo::cancel_with_token(
            &state.pool,
            claims.event_id,
            &claims.phone,
            body.reason.as_deref(),
        )
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
        event_id = cancelled.event_id,
        registration_id = cancelled.id,
        "registration cancelled by customer",
    );

    Ok(Json(DataResponse {
        data: CancelResponse {
            registration_id: cancelled.id,
            status: cancelled.status,
        },
    }))
}
