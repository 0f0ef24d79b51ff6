//! Public registration endpoint.
//!
//! The pipeline: resolve school and event, normalize the phone identity,
//! consult the ban gate, validate the form payload, then hand off to the
//! allocation engine for the event's type. The engine call is wrapped in
//! the bounded serializable retry; a conflict that survives the retries
//! surfaces as 409, never as a silent WAITLIST.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use validator::Validate;

use rsvp_core::codes::generate_confirmation_code;
use rsvp_core::error::CoreError;
use rsvp_core::form::{validate_form_data, FormField};
use rsvp_core::phone::normalize_phone;
use rsvp_core::token::{sign_cancellation_token, CANCELLATION_TOKEN_TTL_DAYS};
use rsvp_core::types::DbId;
use rsvp_db::models::event::{Event, EventType};
use rsvp_db::models::registration::{NewRegistration, RegistrationStatus};
use rsvp_db::repositories::{AllocationOutcome, BanRepo, EventRepo, RegistrationRepo, SchoolRepo};
use rsvp_db::retry;
use rsvp_events::{RegistrationEvent, RegistrationEventKind};

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterBody {
    #[validate(length(min = 1, max = 32))]
    pub phone: String,
    /// Spots requested; capacity-based events only (default 1).
    pub spots_count: Option<i32>,
    /// Party size; required for table-based events.
    pub guests_count: Option<i32>,
    /// Submitted form fields, validated against the event's schema.
    #[serde(default)]
    pub form_data: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub registration_id: DbId,
    pub status: RegistrationStatus,
    pub confirmation_code: String,
    pub cancellation_token: String,
    /// Set when a table-based registration was confirmed.
    pub table_number: Option<i32>,
}

/// POST /api/v1/p/{school_slug}/{event_slug}/register
///
/// Returns 201 with the registration outcome (CONFIRMED or WAITLIST).
pub async fn register(
    State(state): State<AppState>,
    Path((school_slug, event_slug)): Path<(String, String)>,
    Json(body): Json<RegisterBody>,
) -> AppResult<impl IntoResponse> {
    body.validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let school = SchoolRepo::find_by_slug(&state.pool, &school_slug)
        .await?
        .ok_or_else(|| AppError::NotFound("School not found".into()))?;

    let event = EventRepo::find_by_slug(&state.pool, school.id, &event_slug)
        .await?
        .ok_or_else(|| AppError::NotFound("Event not found".into()))?;

    let phone = normalize_phone(&body.phone).map_err(AppError::Core)?;

    // Ban gate: short-circuit before any allocation transaction opens.
    if BanRepo::find_active(&state.pool, school.id, &phone)
        .await?
        .is_some()
    {
        return Err(AppError::Core(CoreError::Forbidden(
            "Registration is not available for this phone number".into(),
        )));
    }

    let schema: Vec<FormField> = serde_json::from_value(event.form_fields.clone())
        .map_err(|e| AppError::InternalError(format!("corrupt event form schema: {e}")))?;
    validate_form_data(&schema, &body.form_data).map_err(AppError::Core)?;

    let input = build_registration(&state, &event, &phone, &body)?;

    let outcome = match event.event_type {
        EventType::CapacityBased => {
            retry::serializable(|| {
                RegistrationRepo::register_capacity(&state.pool, event.id, &input)
            })
            .await?
        }
        EventType::TableBased => {
            retry::serializable(|| {
                RegistrationRepo::register_table(&state.pool, event.id, &input)
            })
            .await?
        }
    };

    let AllocationOutcome {
        registration,
        table,
    } = outcome;

    let kind = match registration.status {
        RegistrationStatus::Confirmed => RegistrationEventKind::Confirmed,
        _ => RegistrationEventKind::Waitlisted,
    };
    state.event_bus.publish(RegistrationEvent::new(
        kind,
        registration.id,
        event.id,
        registration.confirmation_code.clone(),
        registration.cancellation_token.clone(),
    ));

    tracing::info!(
        event_id = event.id,
        registration_id = registration.id,
        status = ?registration.status,
        "registration processed",
    );

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: RegisterResponse {
                registration_id: registration.id,
                status: registration.status,
                confirmation_code: registration.confirmation_code,
                cancellation_token: registration.cancellation_token,
                table_number: table.map(|t| t.table_number),
            },
        }),
    ))
}

/// Validate the count fields against the event and assemble the engine
/// input, with a freshly generated confirmation code and capability token.
fn build_registration(
    state: &AppState,
    event: &Event,
    phone: &str,
    body: &RegisterBody,
) -> Result<NewRegistration, AppError> {
    let spots_count = body.spots_count.unwrap_or(1);

    match event.event_type {
        EventType::CapacityBased => {
            if spots_count < 1 || spots_count > event.max_spots_per_person {
                return Err(AppError::Core(CoreError::Validation(format!(
                    "spots count must be between 1 and {}",
                    event.max_spots_per_person
                ))));
            }
        }
        EventType::TableBased => {
            if body.guests_count.is_none() {
                return Err(AppError::Core(CoreError::Validation(
                    "guest count is required for table reservations".into(),
                )));
            }
        }
    }

    let cancellation_token = sign_cancellation_token(
        &state.config.jwt.secret,
        event.id,
        phone,
        chrono::Duration::days(CANCELLATION_TOKEN_TTL_DAYS),
    )
    .map_err(AppError::Core)?;

    Ok(NewRegistration {
        phone_number: phone.to_string(),
        spots_count,
        guests_count: body.guests_count,
        form_data: serde_json::Value::Object(body.form_data.clone()),
        confirmation_code: generate_confirmation_code(),
        cancellation_token,
    })
}
