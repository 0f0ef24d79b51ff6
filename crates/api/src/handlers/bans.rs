//! Admin ban management.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use rsvp_core::error::CoreError;
use rsvp_core::phone::normalize_phone;
use rsvp_core::types::DbId;
use rsvp_db::models::ban::CreateBan;
use rsvp_db::repositories::BanRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::{ensure_school_access, RequireAdmin};
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/bans
pub async fn list_bans(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let school_id = own_school(&admin)?;
    let bans = BanRepo::list_for_school(&state.pool, school_id).await?;
    Ok(Json(DataResponse { data: bans }))
}

/// POST /api/v1/bans
///
/// The phone is normalized before storage so the gate's lookup key always
/// matches registrations.
pub async fn create_ban(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Json(mut input): Json<CreateBan>,
) -> AppResult<impl IntoResponse> {
    let school_id = own_school(&admin)?;
    input.phone_number = normalize_phone(&input.phone_number).map_err(AppError::Core)?;

    let ban = BanRepo::create(&state.pool, school_id, &input).await?;

    tracing::info!(
        ban_id = ban.id,
        school_id,
        admin_id = admin.user_id,
        date_based = ban.expires_at.is_some(),
        "ban created",
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: ban })))
}

/// DELETE /api/v1/bans/{id}
///
/// Lift a ban early. The row stays, deactivated, for audit.
pub async fn lift_ban(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let ban = BanRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "UserBan",
            id,
        }))?;
    ensure_school_access(&admin, ban.school_id)?;

    let ban = BanRepo::lift(&state.pool, id).await?;
    tracing::info!(ban_id = id, admin_id = admin.user_id, "ban lifted");
    Ok(Json(DataResponse { data: ban }))
}

/// GET /api/v1/bans/stats
pub async fn ban_stats(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let school_id = own_school(&admin)?;
    let stats = BanRepo::stats(&state.pool, school_id).await?;
    Ok(Json(DataResponse { data: stats }))
}

fn own_school(admin: &AuthUser) -> Result<DbId, AppError> {
    admin.school_id.ok_or_else(|| {
        AppError::Core(CoreError::Forbidden(
            "Admin must have a school assigned".into(),
        ))
    })
}
