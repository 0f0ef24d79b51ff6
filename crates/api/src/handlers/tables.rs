//! Table administration: CRUD, ordering, duplication, templates.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use validator::Validate;

use rsvp_core::error::CoreError;
use rsvp_core::types::DbId;
use rsvp_db::models::table::{CreateTable, UpdateTable};
use rsvp_db::repositories::{TableRepo, TableTemplateRepo};

use crate::error::{AppError, AppResult};
use crate::handlers::events::find_scoped_event;
use crate::middleware::rbac::{ensure_school_access, RequireAdmin};
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/events/{id}/tables
///
/// Tables in display order, each with the registration currently holding
/// it.
pub async fn list_tables(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(event_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    find_scoped_event(&state, &admin, event_id).await?;
    let tables = TableRepo::list_with_reservations(&state.pool, event_id).await?;
    Ok(Json(DataResponse { data: tables }))
}

/// POST /api/v1/events/{id}/tables
pub async fn create_table(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(event_id): Path<DbId>,
    Json(input): Json<CreateTable>,
) -> AppResult<impl IntoResponse> {
    find_scoped_event(&state, &admin, event_id).await?;
    let table = TableRepo::create(&state.pool, event_id, &input).await?;
    tracing::info!(event_id, table_id = table.id, "table created");
    Ok((StatusCode::CREATED, Json(DataResponse { data: table })))
}

/// PATCH /api/v1/events/{id}/tables/{table_id}
pub async fn update_table(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path((event_id, table_id)): Path<(DbId, DbId)>,
    Json(input): Json<UpdateTable>,
) -> AppResult<impl IntoResponse> {
    find_scoped_event(&state, &admin, event_id).await?;
    ensure_table_in_event(&state, table_id, event_id).await?;
    let table = TableRepo::update(&state.pool, table_id, &input).await?;
    Ok(Json(DataResponse { data: table }))
}

/// DELETE /api/v1/events/{id}/tables/{table_id}
///
/// Refused while the table is RESERVED.
pub async fn delete_table(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path((event_id, table_id)): Path<(DbId, DbId)>,
) -> AppResult<impl IntoResponse> {
    find_scoped_event(&state, &admin, event_id).await?;
    ensure_table_in_event(&state, table_id, event_id).await?;
    TableRepo::delete(&state.pool, table_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
pub struct ReorderBody {
    /// Table ids in their new display order.
    pub ordered_ids: Vec<DbId>,
}

/// POST /api/v1/events/{id}/tables/reorder
pub async fn reorder_tables(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(event_id): Path<DbId>,
    Json(body): Json<ReorderBody>,
) -> AppResult<impl IntoResponse> {
    find_scoped_event(&state, &admin, event_id).await?;
    TableRepo::reorder(&state.pool, event_id, &body.ordered_ids).await?;
    let tables = TableRepo::list_for_event(&state.pool, event_id).await?;
    Ok(Json(DataResponse { data: tables }))
}

/// POST /api/v1/events/{id}/tables/{table_id}/duplicate
pub async fn duplicate_table(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path((event_id, table_id)): Path<(DbId, DbId)>,
) -> AppResult<impl IntoResponse> {
    find_scoped_event(&state, &admin, event_id).await?;
    ensure_table_in_event(&state, table_id, event_id).await?;
    let table = TableRepo::duplicate(&state.pool, table_id).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: table })))
}

#[derive(Debug, Deserialize, Validate)]
pub struct SaveTemplateBody {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
}

/// POST /api/v1/events/{id}/tables/save-as-template
pub async fn save_as_template(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(event_id): Path<DbId>,
    Json(body): Json<SaveTemplateBody>,
) -> AppResult<impl IntoResponse> {
    body.validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;
    let event = find_scoped_event(&state, &admin, event_id).await?;
    let template =
        TableTemplateRepo::save_from_event(&state.pool, event.school_id, event_id, &body.name)
            .await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: template })))
}

#[derive(Debug, Deserialize)]
pub struct FromTemplateBody {
    pub template_id: DbId,
}

/// POST /api/v1/events/{id}/tables/from-template
pub async fn create_from_template(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(event_id): Path<DbId>,
    Json(body): Json<FromTemplateBody>,
) -> AppResult<impl IntoResponse> {
    let event = find_scoped_event(&state, &admin, event_id).await?;

    let template = TableTemplateRepo::find_by_id(&state.pool, body.template_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "TableTemplate",
            id: body.template_id,
        }))?;
    ensure_school_access(&admin, template.school_id)?;
    if template.school_id != event.school_id {
        return Err(AppError::Core(CoreError::Forbidden("Access denied".into())));
    }

    let tables =
        TableTemplateRepo::apply_to_event(&state.pool, body.template_id, event_id).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: tables })))
}

/// GET /api/v1/templates
pub async fn list_templates(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let school_id = admin.school_id.ok_or_else(|| {
        AppError::Core(CoreError::Forbidden("Admin must have a school assigned".into()))
    })?;
    let templates = TableTemplateRepo::list_for_school(&state.pool, school_id).await?;
    Ok(Json(DataResponse { data: templates }))
}

/// DELETE /api/v1/templates/{id}
pub async fn delete_template(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let template = TableTemplateRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "TableTemplate",
            id,
        }))?;
    ensure_school_access(&admin, template.school_id)?;
    TableTemplateRepo::delete(&state.pool, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Reject table ids that belong to a different event than the URL claims.
async fn ensure_table_in_event(
    state: &AppState,
    table_id: DbId,
    event_id: DbId,
) -> Result<(), AppError> {
    let table = TableRepo::find_by_id(&state.pool, table_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Table",
            id: table_id,
        }))?;
    if table.event_id != event_id {
        return Err(AppError::Core(CoreError::Validation(
            "table belongs to a different event".into(),
        )));
    }
    Ok(())
}
