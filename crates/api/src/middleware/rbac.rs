//! Role-based access control extractors and the school-scope check.
//!
//! Each extractor wraps [`AuthUser`] and rejects requests whose role does
//! not meet the minimum requirement. School scoping is enforced per
//! resource with [`ensure_school_access`].

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use rsvp_core::error::CoreError;
use rsvp_core::roles::{is_school_scoped, ROLE_ADMIN, ROLE_OWNER, ROLE_SUPER_ADMIN};
use rsvp_core::types::DbId;

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

/// Requires any admin role (`ADMIN`, `OWNER`, or `SUPER_ADMIN`).
///
/// ```ignore
/// async fn admin_only(RequireAdmin(admin): RequireAdmin) -> AppResult<Json<()>> {
///     Ok(Json(()))
/// }
/// ```
pub struct RequireAdmin(pub AuthUser);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if user.role != ROLE_ADMIN && user.role != ROLE_OWNER && user.role != ROLE_SUPER_ADMIN {
            return Err(AppError::Core(CoreError::Forbidden(
                "Admin role required".into(),
            )));
        }
        Ok(RequireAdmin(user))
    }
}

/// Requires the `SUPER_ADMIN` role. Rejects with 403 Forbidden otherwise.
pub struct RequireSuperAdmin(pub AuthUser);

impl FromRequestParts<AppState> for RequireSuperAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if user.role != ROLE_SUPER_ADMIN {
            return Err(AppError::Core(CoreError::Forbidden(
                "Super admin role required".into(),
            )));
        }
        Ok(RequireSuperAdmin(user))
    }
}

/// A school-scoped principal may only touch resources of its own school.
pub fn ensure_school_access(admin: &AuthUser, school_id: DbId) -> Result<(), AppError> {
    if !is_school_scoped(&admin.role) {
        return Ok(());
    }
    match admin.school_id {
        Some(own) if own == school_id => Ok(()),
        Some(_) => Err(AppError::Core(CoreError::Forbidden(
            "Access denied".into(),
        ))),
        None => Err(AppError::Core(CoreError::Forbidden(
            "Admin must have a school assigned".into(),
        ))),
    }
}
