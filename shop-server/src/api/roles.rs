//! Role administration endpoints (super admin)

use axum::extract::{Path, State};
use axum::{Extension, Json};
use shared::error::ApiResponse;
use shared::models::{
    AssignRoleRequest, RemoveRoleRequest, RoleInfo, User, UserRoleResponse, UserWithRole,
};

use super::{ApiResult, actor};
use crate::auth::CurrentUser;
use crate::services::roles;
use crate::state::AppState;

/// GET /api/v1/admin/roles
pub async fn list_roles(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> ApiResult<Vec<RoleInfo>> {
    actor(&state, &user).await?.require_super_admin()?;
    Ok(ApiResponse::success(roles::list_roles(&state.pool).await?))
}

/// POST /api/v1/admin/roles/assign
pub async fn assign_role(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(req): Json<AssignRoleRequest>,
) -> ApiResult<UserRoleResponse> {
    let actor = actor(&state, &user).await?;
    let result = roles::assign_role(&state.pool, &actor, req.user_id, &req.role).await?;
    Ok(ApiResponse::success_with_message("Role assigned", result))
}

/// DELETE /api/v1/admin/roles/remove
pub async fn remove_role(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(req): Json<RemoveRoleRequest>,
) -> ApiResult<UserRoleResponse> {
    let actor = actor(&state, &user).await?;
    let result = roles::remove_role(&state.pool, &actor, req.user_id).await?;
    Ok(ApiResponse::success_with_message("Role removed", result))
}

/// GET /api/v1/admin/roles/users/{role}
pub async fn users_by_role(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(role): Path<String>,
) -> ApiResult<Vec<User>> {
    actor(&state, &user).await?.require_super_admin()?;
    Ok(ApiResponse::success(
        roles::users_by_role(&state.pool, &role).await?,
    ))
}

/// GET /api/v1/admin/roles/user/{id}
pub async fn get_user_role(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> ApiResult<UserRoleResponse> {
    actor(&state, &user).await?.require_super_admin()?;
    Ok(ApiResponse::success(
        roles::get_user_role(&state.pool, id).await?,
    ))
}

/// GET /api/v1/admin/roles/all-users
pub async fn users_with_roles(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> ApiResult<Vec<UserWithRole>> {
    actor(&state, &user).await?.require_super_admin()?;
    Ok(ApiResponse::success(
        roles::users_with_roles(&state.pool).await?,
    ))
}
