//! Role Directory and authorization gate
//!
//! A user resolves to exactly one [`Role`]: the explicitly assigned one, or
//! [`Role::User`] when no assignment exists. Privileged operations ask the
//! [`Actor`] for the role they need before touching any row.

use shared::error::{AppError, ErrorCode};
use shared::models::{Role, RoleInfo, User, UserRoleResponse, UserWithRole};
use sqlx::SqlitePool;

use crate::db;
use crate::error::ServiceResult;
use crate::{audit_log, security_log};

/// Authenticated user together with their resolved role
#[derive(Debug, Clone)]
pub struct Actor {
    pub user_id: i64,
    pub email: String,
    pub role: Role,
}

impl Actor {
    pub async fn resolve(pool: &SqlitePool, user_id: i64, email: &str) -> ServiceResult<Self> {
        let role = get_role(pool, user_id).await?;
        Ok(Self {
            user_id,
            email: email.to_string(),
            role,
        })
    }

    pub fn require_super_admin(&self) -> Result<(), AppError> {
        if self.role.is_super_admin() {
            return Ok(());
        }
        security_log!(
            WARN,
            "permission_denied",
            user_id = self.user_id,
            role = self.role.as_str(),
            required = "super_admin"
        );
        Err(AppError::new(ErrorCode::SuperAdminRequired))
    }

    /// Seller or super admin
    pub fn require_staff(&self) -> Result<(), AppError> {
        if self.role.is_staff() {
            return Ok(());
        }
        security_log!(
            WARN,
            "permission_denied",
            user_id = self.user_id,
            role = self.role.as_str(),
            required = "seller"
        );
        Err(AppError::new(ErrorCode::SellerRequired))
    }
}

/// Resolved role of a user, never fails for a missing assignment
pub async fn get_role(pool: &SqlitePool, user_id: i64) -> ServiceResult<Role> {
    match db::roles::find_user_role(pool, user_id).await? {
        Some(name) => Ok(name.parse::<Role>()?),
        None => Ok(Role::default()),
    }
}

pub async fn assign_role(
    pool: &SqlitePool,
    actor: &Actor,
    target_user_id: i64,
    role_name: &str,
) -> ServiceResult<UserRoleResponse> {
    let resource = format!("user:{target_user_id}");
    let result = try_assign_role(pool, actor, target_user_id, role_name).await;
    match &result {
        Ok(_) => {
            audit_log!(actor.user_id, "role.assign", resource.as_str(), role_name);
        }
        Err(e) => {
            let outcome = format!("{role_name} failed: {e}");
            audit_log!(actor.user_id, "role.assign", resource.as_str(), outcome.as_str());
        }
    }
    result
}

async fn try_assign_role(
    pool: &SqlitePool,
    actor: &Actor,
    target_user_id: i64,
    role_name: &str,
) -> ServiceResult<UserRoleResponse> {
    let role: Role = role_name.parse()?;
    actor.require_super_admin()?;

    let mut tx = db::begin_write(pool).await?;

    if db::users::find_by_id(&mut *tx, target_user_id).await?.is_none() {
        return Err(AppError::new(ErrorCode::UserNotFound)
            .with_detail("user_id", target_user_id)
            .into());
    }

    let role_id = db::roles::find_id_by_name(&mut *tx, role.as_str())
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::RoleNotFound).with_detail("role", role.as_str()))?;

    let current = db::roles::find_user_role(&mut *tx, target_user_id).await?;
    if current.as_deref() == Some(role.as_str()) {
        return Err(AppError::new(ErrorCode::RoleAlreadyAssigned)
            .with_detail("user_id", target_user_id)
            .with_detail("role", role.as_str())
            .into());
    }

    db::roles::upsert(&mut *tx, target_user_id, role_id, shared::util::now_millis()).await?;
    tx.commit().await?;

    tracing::info!(
        actor = actor.user_id,
        target = target_user_id,
        role = %role,
        "Role assigned"
    );

    Ok(UserRoleResponse {
        user_id: target_user_id,
        role,
        assigned: true,
    })
}

pub async fn remove_role(
    pool: &SqlitePool,
    actor: &Actor,
    target_user_id: i64,
) -> ServiceResult<UserRoleResponse> {
    let resource = format!("user:{target_user_id}");
    let result = try_remove_role(pool, actor, target_user_id).await;
    match &result {
        Ok(_) => {
            audit_log!(actor.user_id, "role.remove", resource.as_str(), "removed");
        }
        Err(e) => {
            let outcome = format!("failed: {e}");
            audit_log!(actor.user_id, "role.remove", resource.as_str(), outcome.as_str());
        }
    }
    result
}

async fn try_remove_role(
    pool: &SqlitePool,
    actor: &Actor,
    target_user_id: i64,
) -> ServiceResult<UserRoleResponse> {
    actor.require_super_admin()?;
    if target_user_id == actor.user_id {
        return Err(AppError::new(ErrorCode::CannotRemoveOwnRole).into());
    }

    let mut tx = db::begin_write(pool).await?;

    if db::users::find_by_id(&mut *tx, target_user_id).await?.is_none() {
        return Err(AppError::new(ErrorCode::UserNotFound)
            .with_detail("user_id", target_user_id)
            .into());
    }

    if db::roles::delete(&mut *tx, target_user_id).await? == 0 {
        return Err(AppError::new(ErrorCode::NoRoleToRemove)
            .with_detail("user_id", target_user_id)
            .into());
    }
    tx.commit().await?;

    tracing::info!(actor = actor.user_id, target = target_user_id, "Role removed");

    Ok(UserRoleResponse {
        user_id: target_user_id,
        role: Role::default(),
        assigned: false,
    })
}

pub async fn list_roles(pool: &SqlitePool) -> ServiceResult<Vec<RoleInfo>> {
    Ok(db::roles::find_all(pool).await?)
}

pub async fn users_by_role(pool: &SqlitePool, role_name: &str) -> ServiceResult<Vec<User>> {
    let role: Role = role_name.parse()?;
    Ok(db::roles::find_users_by_role(pool, role.as_str()).await?)
}

pub async fn users_with_roles(pool: &SqlitePool) -> ServiceResult<Vec<UserWithRole>> {
    let rows = db::roles::find_users_with_roles(pool).await?;
    rows.into_iter()
        .map(|row| -> ServiceResult<UserWithRole> {
            Ok(UserWithRole {
                id: row.id,
                email: row.email,
                name: row.name,
                role: row.role.parse()?,
            })
        })
        .collect()
}

/// Resolved role of a known user (404 for unknown ids)
pub async fn get_user_role(pool: &SqlitePool, user_id: i64) -> ServiceResult<UserRoleResponse> {
    if db::users::find_by_id(pool, user_id).await?.is_none() {
        return Err(AppError::new(ErrorCode::UserNotFound)
            .with_detail("user_id", user_id)
            .into());
    }
    let assigned = db::roles::find_user_role(pool, user_id).await?.is_some();
    let role = get_role(pool, user_id).await?;
    Ok(UserRoleResponse {
        user_id,
        role,
        assigned,
    })
}
