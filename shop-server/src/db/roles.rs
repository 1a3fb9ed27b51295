//! Role Repository
//!
//! `user_roles.user_id` is UNIQUE, so a user has at most one row here.
//! Users without a row resolve to the `user` role.

use shared::models::{RoleInfo, User};
use sqlx::{SqliteConnection, SqliteExecutor, SqlitePool};

#[derive(sqlx::FromRow)]
pub struct UserRoleRow {
    pub id: i64,
    pub email: String,
    pub name: String,
    /// Role name, `user` when unassigned
    pub role: String,
}

pub async fn find_all(pool: &SqlitePool) -> Result<Vec<RoleInfo>, sqlx::Error> {
    sqlx::query_as::<_, RoleInfo>("SELECT id, name, description FROM roles ORDER BY id")
        .fetch_all(pool)
        .await
}

pub async fn find_id_by_name<'e, E>(executor: E, name: &str) -> Result<Option<i64>, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_scalar("SELECT id FROM roles WHERE name = ?")
        .bind(name)
        .fetch_optional(executor)
        .await
}

/// Explicitly assigned role name, `None` when the user has no row
pub async fn find_user_role<'e, E>(executor: E, user_id: i64) -> Result<Option<String>, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_scalar(
        "SELECT r.name FROM user_roles ur JOIN roles r ON r.id = ur.role_id WHERE ur.user_id = ?",
    )
    .bind(user_id)
    .fetch_optional(executor)
    .await
}

/// Insert or replace the single role row of a user
pub async fn upsert(
    conn: &mut SqliteConnection,
    user_id: i64,
    role_id: i64,
    now: i64,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO user_roles (user_id, role_id, created_at, updated_at) VALUES (?1, ?2, ?3, ?3)
         ON CONFLICT(user_id) DO UPDATE SET role_id = excluded.role_id, updated_at = excluded.updated_at",
    )
    .bind(user_id)
    .bind(role_id)
    .bind(now)
    .execute(conn)
    .await?;
    Ok(())
}

/// Returns the number of removed rows (0 or 1)
pub async fn delete(conn: &mut SqliteConnection, user_id: i64) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM user_roles WHERE user_id = ?")
        .bind(user_id)
        .execute(conn)
        .await?;
    Ok(result.rows_affected())
}

/// Users resolving to `role` (for `user` this includes unassigned users)
pub async fn find_users_by_role(pool: &SqlitePool, role: &str) -> Result<Vec<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(
        "SELECT u.id, u.email, u.name, u.created_at FROM users u
         LEFT JOIN user_roles ur ON ur.user_id = u.id
         LEFT JOIN roles r ON r.id = ur.role_id
         WHERE COALESCE(r.name, 'user') = ?
         ORDER BY u.id",
    )
    .bind(role)
    .fetch_all(pool)
    .await
}

pub async fn find_users_with_roles(pool: &SqlitePool) -> Result<Vec<UserRoleRow>, sqlx::Error> {
    sqlx::query_as::<_, UserRoleRow>(
        "SELECT u.id, u.email, u.name, COALESCE(r.name, 'user') AS role FROM users u
         LEFT JOIN user_roles ur ON ur.user_id = u.id
         LEFT JOIN roles r ON r.id = ur.role_id
         ORDER BY u.id",
    )
    .fetch_all(pool)
    .await
}
