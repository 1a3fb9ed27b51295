//! User Repository

use shared::models::User;
use sqlx::{SqliteExecutor, SqlitePool};

const USER_SELECT: &str = "SELECT id, email, name, created_at FROM users";

pub async fn find_by_id<'e, E>(executor: E, id: i64) -> Result<Option<User>, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_as::<_, User>(&format!("{USER_SELECT} WHERE id = ?"))
        .bind(id)
        .fetch_optional(executor)
        .await
}

pub async fn find_all(pool: &SqlitePool) -> Result<Vec<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!("{USER_SELECT} ORDER BY id"))
        .fetch_all(pool)
        .await
}

/// Insert a user row (accounts are provisioned by the identity flow)
pub async fn create(pool: &SqlitePool, email: &str, name: &str) -> Result<User, sqlx::Error> {
    let now = shared::util::now_millis();
    let id: i64 =
        sqlx::query_scalar("INSERT INTO users (email, name, created_at) VALUES (?, ?, ?) RETURNING id")
            .bind(email)
            .bind(name)
            .bind(now)
            .fetch_one(pool)
            .await?;
    Ok(User {
        id,
        email: email.to_string(),
        name: name.to_string(),
        created_at: now,
    })
}
