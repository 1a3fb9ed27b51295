//! Search Log Repository

use shared::models::SearchLog;
use sqlx::SqlitePool;

pub async fn insert(
    pool: &SqlitePool,
    user_id: Option<i64>,
    query: &str,
    filters: &serde_json::Value,
    results: i64,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar(
        "INSERT INTO search_logs (user_id, query, filters, results, created_at) VALUES (?, ?, ?, ?, ?) RETURNING id",
    )
    .bind(user_id)
    .bind(query)
    .bind(filters.to_string())
    .bind(results)
    .bind(shared::util::now_millis())
    .fetch_one(pool)
    .await
}

/// Most recent entries first
pub async fn find_recent(pool: &SqlitePool, limit: i64) -> Result<Vec<SearchLog>, sqlx::Error> {
    sqlx::query_as::<_, SearchLog>(
        "SELECT id, user_id, query, filters, results, created_at FROM search_logs ORDER BY id DESC LIMIT ?",
    )
    .bind(limit)
    .fetch_all(pool)
    .await
}
