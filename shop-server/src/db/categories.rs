//! Category Repository

use shared::models::{Category, CategoryCreate, CategoryUpdate};
use sqlx::{SqliteExecutor, SqlitePool};

pub async fn find_all(pool: &SqlitePool) -> Result<Vec<Category>, sqlx::Error> {
    sqlx::query_as::<_, Category>(
        "SELECT id, name, description, created_at, updated_at FROM categories ORDER BY name",
    )
    .fetch_all(pool)
    .await
}

pub async fn find_by_id<'e, E>(executor: E, id: i64) -> Result<Option<Category>, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_as::<_, Category>(
        "SELECT id, name, description, created_at, updated_at FROM categories WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(executor)
    .await
}

pub async fn exists<'e, E>(executor: E, id: i64) -> Result<bool, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    let found: i64 = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM categories WHERE id = ?)")
        .bind(id)
        .fetch_one(executor)
        .await?;
    Ok(found != 0)
}

pub async fn create(pool: &SqlitePool, data: &CategoryCreate) -> Result<Category, sqlx::Error> {
    let now = shared::util::now_millis();
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO categories (name, description, created_at, updated_at) VALUES (?1, ?2, ?3, ?3) RETURNING id",
    )
    .bind(&data.name)
    .bind(&data.description)
    .bind(now)
    .fetch_one(pool)
    .await?;
    Ok(Category {
        id,
        name: data.name.clone(),
        description: data.description.clone(),
        created_at: now,
        updated_at: now,
    })
}

pub async fn update(pool: &SqlitePool, id: i64, data: &CategoryUpdate) -> Result<bool, sqlx::Error> {
    let rows = sqlx::query(
        "UPDATE categories SET name = COALESCE(?1, name), description = COALESCE(?2, description), updated_at = ?3 WHERE id = ?4",
    )
    .bind(data.name.as_deref())
    .bind(data.description.as_deref())
    .bind(shared::util::now_millis())
    .bind(id)
    .execute(pool)
    .await?;
    Ok(rows.rows_affected() > 0)
}

pub async fn delete(pool: &SqlitePool, id: i64) -> Result<bool, sqlx::Error> {
    let rows = sqlx::query("DELETE FROM categories WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(rows.rows_affected() > 0)
}

pub async fn has_products(pool: &SqlitePool, id: i64) -> Result<bool, sqlx::Error> {
    let found: i64 = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM products WHERE category_id = ?)")
        .bind(id)
        .fetch_one(pool)
        .await?;
    Ok(found != 0)
}
