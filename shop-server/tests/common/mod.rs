//! Shared fixtures: a migrated SQLite file in a temp dir plus seed helpers
#![allow(dead_code)]

use shared::error::ErrorCode;
use shared::models::{CategoryCreate, ProductCreate, Role};
use shop_server::DbService;
use shop_server::db;
use shop_server::error::ServiceResult;
use shop_server::services::roles::Actor;
use sqlx::SqlitePool;
use tempfile::TempDir;

pub struct TestDb {
    pub pool: SqlitePool,
    _dir: TempDir,
}

pub async fn setup() -> TestDb {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("shop.db");
    let db = DbService::new(path.to_str().unwrap()).await.unwrap();
    TestDb {
        pool: db.pool,
        _dir: dir,
    }
}

pub async fn user(pool: &SqlitePool, email: &str) -> i64 {
    db::users::create(pool, email, email).await.unwrap().id
}

/// Bootstrap a role row directly, bypassing the gate
pub async fn grant(pool: &SqlitePool, user_id: i64, role: Role) {
    sqlx::query(
        "INSERT INTO user_roles (user_id, role_id, created_at, updated_at)
         SELECT ?, id, 0, 0 FROM roles WHERE name = ?",
    )
    .bind(user_id)
    .bind(role.as_str())
    .execute(pool)
    .await
    .unwrap();
}

pub async fn actor(pool: &SqlitePool, user_id: i64) -> Actor {
    Actor::resolve(pool, user_id, "actor@example.com")
        .await
        .unwrap()
}

/// A fresh user holding `role`, resolved as an actor
pub async fn staff(pool: &SqlitePool, email: &str, role: Role) -> Actor {
    let id = user(pool, email).await;
    grant(pool, id, role).await;
    actor(pool, id).await
}

pub async fn category(pool: &SqlitePool, name: &str) -> i64 {
    db::categories::create(
        pool,
        &CategoryCreate {
            name: name.to_string(),
            description: String::new(),
        },
    )
    .await
    .unwrap()
    .id
}

pub async fn product(pool: &SqlitePool, category_id: i64, title: &str, price: f64, stock: i64) -> i64 {
    db::products::create(
        pool,
        &ProductCreate {
            category_id,
            title: title.to_string(),
            description: String::new(),
            images: vec![],
            price,
            model: String::new(),
            extra_info: None,
            stock,
        },
    )
    .await
    .unwrap()
    .id
}

/// (stock, order_count)
pub async fn ledger(pool: &SqlitePool, product_id: i64) -> (i64, i64) {
    sqlx::query_as("SELECT stock, order_count FROM products WHERE id = ?")
        .bind(product_id)
        .fetch_one(pool)
        .await
        .unwrap()
}

pub async fn count(pool: &SqlitePool, table: &str) -> i64 {
    sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
        .fetch_one(pool)
        .await
        .unwrap()
}

pub async fn order_status(pool: &SqlitePool, order_id: i64) -> String {
    sqlx::query_scalar("SELECT status FROM orders WHERE id = ?")
        .bind(order_id)
        .fetch_one(pool)
        .await
        .unwrap()
}

/// Business error code of a failed service call
pub fn code<T: std::fmt::Debug>(result: ServiceResult<T>) -> ErrorCode {
    result
        .unwrap_err()
        .code()
        .expect("expected a business error, got a database error")
}
