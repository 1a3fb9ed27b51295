//! Product Repository
//!
//! Besides catalog CRUD this module owns the inventory ledger columns
//! (`stock`, `order_count`). Ledger updates are conditional so stock can
//! never go below zero, and they run on the caller's transaction.

use shared::models::{Product, ProductCreate, ProductSortBy, ProductUpdate};
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqliteExecutor, SqlitePool};

const PRODUCT_COLUMNS: &str = "id, category_id, title, description, images, price, model, extra_info, stock, order_count, created_at, updated_at";

/// Pricing and stock snapshot read inside an order transaction
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct StockSnapshot {
    pub id: i64,
    pub title: String,
    pub price: f64,
    pub stock: i64,
}

/// Search filters after boundary validation
#[derive(Debug, Clone, Default)]
pub struct SearchFilter {
    pub title: Option<String>,
    pub category_id: Option<i64>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub sort_by: Option<ProductSortBy>,
}

pub async fn find_by_id<'e, E>(executor: E, id: i64) -> Result<Option<Product>, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?");
    sqlx::query_as::<_, Product>(&sql)
        .bind(id)
        .fetch_optional(executor)
        .await
}

pub async fn find_all(
    pool: &SqlitePool,
    category_id: Option<i64>,
    limit: i64,
    offset: i64,
) -> Result<Vec<Product>, sqlx::Error> {
    let sql = format!(
        "SELECT {PRODUCT_COLUMNS} FROM products WHERE (?1 IS NULL OR category_id = ?1) ORDER BY id LIMIT ?2 OFFSET ?3"
    );
    sqlx::query_as::<_, Product>(&sql)
        .bind(category_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await
}

fn escape_like(input: &str) -> String {
    let mut out = String::with_capacity(input.len() + 2);
    out.push('%');
    for c in input.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('%');
    out
}

fn push_filters<'a>(qb: &mut QueryBuilder<'a, Sqlite>, filter: &'a SearchFilter) {
    qb.push(" WHERE 1 = 1");
    if let Some(title) = filter.title.as_deref() {
        // LIKE is case-insensitive for ASCII in SQLite
        qb.push(" AND title LIKE ")
            .push_bind(escape_like(title))
            .push(" ESCAPE '\\'");
    }
    if let Some(category_id) = filter.category_id {
        qb.push(" AND category_id = ").push_bind(category_id);
    }
    if let Some(min_price) = filter.min_price {
        qb.push(" AND price >= ").push_bind(min_price);
    }
    if let Some(max_price) = filter.max_price {
        qb.push(" AND price <= ").push_bind(max_price);
    }
}

/// One page of matching products plus the total match count
pub async fn search(
    pool: &SqlitePool,
    filter: &SearchFilter,
    limit: i64,
    offset: i64,
) -> Result<(Vec<Product>, i64), sqlx::Error> {
    let mut count_qb = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM products");
    push_filters(&mut count_qb, filter);
    let total: i64 = count_qb.build_query_scalar().fetch_one(pool).await?;

    let order = match filter.sort_by {
        Some(sort) => sort.order_clause(),
        None if filter.title.is_some() => "order_count DESC, title ASC",
        None => "order_count DESC, created_at DESC",
    };

    let mut qb = QueryBuilder::<Sqlite>::new(format!("SELECT {PRODUCT_COLUMNS} FROM products"));
    push_filters(&mut qb, filter);
    qb.push(format!(" ORDER BY {order}, id ASC LIMIT "))
        .push_bind(limit)
        .push(" OFFSET ")
        .push_bind(offset);
    let products = qb.build_query_as::<Product>().fetch_all(pool).await?;

    Ok((products, total))
}

pub async fn create(pool: &SqlitePool, data: &ProductCreate) -> Result<Product, sqlx::Error> {
    let now = shared::util::now_millis();
    let images = serde_json::to_string(&data.images).unwrap_or_else(|_| "[]".to_string());
    let extra_info = data
        .extra_info
        .as_ref()
        .map(|v| v.to_string())
        .unwrap_or_else(|| "{}".to_string());

    let id: i64 = sqlx::query_scalar(
        "INSERT INTO products (category_id, title, description, images, price, model, extra_info, stock, order_count, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, 0, ?9, ?9) RETURNING id",
    )
    .bind(data.category_id)
    .bind(&data.title)
    .bind(&data.description)
    .bind(images)
    .bind(data.price)
    .bind(&data.model)
    .bind(extra_info)
    .bind(data.stock)
    .bind(now)
    .fetch_one(pool)
    .await?;

    find_by_id(pool, id).await?.ok_or(sqlx::Error::RowNotFound)
}

/// Partial update, returns false when the product does not exist
pub async fn update(pool: &SqlitePool, id: i64, data: &ProductUpdate) -> Result<bool, sqlx::Error> {
    let now = shared::util::now_millis();
    let images = data
        .images
        .as_ref()
        .map(|i| serde_json::to_string(i).unwrap_or_else(|_| "[]".to_string()));
    let extra_info = data.extra_info.as_ref().map(|v| v.to_string());

    let rows = sqlx::query(
        "UPDATE products SET category_id = COALESCE(?1, category_id), title = COALESCE(?2, title), description = COALESCE(?3, description), images = COALESCE(?4, images), price = COALESCE(?5, price), model = COALESCE(?6, model), extra_info = COALESCE(?7, extra_info), stock = COALESCE(?8, stock), updated_at = ?9 WHERE id = ?10",
    )
    .bind(data.category_id)
    .bind(data.title.as_deref())
    .bind(data.description.as_deref())
    .bind(images)
    .bind(data.price)
    .bind(data.model.as_deref())
    .bind(extra_info)
    .bind(data.stock)
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;
    Ok(rows.rows_affected() > 0)
}

pub async fn delete(pool: &SqlitePool, id: i64) -> Result<bool, sqlx::Error> {
    let rows = sqlx::query("DELETE FROM products WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(rows.rows_affected() > 0)
}

pub async fn has_order_items(pool: &SqlitePool, id: i64) -> Result<bool, sqlx::Error> {
    let found: i64 =
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM order_items WHERE product_id = ?)")
            .bind(id)
            .fetch_one(pool)
            .await?;
    Ok(found != 0)
}

// ========== Inventory ledger ==========

pub async fn find_stock_snapshot(
    conn: &mut SqliteConnection,
    id: i64,
) -> Result<Option<StockSnapshot>, sqlx::Error> {
    sqlx::query_as::<_, StockSnapshot>("SELECT id, title, price, stock FROM products WHERE id = ?")
        .bind(id)
        .fetch_optional(conn)
        .await
}

/// Decrement stock by `quantity` and bump the popularity counter by one.
///
/// Returns false (and changes nothing) when stock is below `quantity`.
pub async fn take_stock(
    conn: &mut SqliteConnection,
    id: i64,
    quantity: i64,
    now: i64,
) -> Result<bool, sqlx::Error> {
    let rows = sqlx::query(
        "UPDATE products SET stock = stock - ?1, order_count = order_count + 1, updated_at = ?2 WHERE id = ?3 AND stock >= ?1",
    )
    .bind(quantity)
    .bind(now)
    .bind(id)
    .execute(conn)
    .await?;
    Ok(rows.rows_affected() == 1)
}

/// Return `quantity` units to stock. `order_count` is left untouched.
pub async fn restock(
    conn: &mut SqliteConnection,
    id: i64,
    quantity: i64,
    now: i64,
) -> Result<bool, sqlx::Error> {
    let rows =
        sqlx::query("UPDATE products SET stock = stock + ?1, updated_at = ?2 WHERE id = ?3")
            .bind(quantity)
            .bind(now)
            .bind(id)
            .execute(conn)
            .await?;
    Ok(rows.rows_affected() == 1)
}
