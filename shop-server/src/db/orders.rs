//! Order Repository

use std::collections::HashMap;

use shared::models::{Order, OrderItem, OrderStatus};
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqliteExecutor, SqlitePool};

const ORDER_COLUMNS: &str =
    "id, user_id, order_number, status, total_amount, created_at, updated_at";

/// Raw order row, status still in its TEXT form
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct OrderRow {
    pub id: i64,
    pub user_id: i64,
    pub order_number: String,
    pub status: String,
    pub total_amount: f64,
    pub created_at: i64,
    pub updated_at: i64,
}

impl OrderRow {
    pub fn status(&self) -> Result<OrderStatus, sqlx::Error> {
        self.status
            .parse()
            .map_err(|e: shared::error::AppError| sqlx::Error::Decode(e.message.into()))
    }

    pub fn into_order(self, items: Vec<OrderItem>) -> Result<Order, sqlx::Error> {
        Ok(Order {
            status: self.status()?,
            id: self.id,
            user_id: self.user_id,
            order_number: self.order_number,
            total_amount: self.total_amount,
            created_at: self.created_at,
            updated_at: self.updated_at,
            items,
        })
    }
}

pub async fn insert(
    conn: &mut SqliteConnection,
    user_id: i64,
    order_number: &str,
    total_amount: f64,
    now: i64,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar(
        "INSERT INTO orders (user_id, order_number, status, total_amount, created_at, updated_at)
         VALUES (?1, ?2, 'pending', ?3, ?4, ?4) RETURNING id",
    )
    .bind(user_id)
    .bind(order_number)
    .bind(total_amount)
    .bind(now)
    .fetch_one(conn)
    .await
}

pub async fn insert_item(
    conn: &mut SqliteConnection,
    order_id: i64,
    product_id: i64,
    quantity: i64,
    price_at_moment: f64,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar(
        "INSERT INTO order_items (order_id, product_id, quantity, price_at_moment) VALUES (?, ?, ?, ?) RETURNING id",
    )
    .bind(order_id)
    .bind(product_id)
    .bind(quantity)
    .bind(price_at_moment)
    .fetch_one(conn)
    .await
}

pub async fn find_by_id<'e, E>(executor: E, id: i64) -> Result<Option<OrderRow>, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    let sql = format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = ? AND deleted_at IS NULL");
    sqlx::query_as::<_, OrderRow>(&sql)
        .bind(id)
        .fetch_optional(executor)
        .await
}

/// Owner-scoped lookup; another user's order is reported as absent
pub async fn find_by_id_for_user<'e, E>(
    executor: E,
    id: i64,
    user_id: i64,
) -> Result<Option<OrderRow>, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    let sql = format!(
        "SELECT {ORDER_COLUMNS} FROM orders WHERE id = ? AND user_id = ? AND deleted_at IS NULL"
    );
    sqlx::query_as::<_, OrderRow>(&sql)
        .bind(id)
        .bind(user_id)
        .fetch_optional(executor)
        .await
}

pub async fn find_by_user(pool: &SqlitePool, user_id: i64) -> Result<Vec<OrderRow>, sqlx::Error> {
    let sql = format!(
        "SELECT {ORDER_COLUMNS} FROM orders WHERE user_id = ? AND deleted_at IS NULL ORDER BY created_at DESC, id DESC"
    );
    sqlx::query_as::<_, OrderRow>(&sql)
        .bind(user_id)
        .fetch_all(pool)
        .await
}

pub async fn find_page(
    pool: &SqlitePool,
    limit: i64,
    offset: i64,
) -> Result<Vec<OrderRow>, sqlx::Error> {
    let sql = format!(
        "SELECT {ORDER_COLUMNS} FROM orders WHERE deleted_at IS NULL ORDER BY created_at DESC, id DESC LIMIT ? OFFSET ?"
    );
    sqlx::query_as::<_, OrderRow>(&sql)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await
}

pub async fn find_items<'e, E>(executor: E, order_id: i64) -> Result<Vec<OrderItem>, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_as::<_, OrderItem>(
        "SELECT id, order_id, product_id, quantity, price_at_moment FROM order_items WHERE order_id = ? ORDER BY id",
    )
    .bind(order_id)
    .fetch_all(executor)
    .await
}

/// Items of several orders, grouped by order id
pub async fn find_items_for_orders(
    pool: &SqlitePool,
    order_ids: &[i64],
) -> Result<HashMap<i64, Vec<OrderItem>>, sqlx::Error> {
    let mut grouped: HashMap<i64, Vec<OrderItem>> = HashMap::new();
    if order_ids.is_empty() {
        return Ok(grouped);
    }

    let mut qb = QueryBuilder::<Sqlite>::new(
        "SELECT id, order_id, product_id, quantity, price_at_moment FROM order_items WHERE order_id IN (",
    );
    let mut ids = qb.separated(", ");
    for id in order_ids {
        ids.push_bind(*id);
    }
    ids.push_unseparated(") ORDER BY id");

    for item in qb.build_query_as::<OrderItem>().fetch_all(pool).await? {
        grouped.entry(item.order_id).or_default().push(item);
    }
    Ok(grouped)
}

/// Compare-and-set status change; false when the order is no longer in `from`
pub async fn update_status(
    conn: &mut SqliteConnection,
    id: i64,
    from: OrderStatus,
    to: OrderStatus,
    now: i64,
) -> Result<bool, sqlx::Error> {
    let rows = sqlx::query(
        "UPDATE orders SET status = ?1, updated_at = ?2 WHERE id = ?3 AND status = ?4 AND deleted_at IS NULL",
    )
    .bind(to.as_str())
    .bind(now)
    .bind(id)
    .bind(from.as_str())
    .execute(conn)
    .await?;
    Ok(rows.rows_affected() == 1)
}
