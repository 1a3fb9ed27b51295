//! Order Lifecycle Engine
//!
//! ```text
//! pending --pay--> paid --confirm--> confirmed --ship--> shipped --deliver--> delivered
//!    \______________\___________________\___________________\--cancel--> cancelled
//! ```
//!
//! Every operation that writes runs in one SQLite transaction. Status changes
//! are compare-and-set on the status read at the start of the transaction, so
//! two racing transitions on one order cannot both succeed.
//!
//! Inventory side effects:
//! - create: stock is checked, not taken
//! - confirm: stock is re-checked and taken, `order_count` bumped once per line
//! - cancel from confirmed/shipped: stock is returned, `order_count` kept

use rust_decimal::Decimal;
use shared::error::{AppError, ErrorCode};
use shared::models::{Order, OrderItem, OrderItemRequest, OrderStatus};
use sqlx::{SqliteConnection, SqlitePool};

use super::PageLimits;
use super::roles::Actor;
use crate::audit_log;
use crate::db;
use crate::db::orders::OrderRow;
use crate::error::{ServiceError, ServiceResult};
use crate::money;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Transition {
    Pay,
    Confirm,
    Ship,
    Deliver,
    Cancel,
}

impl Transition {
    const fn target(self) -> OrderStatus {
        match self {
            Transition::Pay => OrderStatus::Paid,
            Transition::Confirm => OrderStatus::Confirmed,
            Transition::Ship => OrderStatus::Shipped,
            Transition::Deliver => OrderStatus::Delivered,
            Transition::Cancel => OrderStatus::Cancelled,
        }
    }

    const fn action(self) -> &'static str {
        match self {
            Transition::Pay => "order.pay",
            Transition::Confirm => "order.confirm",
            Transition::Ship => "order.ship",
            Transition::Deliver => "order.deliver",
            Transition::Cancel => "order.cancel",
        }
    }

    fn rejection(self, order_id: i64, from: OrderStatus) -> AppError {
        let to = self.target().as_str();
        let message = match self {
            Transition::Pay => "only pending orders can be paid",
            Transition::Confirm => "order must be paid before confirmation",
            Transition::Ship => "order must be confirmed before shipping",
            Transition::Deliver => "order must be shipped before delivery",
            Transition::Cancel => {
                return AppError::with_message(ErrorCode::OrderTerminal, "order cannot be cancelled")
                    .with_detail("order_id", order_id)
                    .with_detail("from", from.as_str())
                    .with_detail("to", to);
            }
        };
        AppError::invalid_transition(order_id, from.as_str(), to, message)
    }
}

fn order_not_found(order_id: i64) -> AppError {
    AppError::new(ErrorCode::OrderNotFound).with_detail("order_id", order_id)
}

fn assemble(
    rows: Vec<OrderRow>,
    mut items: std::collections::HashMap<i64, Vec<OrderItem>>,
) -> ServiceResult<Vec<Order>> {
    rows.into_iter()
        .map(|row| {
            let order_items = items.remove(&row.id).unwrap_or_default();
            row.into_order(order_items).map_err(ServiceError::from)
        })
        .collect()
}

// ========== Creation ==========

/// Validate stock and freeze prices for a new `pending` order.
///
/// Stock is not taken here; see [`confirm_order`].
pub async fn create_order(
    pool: &SqlitePool,
    user_id: i64,
    requests: &[OrderItemRequest],
) -> ServiceResult<Order> {
    if requests.is_empty() {
        return Err(AppError::new(ErrorCode::EmptyOrder).into());
    }
    for req in requests {
        money::validate_quantity(req.quantity)?;
    }

    let mut tx = db::begin_write(pool).await?;

    if db::users::find_by_id(&mut *tx, user_id).await?.is_none() {
        return Err(AppError::new(ErrorCode::UserNotFound)
            .with_detail("user_id", user_id)
            .into());
    }

    // (product_id, quantity, frozen price)
    let mut lines = Vec::with_capacity(requests.len());
    let mut total = Decimal::ZERO;
    for req in requests {
        let product = db::products::find_stock_snapshot(&mut *tx, req.product_id)
            .await?
            .ok_or_else(|| {
                AppError::new(ErrorCode::ProductNotFound).with_detail("product_id", req.product_id)
            })?;
        if product.stock < req.quantity {
            return Err(AppError::insufficient_stock(product.id, &product.title).into());
        }
        total += money::line_total(product.price, req.quantity);
        lines.push((product.id, req.quantity, product.price));
    }

    let now = shared::util::now_millis();
    let order_number = format!("ORD-{}-{}", shared::util::snowflake_id(), user_id);
    let total_amount = money::to_f64(total);

    let order_id =
        match db::orders::insert(&mut *tx, user_id, &order_number, total_amount, now).await {
            Ok(id) => id,
            Err(e) if db::is_unique_violation(&e) => {
                return Err(AppError::already_exists("order number")
                    .with_detail("order_number", order_number.as_str())
                    .into());
            }
            Err(e) => return Err(e.into()),
        };

    let mut items = Vec::with_capacity(lines.len());
    for (product_id, quantity, price_at_moment) in lines {
        let id =
            db::orders::insert_item(&mut *tx, order_id, product_id, quantity, price_at_moment)
                .await?;
        items.push(OrderItem {
            id,
            order_id,
            product_id,
            quantity,
            price_at_moment,
        });
    }

    tx.commit().await?;

    let resource = format!("order:{order_id}");
    audit_log!(user_id, "order.create", resource.as_str(), order_number.as_str());

    Ok(Order {
        id: order_id,
        user_id,
        order_number,
        status: OrderStatus::Pending,
        total_amount,
        created_at: now,
        updated_at: now,
        items,
    })
}

// ========== Reads ==========

/// All orders of a user, newest first
pub async fn get_user_orders(pool: &SqlitePool, user_id: i64) -> ServiceResult<Vec<Order>> {
    let rows = db::orders::find_by_user(pool, user_id).await?;
    let ids: Vec<i64> = rows.iter().map(|r| r.id).collect();
    let items = db::orders::find_items_for_orders(pool, &ids).await?;
    assemble(rows, items)
}

/// Owner-scoped; another user's order is reported as not found
pub async fn get_order(pool: &SqlitePool, order_id: i64, user_id: i64) -> ServiceResult<Order> {
    let row = db::orders::find_by_id_for_user(pool, order_id, user_id)
        .await?
        .ok_or_else(|| order_not_found(order_id))?;
    let items = db::orders::find_items(pool, order_id).await?;
    Ok(row.into_order(items)?)
}

pub async fn get_order_for_admin(
    pool: &SqlitePool,
    actor: &Actor,
    order_id: i64,
) -> ServiceResult<Order> {
    actor.require_staff()?;
    let row = db::orders::find_by_id(pool, order_id)
        .await?
        .ok_or_else(|| order_not_found(order_id))?;
    let items = db::orders::find_items(pool, order_id).await?;
    Ok(row.into_order(items)?)
}

/// One page of every user's orders, newest first
pub async fn get_all_orders(
    pool: &SqlitePool,
    actor: &Actor,
    limit: Option<i64>,
    offset: Option<i64>,
    page: PageLimits,
) -> ServiceResult<Vec<Order>> {
    actor.require_staff()?;
    let (limit, offset) = page.clamp(limit, offset);
    let rows = db::orders::find_page(pool, limit, offset).await?;
    let ids: Vec<i64> = rows.iter().map(|r| r.id).collect();
    let items = db::orders::find_items_for_orders(pool, &ids).await?;
    assemble(rows, items)
}

// ========== Transitions ==========

/// `pending -> paid`, owner only. Payment is asserted by the client.
pub async fn pay_order(pool: &SqlitePool, user_id: i64, order_id: i64) -> ServiceResult<Order> {
    run_transition(pool, user_id, order_id, Some(user_id), Transition::Pay).await
}

/// `paid -> confirmed`, super admin only.
///
/// Takes stock for every line and bumps each product's `order_count` once per
/// line. If any line no longer has enough stock the whole confirmation rolls
/// back and the order stays `paid`.
pub async fn confirm_order(pool: &SqlitePool, actor: &Actor, order_id: i64) -> ServiceResult<Order> {
    actor.require_super_admin()?;
    run_transition(pool, actor.user_id, order_id, None, Transition::Confirm).await
}

/// `confirmed -> shipped`, seller or super admin
pub async fn ship_order(pool: &SqlitePool, actor: &Actor, order_id: i64) -> ServiceResult<Order> {
    actor.require_staff()?;
    run_transition(pool, actor.user_id, order_id, None, Transition::Ship).await
}

/// `shipped -> delivered`, super admin only
pub async fn deliver_order(pool: &SqlitePool, actor: &Actor, order_id: i64) -> ServiceResult<Order> {
    actor.require_super_admin()?;
    run_transition(pool, actor.user_id, order_id, None, Transition::Deliver).await
}

/// Owner self-service cancel
pub async fn cancel_order(pool: &SqlitePool, user_id: i64, order_id: i64) -> ServiceResult<Order> {
    run_transition(pool, user_id, order_id, Some(user_id), Transition::Cancel).await
}

/// Super admin cancel of any user's order
pub async fn admin_cancel_order(
    pool: &SqlitePool,
    actor: &Actor,
    order_id: i64,
) -> ServiceResult<Order> {
    actor.require_super_admin()?;
    run_transition(pool, actor.user_id, order_id, None, Transition::Cancel).await
}

/// User-facing status update; only `cancelled` is accepted as a target
pub async fn update_order_status(
    pool: &SqlitePool,
    user_id: i64,
    order_id: i64,
    status: &str,
) -> ServiceResult<Order> {
    let target: OrderStatus = status.parse()?;
    if target != OrderStatus::Cancelled {
        return Err(AppError::new(ErrorCode::OnlyCancelAllowed)
            .with_detail("status", target.as_str())
            .into());
    }
    cancel_order(pool, user_id, order_id).await
}

async fn run_transition(
    pool: &SqlitePool,
    actor_id: i64,
    order_id: i64,
    owner: Option<i64>,
    transition: Transition,
) -> ServiceResult<Order> {
    let resource = format!("order:{order_id}");
    let result = apply_transition(pool, order_id, owner, transition).await;
    match &result {
        Ok(order) => {
            audit_log!(actor_id, transition.action(), resource.as_str(), order.status.as_str());
        }
        Err(e) => {
            let outcome = format!("failed: {e}");
            audit_log!(actor_id, transition.action(), resource.as_str(), outcome.as_str());
        }
    }
    result
}

async fn apply_transition(
    pool: &SqlitePool,
    order_id: i64,
    owner: Option<i64>,
    transition: Transition,
) -> ServiceResult<Order> {
    let mut tx = db::begin_write(pool).await?;

    let row = match owner {
        Some(user_id) => db::orders::find_by_id_for_user(&mut *tx, order_id, user_id).await?,
        None => db::orders::find_by_id(&mut *tx, order_id).await?,
    }
    .ok_or_else(|| order_not_found(order_id))?;

    let from = row.status()?;
    let to = transition.target();
    if !from.can_transition_to(to) {
        return Err(transition.rejection(order_id, from).into());
    }

    let items = db::orders::find_items(&mut *tx, order_id).await?;
    let now = shared::util::now_millis();

    match transition {
        Transition::Confirm => take_stock(&mut *tx, &items, now).await?,
        Transition::Cancel if from.restocks_on_cancel() => {
            restock(&mut *tx, &items, now).await?;
            tracing::info!(order_id, from = %from, lines = items.len(), "Stock restored on cancel");
        }
        _ => {}
    }

    if !db::orders::update_status(&mut *tx, order_id, from, to, now).await? {
        // Lost a race with another transition on the same order
        return Err(AppError::invalid_transition(
            order_id,
            from.as_str(),
            to.as_str(),
            "order status changed concurrently",
        )
        .into());
    }

    tx.commit().await?;

    tracing::info!(order_id, from = %from, to = %to, "Order status changed");

    let mut order = row.into_order(items)?;
    order.status = to;
    order.updated_at = now;
    Ok(order)
}

async fn take_stock(conn: &mut SqliteConnection, items: &[OrderItem], now: i64) -> ServiceResult<()> {
    for item in items {
        if db::products::take_stock(conn, item.product_id, item.quantity, now).await? {
            continue;
        }
        let title = db::products::find_stock_snapshot(conn, item.product_id)
            .await?
            .map(|p| p.title)
            .ok_or_else(|| {
                AppError::new(ErrorCode::ProductNotFound).with_detail("product_id", item.product_id)
            })?;
        return Err(AppError::insufficient_stock(item.product_id, &title).into());
    }
    Ok(())
}

async fn restock(conn: &mut SqliteConnection, items: &[OrderItem], now: i64) -> ServiceResult<()> {
    for item in items {
        if !db::products::restock(conn, item.product_id, item.quantity, now).await? {
            tracing::warn!(
                product_id = item.product_id,
                quantity = item.quantity,
                "Restock skipped, product no longer exists"
            );
        }
    }
    Ok(())
}
