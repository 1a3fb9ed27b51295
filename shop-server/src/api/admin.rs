//! Staff endpoints: order fulfilment and catalog management

use axum::extract::{Path, Query, State};
use axum::{Extension, Json};
use shared::error::ApiResponse;
use shared::models::{
    Category, CategoryCreate, CategoryUpdate, Order, OrderListQuery, Product, ProductCreate, ProductUpdate,
};

use super::{ApiResult, actor};
use crate::auth::CurrentUser;
use crate::services::{catalog, orders};
use crate::state::AppState;

// ========== Orders ==========

/// GET /api/v1/admin/orders
pub async fn list_orders(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Query(query): Query<OrderListQuery>,
) -> ApiResult<Vec<Order>> {
    let actor = actor(&state, &user).await?;
    let orders =
        orders::get_all_orders(&state.pool, &actor, query.limit, query.offset, state.page).await?;
    Ok(ApiResponse::success(orders))
}

/// GET /api/v1/admin/orders/{id}
pub async fn get_order(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> ApiResult<Order> {
    let actor = actor(&state, &user).await?;
    Ok(ApiResponse::success(
        orders::get_order_for_admin(&state.pool, &actor, id).await?,
    ))
}

/// POST /api/v1/admin/orders/{id}/confirm
pub async fn confirm_order(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> ApiResult<Order> {
    let actor = actor(&state, &user).await?;
    Ok(ApiResponse::success(
        orders::confirm_order(&state.pool, &actor, id).await?,
    ))
}

/// POST /api/v1/admin/orders/{id}/ship
pub async fn ship_order(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> ApiResult<Order> {
    let actor = actor(&state, &user).await?;
    Ok(ApiResponse::success(
        orders::ship_order(&state.pool, &actor, id).await?,
    ))
}

/// POST /api/v1/admin/orders/{id}/deliver
pub async fn deliver_order(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> ApiResult<Order> {
    let actor = actor(&state, &user).await?;
    Ok(ApiResponse::success(
        orders::deliver_order(&state.pool, &actor, id).await?,
    ))
}

/// POST /api/v1/admin/orders/{id}/cancel
pub async fn cancel_order(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> ApiResult<Order> {
    let actor = actor(&state, &user).await?;
    Ok(ApiResponse::success(
        orders::admin_cancel_order(&state.pool, &actor, id).await?,
    ))
}

// ========== Catalog ==========

/// POST /api/v1/admin/products
pub async fn create_product(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(req): Json<ProductCreate>,
) -> ApiResult<Product> {
    let actor = actor(&state, &user).await?;
    let product = catalog::create_product(&state.pool, &actor, &req).await?;
    Ok(ApiResponse::success_with_message("Product created", product))
}

/// PUT /api/v1/admin/products/{id}
pub async fn update_product(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(req): Json<ProductUpdate>,
) -> ApiResult<Product> {
    let actor = actor(&state, &user).await?;
    Ok(ApiResponse::success(
        catalog::update_product(&state.pool, &actor, id, &req).await?,
    ))
}

/// DELETE /api/v1/admin/products/{id}
pub async fn delete_product(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> ApiResult<()> {
    let actor = actor(&state, &user).await?;
    catalog::delete_product(&state.pool, &actor, id).await?;
    Ok(ApiResponse::ok())
}

/// POST /api/v1/admin/categories
pub async fn create_category(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(req): Json<CategoryCreate>,
) -> ApiResult<Category> {
    let actor = actor(&state, &user).await?;
    let category = catalog::create_category(&state.pool, &actor, &req).await?;
    Ok(ApiResponse::success_with_message("Category created", category))
}

/// PUT /api/v1/admin/categories/{id}
pub async fn update_category(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(req): Json<CategoryUpdate>,
) -> ApiResult<Category> {
    let actor = actor(&state, &user).await?;
    Ok(ApiResponse::success(
        catalog::update_category(&state.pool, &actor, id, &req).await?,
    ))
}

/// DELETE /api/v1/admin/categories/{id}
pub async fn delete_category(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> ApiResult<()> {
    let actor = actor(&state, &user).await?;
    catalog::delete_category(&state.pool, &actor, id).await?;
    Ok(ApiResponse::ok())
}
