//! Order endpoints for the signed-in user

use axum::extract::{Path, State};
use axum::{Extension, Json};
use shared::error::ApiResponse;
use shared::models::{CreateOrderRequest, Order, UpdateOrderStatusRequest};

use super::ApiResult;
use crate::auth::CurrentUser;
use crate::services::orders;
use crate::state::AppState;

/// POST /api/v1/orders
pub async fn create_order(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(req): Json<CreateOrderRequest>,
) -> ApiResult<Order> {
    let order = orders::create_order(&state.pool, user.user_id, &req.items).await?;
    Ok(ApiResponse::success_with_message("Order created", order))
}

/// GET /api/v1/orders
pub async fn list_orders(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> ApiResult<Vec<Order>> {
    Ok(ApiResponse::success(
        orders::get_user_orders(&state.pool, user.user_id).await?,
    ))
}

/// GET /api/v1/orders/{id}
pub async fn get_order(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> ApiResult<Order> {
    Ok(ApiResponse::success(
        orders::get_order(&state.pool, id, user.user_id).await?,
    ))
}

/// PUT /api/v1/orders/{id}
pub async fn update_order_status(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateOrderStatusRequest>,
) -> ApiResult<Order> {
    let order = orders::update_order_status(&state.pool, user.user_id, id, &req.status).await?;
    Ok(ApiResponse::success(order))
}

/// POST /api/v1/orders/{id}/pay
pub async fn pay_order(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> ApiResult<Order> {
    Ok(ApiResponse::success(
        orders::pay_order(&state.pool, user.user_id, id).await?,
    ))
}

/// POST /api/v1/orders/{id}/cancel
pub async fn cancel_order(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> ApiResult<Order> {
    Ok(ApiResponse::success(
        orders::cancel_order(&state.pool, user.user_id, id).await?,
    ))
}
