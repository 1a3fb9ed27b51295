//! HTTP API
//!
//! Handlers are thin: extract, resolve the caller, call a service. Role checks
//! live in the services so every entry point enforces them.

pub mod admin;
pub mod health;
pub mod orders;
pub mod products;
pub mod roles;

use axum::routing::{delete, get, post, put};
use axum::{Router, middleware};
use shared::error::{ApiResponse, AppError};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::auth::{CurrentUser, auth_middleware, optional_auth_middleware};
use crate::services::roles::Actor;
use crate::state::AppState;

pub type ApiResult<T> = Result<ApiResponse<T>, AppError>;

/// Caller with their resolved role, for privileged routes
pub(crate) async fn actor(state: &AppState, user: &CurrentUser) -> Result<Actor, AppError> {
    Ok(Actor::resolve(&state.pool, user.user_id, &user.email).await?)
}

/// Create the combined router
pub fn create_router(state: AppState) -> Router {
    // Catalog reads (no auth)
    let public = Router::new()
        .route("/api/v1/categories", get(products::list_categories))
        .route("/api/v1/products", get(products::list_products))
        .route("/api/v1/products/{id}", get(products::get_product));

    // Search records the caller when a token is present
    let search = Router::new()
        .route("/api/v1/products/search", get(products::search_products))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            optional_auth_middleware,
        ));

    let user = Router::new()
        .route(
            "/api/v1/orders",
            get(orders::list_orders).post(orders::create_order),
        )
        .route(
            "/api/v1/orders/{id}",
            get(orders::get_order).put(orders::update_order_status),
        )
        .route("/api/v1/orders/{id}/pay", post(orders::pay_order))
        .route("/api/v1/orders/{id}/cancel", post(orders::cancel_order));

    let admin = Router::new()
        .route("/api/v1/admin/orders", get(admin::list_orders))
        .route("/api/v1/admin/orders/{id}", get(admin::get_order))
        .route("/api/v1/admin/orders/{id}/confirm", post(admin::confirm_order))
        .route("/api/v1/admin/orders/{id}/ship", post(admin::ship_order))
        .route("/api/v1/admin/orders/{id}/deliver", post(admin::deliver_order))
        .route("/api/v1/admin/orders/{id}/cancel", post(admin::cancel_order))
        .route("/api/v1/admin/products", post(admin::create_product))
        .route(
            "/api/v1/admin/products/{id}",
            put(admin::update_product).delete(admin::delete_product),
        )
        .route("/api/v1/admin/categories", post(admin::create_category))
        .route(
            "/api/v1/admin/categories/{id}",
            put(admin::update_category).delete(admin::delete_category),
        )
        .route("/api/v1/admin/roles", get(roles::list_roles))
        .route("/api/v1/admin/roles/assign", post(roles::assign_role))
        .route("/api/v1/admin/roles/remove", delete(roles::remove_role))
        .route("/api/v1/admin/roles/users/{role}", get(roles::users_by_role))
        .route("/api/v1/admin/roles/user/{id}", get(roles::get_user_role))
        .route("/api/v1/admin/roles/all-users", get(roles::users_with_roles));

    let authenticated = user
        .merge(admin)
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .route("/health", get(health::health_check))
        .merge(public)
        .merge(search)
        .merge(authenticated)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
