//! Catalog endpoints (public)

use axum::Extension;
use axum::extract::{Path, Query, State};
use shared::error::ApiResponse;
use shared::models::{
    Category, Product, ProductListQuery, ProductSearchQuery, ProductSearchResult,
};

use super::ApiResult;
use crate::auth::MaybeUser;
use crate::services::catalog;
use crate::state::AppState;

/// GET /api/v1/categories
pub async fn list_categories(State(state): State<AppState>) -> ApiResult<Vec<Category>> {
    Ok(ApiResponse::success(
        catalog::list_categories(&state.pool).await?,
    ))
}

/// GET /api/v1/products
pub async fn list_products(
    State(state): State<AppState>,
    Query(query): Query<ProductListQuery>,
) -> ApiResult<Vec<Product>> {
    let products = catalog::list_products(&state.pool, &query, state.page).await?;
    Ok(ApiResponse::success(products))
}

/// GET /api/v1/products/{id}
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Product> {
    Ok(ApiResponse::success(catalog::get_product(&state.pool, id).await?))
}

/// GET /api/v1/products/search
pub async fn search_products(
    State(state): State<AppState>,
    Extension(MaybeUser(user)): Extension<MaybeUser>,
    Query(query): Query<ProductSearchQuery>,
) -> ApiResult<ProductSearchResult> {
    let user_id = user.map(|u| u.user_id);
    let result = catalog::search_products(&state.pool, user_id, &query).await?;
    Ok(ApiResponse::success(result))
}
