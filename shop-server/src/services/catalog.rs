//! Catalog Store and search analytics

use shared::error::{AppError, ErrorCode};
use shared::models::{
    Category, CategoryCreate, CategoryUpdate, Product, ProductCreate, ProductListQuery, ProductSearchQuery,
    ProductSearchResult, ProductSortBy, ProductUpdate,
};
use sqlx::SqlitePool;

use super::PageLimits;
use super::roles::Actor;
use crate::audit_log;
use crate::db;
use crate::db::products::SearchFilter;
use crate::error::ServiceResult;
use crate::money;

fn product_not_found(id: i64) -> AppError {
    AppError::new(ErrorCode::ProductNotFound).with_detail("product_id", id)
}

fn category_not_found(id: i64) -> AppError {
    AppError::new(ErrorCode::CategoryNotFound).with_detail("category_id", id)
}

async fn ensure_category(pool: &SqlitePool, category_id: i64) -> ServiceResult<()> {
    if !db::categories::exists(pool, category_id).await? {
        return Err(category_not_found(category_id).into());
    }
    Ok(())
}

fn validate_stock(stock: i64) -> Result<(), AppError> {
    if stock < 0 {
        return Err(AppError::with_message(
            ErrorCode::ValueOutOfRange,
            "stock must not be negative",
        )
        .with_detail("stock", stock));
    }
    Ok(())
}

fn validate_title(title: &str) -> Result<(), AppError> {
    if title.trim().is_empty() {
        return Err(AppError::validation("title must not be empty"));
    }
    Ok(())
}

// ========== Reads ==========

/// Product with its category attached
pub async fn get_product(pool: &SqlitePool, id: i64) -> ServiceResult<Product> {
    let mut product = db::products::find_by_id(pool, id)
        .await?
        .ok_or_else(|| product_not_found(id))?;
    if let Some(category_id) = product.category_id {
        product.category = db::categories::find_by_id(pool, category_id).await?;
    }
    Ok(product)
}

pub async fn list_products(
    pool: &SqlitePool,
    query: &ProductListQuery,
    page: PageLimits,
) -> ServiceResult<Vec<Product>> {
    let (limit, offset) = page.clamp(query.limit, query.offset);
    Ok(db::products::find_all(pool, query.category_id, limit, offset).await?)
}

pub async fn list_categories(pool: &SqlitePool) -> ServiceResult<Vec<Category>> {
    Ok(db::categories::find_all(pool).await?)
}

// ========== Writes ==========

pub async fn create_category(
    pool: &SqlitePool,
    actor: &Actor,
    data: &CategoryCreate,
) -> ServiceResult<Category> {
    actor.require_super_admin()?;
    if data.name.trim().is_empty() {
        return Err(AppError::validation("category name must not be empty").into());
    }

    let category = match db::categories::create(pool, data).await {
        Ok(category) => category,
        Err(e) if db::is_unique_violation(&e) => {
            return Err(AppError::new(ErrorCode::CategoryNameExists)
                .with_detail("name", data.name.as_str())
                .into());
        }
        Err(e) => return Err(e.into()),
    };

    let resource = format!("category:{}", category.id);
    audit_log!(actor.user_id, "category.create", resource.as_str());
    Ok(category)
}

/// Partial update; a new name must stay unique
pub async fn update_category(
    pool: &SqlitePool,
    actor: &Actor,
    id: i64,
    data: &CategoryUpdate,
) -> ServiceResult<Category> {
    actor.require_super_admin()?;
    if data.name.as_deref().is_some_and(|name| name.trim().is_empty()) {
        return Err(AppError::validation("category name must not be empty").into());
    }

    match db::categories::update(pool, id, data).await {
        Ok(true) => {}
        Ok(false) => return Err(category_not_found(id).into()),
        Err(e) if db::is_unique_violation(&e) => {
            return Err(AppError::new(ErrorCode::CategoryNameExists)
                .with_detail("name", data.name.as_deref().unwrap_or_default())
                .into());
        }
        Err(e) => return Err(e.into()),
    }

    let resource = format!("category:{id}");
    audit_log!(actor.user_id, "category.update", resource.as_str());
    db::categories::find_by_id(pool, id)
        .await?
        .ok_or_else(|| category_not_found(id).into())
}

/// Categories that still hold products cannot be deleted
pub async fn delete_category(pool: &SqlitePool, actor: &Actor, id: i64) -> ServiceResult<()> {
    actor.require_super_admin()?;
    if db::categories::has_products(pool, id).await? {
        return Err(AppError::new(ErrorCode::CategoryHasProducts)
            .with_detail("category_id", id)
            .into());
    }
    if !db::categories::delete(pool, id).await? {
        return Err(category_not_found(id).into());
    }

    let resource = format!("category:{id}");
    audit_log!(actor.user_id, "category.delete", resource.as_str());
    Ok(())
}

pub async fn create_product(
    pool: &SqlitePool,
    actor: &Actor,
    data: &ProductCreate,
) -> ServiceResult<Product> {
    actor.require_staff()?;
    validate_title(&data.title)?;
    money::validate_price(data.price)?;
    validate_stock(data.stock)?;
    ensure_category(pool, data.category_id).await?;

    let product = db::products::create(pool, data).await?;

    let resource = format!("product:{}", product.id);
    audit_log!(actor.user_id, "product.create", resource.as_str());
    Ok(product)
}

/// Partial update; absent fields keep their value
pub async fn update_product(
    pool: &SqlitePool,
    actor: &Actor,
    id: i64,
    data: &ProductUpdate,
) -> ServiceResult<Product> {
    actor.require_staff()?;
    if let Some(title) = data.title.as_deref() {
        validate_title(title)?;
    }
    if let Some(price) = data.price {
        money::validate_price(price)?;
    }
    if let Some(stock) = data.stock {
        validate_stock(stock)?;
    }
    if let Some(category_id) = data.category_id {
        ensure_category(pool, category_id).await?;
    }

    if !db::products::update(pool, id, data).await? {
        return Err(product_not_found(id).into());
    }

    let resource = format!("product:{id}");
    audit_log!(actor.user_id, "product.update", resource.as_str());
    get_product(pool, id).await
}

/// Products referenced by any order line cannot be deleted
pub async fn delete_product(pool: &SqlitePool, actor: &Actor, id: i64) -> ServiceResult<()> {
    actor.require_super_admin()?;
    if db::products::has_order_items(pool, id).await? {
        return Err(AppError::new(ErrorCode::ProductHasOrders)
            .with_detail("product_id", id)
            .into());
    }
    if !db::products::delete(pool, id).await? {
        return Err(product_not_found(id).into());
    }

    let resource = format!("product:{id}");
    audit_log!(actor.user_id, "product.delete", resource.as_str());
    Ok(())
}

// ========== Search ==========

fn build_filter(query: &ProductSearchQuery) -> Result<SearchFilter, AppError> {
    let sort_by = query
        .sort_by
        .as_deref()
        .filter(|s| !s.is_empty())
        .map(str::parse::<ProductSortBy>)
        .transpose()?;

    for (field, value) in [("min_price", query.min_price), ("max_price", query.max_price)] {
        if value.is_some_and(|price| !price.is_finite() || price < 0.0) {
            return Err(AppError::with_message(
                ErrorCode::ValueOutOfRange,
                format!("{field} must be a non-negative number"),
            ));
        }
    }

    Ok(SearchFilter {
        title: query
            .title
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string),
        category_id: query.category_id,
        min_price: query.min_price,
        max_price: query.max_price,
        sort_by,
    })
}

/// Filtered, sorted page of products.
///
/// A search log entry is written in the background once the page is known;
/// logging failures never affect the response.
pub async fn search_products(
    pool: &SqlitePool,
    user_id: Option<i64>,
    query: &ProductSearchQuery,
) -> ServiceResult<ProductSearchResult> {
    let filter = build_filter(query)?;
    let (limit, offset) = PageLimits::SEARCH.clamp(query.limit, query.offset);

    let (products, total) = db::products::search(pool, &filter, limit, offset).await?;

    if user_id.is_some() || filter.title.is_some() {
        let filters = serde_json::json!({
            "category_id": filter.category_id,
            "min_price": filter.min_price,
            "max_price": filter.max_price,
            "sort_by": filter.sort_by.map(|s| s.as_str()),
        });
        spawn_search_log(
            pool.clone(),
            user_id,
            filter.title.clone().unwrap_or_default(),
            filters,
            products.len() as i64,
        );
    }

    let has_more = offset + (products.len() as i64) < total;
    Ok(ProductSearchResult {
        products,
        total,
        limit,
        offset,
        has_more,
    })
}

/// Fire-and-forget search analytics
pub fn spawn_search_log(
    pool: SqlitePool,
    user_id: Option<i64>,
    query: String,
    filters: serde_json::Value,
    results: i64,
) {
    tokio::spawn(async move {
        if let Err(e) = db::search_logs::insert(&pool, user_id, &query, &filters, results).await {
            tracing::warn!(error = %e, query = %query, "Failed to record search log");
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_filter_trims_title() {
        let query = ProductSearchQuery {
            title: Some("  lamp ".to_string()),
            ..Default::default()
        };
        let filter = build_filter(&query).unwrap();
        assert_eq!(filter.title.as_deref(), Some("lamp"));

        let blank = ProductSearchQuery {
            title: Some("   ".to_string()),
            ..Default::default()
        };
        assert!(build_filter(&blank).unwrap().title.is_none());
    }

    #[test]
    fn test_build_filter_rejects_unknown_sort() {
        let query = ProductSearchQuery {
            sort_by: Some("cheapest".to_string()),
            ..Default::default()
        };
        assert_eq!(
            build_filter(&query).unwrap_err().code,
            ErrorCode::InvalidRequest
        );
    }

    #[test]
    fn test_build_filter_rejects_negative_price() {
        let query = ProductSearchQuery {
            min_price: Some(-1.0),
            ..Default::default()
        };
        assert_eq!(
            build_filter(&query).unwrap_err().code,
            ErrorCode::ValueOutOfRange
        );
    }

    #[test]
    fn test_validate_stock() {
        assert!(validate_stock(0).is_ok());
        assert!(validate_stock(-1).is_err());
    }
}
