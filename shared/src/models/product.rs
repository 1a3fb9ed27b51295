//! Product Model

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::Category;
use crate::error::AppError;

/// Product entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Product {
    pub id: i64,
    pub category_id: Option<i64>,
    pub title: String,
    pub description: String,
    /// JSON array of image URLs
    #[cfg_attr(feature = "db", sqlx(json))]
    pub images: Vec<String>,
    pub price: f64,
    pub model: String,
    /// Free-form JSON object
    #[cfg_attr(feature = "db", sqlx(json))]
    pub extra_info: serde_json::Value,
    /// Available stock, never negative
    pub stock: i64,
    /// Confirmed order lines referencing this product
    pub order_count: i64,
    pub created_at: i64,
    pub updated_at: i64,

    // -- Relations (populated by application code, skipped by FromRow) --
    #[cfg_attr(feature = "db", sqlx(skip))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
}

/// Create product payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductCreate {
    pub category_id: i64,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub images: Vec<String>,
    pub price: f64,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub extra_info: Option<serde_json::Value>,
    #[serde(default)]
    pub stock: i64,
}

/// Update product payload (absent fields are left untouched)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductUpdate {
    pub category_id: Option<i64>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub images: Option<Vec<String>>,
    pub price: Option<f64>,
    pub model: Option<String>,
    pub extra_info: Option<serde_json::Value>,
    pub stock: Option<i64>,
}

/// Product listing query
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductListQuery {
    pub category_id: Option<i64>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Product search query
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductSearchQuery {
    pub title: Option<String>,
    pub category_id: Option<i64>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    /// One of [`ProductSortBy`] wire names
    pub sort_by: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Product search result page
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductSearchResult {
    pub products: Vec<Product>,
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
    pub has_more: bool,
}

/// Search ordering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductSortBy {
    PriceAsc,
    PriceDesc,
    PopularityAsc,
    PopularityDesc,
    CreatedAtAsc,
    CreatedAtDesc,
}

impl ProductSortBy {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::PriceAsc => "price_asc",
            Self::PriceDesc => "price_desc",
            Self::PopularityAsc => "popularity_asc",
            Self::PopularityDesc => "popularity_desc",
            Self::CreatedAtAsc => "created_at_asc",
            Self::CreatedAtDesc => "created_at_desc",
        }
    }

    /// SQL `ORDER BY` clause (trusted, never built from user text)
    pub const fn order_clause(&self) -> &'static str {
        match self {
            Self::PriceAsc => "price ASC",
            Self::PriceDesc => "price DESC",
            Self::PopularityAsc => "order_count ASC",
            Self::PopularityDesc => "order_count DESC",
            Self::CreatedAtAsc => "created_at ASC",
            Self::CreatedAtDesc => "created_at DESC",
        }
    }
}

impl FromStr for ProductSortBy {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "price_asc" => Ok(Self::PriceAsc),
            "price_desc" => Ok(Self::PriceDesc),
            "popularity_asc" => Ok(Self::PopularityAsc),
            "popularity_desc" => Ok(Self::PopularityDesc),
            "created_at_asc" => Ok(Self::CreatedAtAsc),
            "created_at_desc" => Ok(Self::CreatedAtDesc),
            other => Err(AppError::invalid_request(format!("unknown sort_by: {other}"))
                .with_detail("sort_by", other)),
        }
    }
}
