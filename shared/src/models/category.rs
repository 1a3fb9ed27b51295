//! Category Model

use serde::{Deserialize, Serialize};

/// Category entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create category payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryCreate {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// Update category payload; absent fields keep their value
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CategoryUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
}
