//! Search analytics model

use serde::{Deserialize, Serialize};

/// Recorded product search
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct SearchLog {
    pub id: i64,
    pub user_id: Option<i64>,
    pub query: String,
    #[cfg_attr(feature = "db", sqlx(json))]
    pub filters: serde_json::Value,
    pub results: i64,
    pub created_at: i64,
}
