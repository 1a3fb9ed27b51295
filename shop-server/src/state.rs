//! Application state shared by all handlers

use sqlx::SqlitePool;

use crate::config::Config;
use crate::db::DbService;
use crate::services::PageLimits;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// SQLite connection pool
    pub pool: SqlitePool,
    /// HS256 secret for bearer tokens
    pub jwt_secret: String,
    /// Listing page sizes
    pub page: PageLimits,
}

impl AppState {
    pub fn new(db: &DbService, config: &Config) -> Self {
        Self {
            pool: db.pool.clone(),
            jwt_secret: config.jwt_secret.clone(),
            page: PageLimits {
                default_size: config.default_page_size,
                max_size: config.max_page_size,
            },
        }
    }
}
