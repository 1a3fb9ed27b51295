//! shop-server: e-commerce backend
//!
//! - **Order lifecycle** (`services::orders`): status machine with transactional
//!   stock and popularity bookkeeping
//! - **Role gate** (`services::roles`): one role per user, checked before
//!   privileged transitions
//! - **Catalog** (`services::catalog`): product reads, minimal writes, search
//!   with background analytics
//! - **HTTP API** (`api`): axum router, bearer JWT auth
//!
//! Persistence is SQLite through `sqlx`; the pool is passed explicitly to
//! every service.

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod logger;
pub mod money;
pub mod services;
pub mod state;

pub use config::Config;
pub use db::DbService;
pub use error::{ServiceError, ServiceResult};
pub use state::AppState;
