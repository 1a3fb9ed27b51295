//! Data models
//!
//! Shared between shop-server and API clients.
//! DB row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`.
//! All IDs are `i64` (SQLite INTEGER PRIMARY KEY), timestamps are Unix millis.

pub mod category;
pub mod order;
pub mod product;
pub mod role;
pub mod search;
pub mod user;

// Re-exports
pub use category::*;
pub use order::*;
pub use product::*;
pub use role::*;
pub use search::*;
pub use user::*;
