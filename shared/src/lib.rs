//! Shared types for the shop backend
//!
//! Domain models, the unified error system and small utilities used by
//! shop-server and its API clients.

pub mod error;
pub mod models;
pub mod util;

// Re-exports
pub use axum::{Json, body};
pub use http;
pub use serde::{Deserialize, Serialize};
