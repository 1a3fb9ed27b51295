//! Unified error system for the shop backend
//!
//! - [`ErrorCode`]: Standardized error codes for all error types
//! - [`ErrorCategory`]: Classification of errors by domain
//! - [`AppError`]: Rich error type with codes, messages, and details
//! - [`ApiResponse`]: Unified API response format
//!
//! # Error Code Ranges
//!
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Permission errors
//! - 4xxx: Order errors
//! - 6xxx: Product / catalog errors
//! - 8xxx: User / role errors
//! - 9xxx: System errors
//!
//! # Example
//!
//! ```
//! use shared::error::{AppError, ErrorCode, ApiResponse};
//!
//! let err = AppError::new(ErrorCode::OrderNotFound);
//!
//! let err = AppError::insufficient_stock(12, "Desk Lamp");
//! assert_eq!(err.code, ErrorCode::InsufficientStock);
//!
//! let response = ApiResponse::<()>::error(&err);
//! assert_eq!(response.code, Some(6003));
//! ```

mod category;
mod codes;
mod http;
mod types;

pub use category::ErrorCategory;
pub use codes::{ErrorCode, InvalidErrorCode};
pub use types::{ApiResponse, AppError, AppResult};
