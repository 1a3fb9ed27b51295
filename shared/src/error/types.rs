//! Error types and API response structures

use super::codes::ErrorCode;
use http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use thiserror::Error;

/// Application error with structured error code and details
///
/// This is the business error type of the shop backend:
/// - Standardized error codes via [`ErrorCode`]
/// - Human-readable messages
/// - Optional structured details identifying the offending entity
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct AppError {
    /// The error code identifying the type of error
    pub code: ErrorCode,
    /// Human-readable error message
    pub message: String,
    /// Optional additional details (offending ids, statuses, ...)
    pub details: Option<HashMap<String, Value>>,
}

impl AppError {
    /// Create a new error with the default message for the error code
    pub fn new(code: ErrorCode) -> Self {
        Self {
            message: code.message().to_string(),
            code,
            details: None,
        }
    }

    /// Create a new error with a custom message
    pub fn with_message(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    /// Add a detail entry to this error
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.details
            .get_or_insert_with(HashMap::new)
            .insert(key.into(), value.into());
        self
    }

    /// Get the HTTP status code for this error
    pub fn http_status(&self) -> StatusCode {
        self.code.http_status()
    }

    /// Look up a detail value by key
    pub fn detail(&self, key: &str) -> Option<&Value> {
        self.details.as_ref().and_then(|d| d.get(key))
    }

    // ==================== Convenience constructors ====================

    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::ValidationFailed, msg)
    }

    /// Create a not found error
    pub fn not_found(resource: impl Into<String>) -> Self {
        let r = resource.into();
        Self::with_message(ErrorCode::NotFound, format!("{} not found", r))
            .with_detail("resource", r)
    }

    /// Create a not authenticated error
    pub fn not_authenticated() -> Self {
        Self::new(ErrorCode::NotAuthenticated)
    }

    /// Create a permission denied error
    pub fn permission_denied(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::PermissionDenied, msg)
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::InternalError, msg)
    }

    /// Create a database error
    pub fn database(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::DatabaseError, msg)
    }

    /// Create an invalid request error
    pub fn invalid_request(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::InvalidRequest, msg)
    }

    /// Create an already exists error
    pub fn already_exists(resource: impl Into<String>) -> Self {
        let r = resource.into();
        Self::with_message(ErrorCode::AlreadyExists, format!("{} already exists", r))
            .with_detail("resource", r)
    }

    /// Create an invalid token error
    pub fn invalid_token(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::TokenInvalid, msg)
    }

    /// Create a token expired error
    pub fn token_expired() -> Self {
        Self::new(ErrorCode::TokenExpired)
    }

    /// Stock check failed for a product, named by title
    pub fn insufficient_stock(product_id: i64, title: &str) -> Self {
        Self::with_message(
            ErrorCode::InsufficientStock,
            format!("insufficient stock for product {}", title),
        )
        .with_detail("product_id", product_id)
        .with_detail("product", title)
    }

    /// Status precondition failed for an order transition
    pub fn invalid_transition(
        order_id: i64,
        from: &str,
        to: &str,
        msg: impl Into<String>,
    ) -> Self {
        Self::with_message(ErrorCode::InvalidStatusTransition, msg)
            .with_detail("order_id", order_id)
            .with_detail("from", from)
            .with_detail("to", to)
    }
}

/// Unified API response structure
///
/// Provides a consistent response format for all API endpoints:
/// - `code`: Error code (0 for success)
/// - `message`: Human-readable message
/// - `data`: Response payload (on success)
/// - `details`: Additional error details (on failure)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// Error code (0 for success, non-zero for errors)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<u16>,
    /// Human-readable message
    pub message: String,
    /// Response data (present on success)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// Additional error details (present on failure)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<HashMap<String, Value>>,
}

impl<T> ApiResponse<T> {
    /// Create a success response with data
    pub fn success(data: T) -> Self {
        Self {
            code: Some(0),
            message: "OK".to_string(),
            data: Some(data),
            details: None,
        }
    }

    /// Create a success response with custom message and data
    pub fn success_with_message(message: impl Into<String>, data: T) -> Self {
        Self {
            code: Some(0),
            message: message.into(),
            data: Some(data),
            details: None,
        }
    }
}

impl ApiResponse<()> {
    /// Create a success response without data
    pub fn ok() -> Self {
        Self {
            code: Some(0),
            message: "OK".to_string(),
            data: None,
            details: None,
        }
    }

    /// Create an error response from an AppError
    pub fn error(err: &AppError) -> Self {
        Self {
            code: Some(err.code.code()),
            message: err.message.clone(),
            data: None,
            details: err.details.clone(),
        }
    }
}

impl<T> From<AppError> for ApiResponse<T> {
    fn from(err: AppError) -> Self {
        Self {
            code: Some(err.code.code()),
            message: err.message,
            data: None,
            details: err.details,
        }
    }
}

/// Type alias for Result with AppError
pub type AppResult<T> = Result<T, AppError>;

// ===== Axum Integration =====

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        use axum::Json;

        let status = self.http_status();
        let body = ApiResponse::<()>::error(&self);

        if matches!(self.code.category(), super::category::ErrorCategory::System) {
            tracing::error!(
                code = %self.code,
                message = %self.message,
                "System error occurred"
            );
        }

        (status, Json(body)).into_response()
    }
}

impl<T: Serialize> axum::response::IntoResponse for ApiResponse<T> {
    fn into_response(self) -> axum::response::Response {
        use axum::Json;

        let status = match self.code {
            None | Some(0) => StatusCode::OK,
            Some(code) => ErrorCode::try_from(code)
                .map(|c| c.http_status())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        };

        (status, Json(self)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_error_new_uses_default_message() {
        let err = AppError::new(ErrorCode::OrderNotFound);
        assert_eq!(err.code, ErrorCode::OrderNotFound);
        assert_eq!(err.message, "Order not found");
        assert!(err.details.is_none());
    }

    #[test]
    fn test_insufficient_stock_names_product() {
        let err = AppError::insufficient_stock(42, "Widget");
        assert_eq!(err.code, ErrorCode::InsufficientStock);
        assert_eq!(err.message, "insufficient stock for product Widget");
        assert_eq!(err.detail("product_id"), Some(&Value::from(42)));
        assert_eq!(err.detail("product"), Some(&Value::from("Widget")));
        assert_eq!(err.http_status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_invalid_transition_details() {
        let err = AppError::invalid_transition(
            7,
            "pending",
            "confirmed",
            "order must be paid before confirmation",
        );
        assert_eq!(err.code, ErrorCode::InvalidStatusTransition);
        assert_eq!(err.detail("from"), Some(&Value::from("pending")));
        assert_eq!(err.detail("to"), Some(&Value::from("confirmed")));
        assert_eq!(err.http_status(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::with_message(ErrorCode::NotFound, "Order not found");
        assert_eq!(format!("{}", err), "Order not found");
    }

    #[test]
    fn test_api_response_error_keeps_details() {
        let err = AppError::insufficient_stock(1, "Lamp");
        let response = ApiResponse::<()>::error(&err);

        assert_eq!(response.code, Some(6003));
        assert!(response.data.is_none());
        assert!(response.details.unwrap().contains_key("product"));
    }

    #[test]
    fn test_api_response_serialize() {
        let response = ApiResponse::success("hello");
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"code\":0"));
        assert!(json.contains("\"message\":\"OK\""));
        assert!(json.contains("\"data\":\"hello\""));
        assert!(!json.contains("details"));
    }
}
