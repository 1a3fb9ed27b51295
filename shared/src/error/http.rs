//! HTTP status code mapping for error codes

use super::codes::ErrorCode;
use http::StatusCode;

impl ErrorCode {
    /// Get the appropriate HTTP status code for this error code
    pub fn http_status(&self) -> StatusCode {
        match self {
            Self::Success => StatusCode::OK,

            // 404 Not Found
            Self::NotFound
            | Self::OrderNotFound
            | Self::ProductNotFound
            | Self::CategoryNotFound
            | Self::UserNotFound
            | Self::RoleNotFound => StatusCode::NOT_FOUND,

            // 409 Conflict (state of the resource forbids the request)
            Self::AlreadyExists
            | Self::CategoryNameExists
            | Self::InvalidStatusTransition
            | Self::OrderTerminal
            | Self::ProductHasOrders
            | Self::CategoryHasProducts
            | Self::RoleAlreadyAssigned => StatusCode::CONFLICT,

            // 401 Unauthorized
            Self::NotAuthenticated | Self::TokenExpired | Self::TokenInvalid => {
                StatusCode::UNAUTHORIZED
            }

            // 403 Forbidden
            Self::PermissionDenied | Self::SellerRequired | Self::SuperAdminRequired => {
                StatusCode::FORBIDDEN
            }

            // 500 Internal Server Error
            Self::Unknown | Self::InternalError | Self::DatabaseError | Self::ConfigError => {
                StatusCode::INTERNAL_SERVER_ERROR
            }

            // 400 Bad Request (default for validation/business errors)
            _ => StatusCode::BAD_REQUEST,
        }
    }
}
