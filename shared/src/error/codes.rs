//! Unified error codes for the shop backend
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Permission errors
//! - 4xxx: Order errors
//! - 6xxx: Product / catalog errors
//! - 8xxx: User / role errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values so clients can switch on
/// a stable number instead of parsing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,
    /// Invalid request
    InvalidRequest = 5,
    /// Value out of range
    ValueOutOfRange = 8,

    // ==================== 1xxx: Auth ====================
    /// User is not authenticated
    NotAuthenticated = 1001,
    /// Token has expired
    TokenExpired = 1003,
    /// Token is invalid
    TokenInvalid = 1004,

    // ==================== 2xxx: Permission ====================
    /// Permission denied
    PermissionDenied = 2001,
    /// Seller or super-admin role required
    SellerRequired = 2002,
    /// Super-admin role required
    SuperAdminRequired = 2003,

    // ==================== 4xxx: Order ====================
    /// Order not found
    OrderNotFound = 4001,
    /// Current status does not allow the requested transition
    InvalidStatusTransition = 4002,
    /// Order is delivered or cancelled
    OrderTerminal = 4003,
    /// Users can only move their orders to cancelled
    OnlyCancelAllowed = 4004,
    /// Order has no line items
    EmptyOrder = 4007,
    /// Line item quantity out of range
    InvalidQuantity = 4008,

    // ==================== 6xxx: Product ====================
    /// Product not found
    ProductNotFound = 6001,
    /// Product has invalid price
    ProductInvalidPrice = 6002,
    /// Not enough stock for the requested quantity
    InsufficientStock = 6003,
    /// Product is referenced by order items
    ProductHasOrders = 6004,
    /// Category not found
    CategoryNotFound = 6101,
    /// Category still has products
    CategoryHasProducts = 6102,
    /// Category name already exists
    CategoryNameExists = 6103,

    // ==================== 8xxx: User / Role ====================
    /// User not found
    UserNotFound = 8001,
    /// Role not found
    RoleNotFound = 8101,
    /// User already holds this role
    RoleAlreadyAssigned = 8102,
    /// User has no explicit role assignment
    NoRoleToRemove = 8103,
    /// Actors cannot remove their own role
    CannotRemoveOwnRole = 8104,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Database error
    DatabaseError = 9002,
    /// Configuration error
    ConfigError = 9003,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Check if this is a success code
    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    /// Get the developer-facing English message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::Unknown => "An unknown error occurred",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::AlreadyExists => "Resource already exists",
            ErrorCode::InvalidRequest => "Invalid request",
            ErrorCode::ValueOutOfRange => "Value is out of range",

            // Auth
            ErrorCode::NotAuthenticated => "User is not authenticated",
            ErrorCode::TokenExpired => "Authentication token has expired",
            ErrorCode::TokenInvalid => "Authentication token is invalid",

            // Permission
            ErrorCode::PermissionDenied => "Permission denied",
            ErrorCode::SellerRequired => "Seller or super admin role is required",
            ErrorCode::SuperAdminRequired => "Super admin role is required",

            // Order
            ErrorCode::OrderNotFound => "Order not found",
            ErrorCode::InvalidStatusTransition => "Order status does not allow this transition",
            ErrorCode::OrderTerminal => "Order cannot be cancelled",
            ErrorCode::OnlyCancelAllowed => "Users can only cancel orders",
            ErrorCode::EmptyOrder => "Order must contain at least one item",
            ErrorCode::InvalidQuantity => "Item quantity is out of range",

            // Product
            ErrorCode::ProductNotFound => "Product not found",
            ErrorCode::ProductInvalidPrice => "Product has invalid price",
            ErrorCode::InsufficientStock => "Insufficient stock",
            ErrorCode::ProductHasOrders => "Product is referenced by existing orders",
            ErrorCode::CategoryNotFound => "Category not found",
            ErrorCode::CategoryHasProducts => "Category still has products",
            ErrorCode::CategoryNameExists => "Category name already exists",

            // User / Role
            ErrorCode::UserNotFound => "User not found",
            ErrorCode::RoleNotFound => "Role not found",
            ErrorCode::RoleAlreadyAssigned => "User already has this role",
            ErrorCode::NoRoleToRemove => "User has no role to remove",
            ErrorCode::CannotRemoveOwnRole => "Cannot remove your own role",

            // System
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::DatabaseError => "Database error",
            ErrorCode::ConfigError => "Configuration error",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error when converting from an invalid u16 to ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            0 => Ok(ErrorCode::Success),
            1 => Ok(ErrorCode::Unknown),
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),
            4 => Ok(ErrorCode::AlreadyExists),
            5 => Ok(ErrorCode::InvalidRequest),
            8 => Ok(ErrorCode::ValueOutOfRange),

            // Auth
            1001 => Ok(ErrorCode::NotAuthenticated),
            1003 => Ok(ErrorCode::TokenExpired),
            1004 => Ok(ErrorCode::TokenInvalid),

            // Permission
            2001 => Ok(ErrorCode::PermissionDenied),
            2002 => Ok(ErrorCode::SellerRequired),
            2003 => Ok(ErrorCode::SuperAdminRequired),

            // Order
            4001 => Ok(ErrorCode::OrderNotFound),
            4002 => Ok(ErrorCode::InvalidStatusTransition),
            4003 => Ok(ErrorCode::OrderTerminal),
            4004 => Ok(ErrorCode::OnlyCancelAllowed),
            4007 => Ok(ErrorCode::EmptyOrder),
            4008 => Ok(ErrorCode::InvalidQuantity),

            // Product
            6001 => Ok(ErrorCode::ProductNotFound),
            6002 => Ok(ErrorCode::ProductInvalidPrice),
            6003 => Ok(ErrorCode::InsufficientStock),
            6004 => Ok(ErrorCode::ProductHasOrders),
            6101 => Ok(ErrorCode::CategoryNotFound),
            6102 => Ok(ErrorCode::CategoryHasProducts),
            6103 => Ok(ErrorCode::CategoryNameExists),

            // User / Role
            8001 => Ok(ErrorCode::UserNotFound),
            8101 => Ok(ErrorCode::RoleNotFound),
            8102 => Ok(ErrorCode::RoleAlreadyAssigned),
            8103 => Ok(ErrorCode::NoRoleToRemove),
            8104 => Ok(ErrorCode::CannotRemoveOwnRole),

            // System
            9001 => Ok(ErrorCode::InternalError),
            9002 => Ok(ErrorCode::DatabaseError),
            9003 => Ok(ErrorCode::ConfigError),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{:04}", self.code())
    }
}
