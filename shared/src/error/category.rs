//! Error category classification

use super::codes::ErrorCode;
use serde::{Deserialize, Serialize};

/// Error category classification based on error code ranges
///
/// Categories are determined by the leading digit of the error code:
/// - 0xxx: General errors
/// - 1xxx: Authentication errors
/// - 2xxx: Permission errors
/// - 4xxx: Order errors
/// - 6xxx: Product / catalog errors
/// - 8xxx: User / role errors
/// - 9xxx and unassigned ranges: System errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// General errors (0xxx)
    General,
    /// Authentication errors (1xxx)
    Auth,
    /// Permission errors (2xxx)
    Permission,
    /// Order errors (4xxx)
    Order,
    /// Product errors (6xxx)
    Product,
    /// User and role errors (8xxx)
    User,
    /// System errors (9xxx)
    System,
}

impl ErrorCategory {
    /// Determine category from error code value
    pub fn from_code(code: u16) -> Self {
        match code {
            0..1000 => Self::General,
            1000..2000 => Self::Auth,
            2000..3000 => Self::Permission,
            4000..5000 => Self::Order,
            6000..7000 => Self::Product,
            8000..9000 => Self::User,
            _ => Self::System,
        }
    }

    /// Get the string name for this category
    pub fn name(&self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Auth => "auth",
            Self::Permission => "permission",
            Self::Order => "order",
            Self::Product => "product",
            Self::User => "user",
            Self::System => "system",
        }
    }
}

impl ErrorCode {
    /// Get the category for this error code
    pub fn category(&self) -> ErrorCategory {
        ErrorCategory::from_code(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_from_code() {
        assert_eq!(ErrorCategory::from_code(0), ErrorCategory::General);
        assert_eq!(ErrorCategory::from_code(999), ErrorCategory::General);
        assert_eq!(ErrorCategory::from_code(1004), ErrorCategory::Auth);
        assert_eq!(ErrorCategory::from_code(2003), ErrorCategory::Permission);
        assert_eq!(ErrorCategory::from_code(4002), ErrorCategory::Order);
        assert_eq!(ErrorCategory::from_code(6101), ErrorCategory::Product);
        assert_eq!(ErrorCategory::from_code(8102), ErrorCategory::User);
        assert_eq!(ErrorCategory::from_code(9001), ErrorCategory::System);
        assert_eq!(ErrorCategory::from_code(3000), ErrorCategory::System);
    }

    #[test]
    fn test_error_code_category() {
        assert_eq!(
            ErrorCode::InvalidStatusTransition.category(),
            ErrorCategory::Order
        );
        assert_eq!(
            ErrorCode::InsufficientStock.category(),
            ErrorCategory::Product
        );
        assert_eq!(
            ErrorCode::CannotRemoveOwnRole.category(),
            ErrorCategory::User
        );
        assert_eq!(
            ErrorCode::SuperAdminRequired.category(),
            ErrorCategory::Permission
        );
        assert_eq!(ErrorCode::DatabaseError.category(), ErrorCategory::System);
    }

    #[test]
    fn test_category_serde() {
        let json = serde_json::to_string(&ErrorCategory::Permission).unwrap();
        assert_eq!(json, "\"permission\"");

        let category: ErrorCategory = serde_json::from_str("\"user\"").unwrap();
        assert_eq!(category, ErrorCategory::User);
    }
}
