//! Role Model
//!
//! A user holds at most one role. Users without an assignment resolve to
//! [`Role::User`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::AppError;

/// Closed set of roles
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    #[default]
    User,
    Seller,
    SuperAdmin,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::User, Role::Seller, Role::SuperAdmin];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Seller => "seller",
            Role::SuperAdmin => "super_admin",
        }
    }

    pub const fn is_super_admin(&self) -> bool {
        matches!(self, Role::SuperAdmin)
    }

    /// Seller or super admin
    pub const fn is_staff(&self) -> bool {
        matches!(self, Role::Seller | Role::SuperAdmin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| {
                AppError::invalid_request(format!("unknown role: {s}")).with_detail("role", s)
            })
    }
}

/// Role row (seeded, read-only)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct RoleInfo {
    pub id: i64,
    pub name: String,
    pub description: String,
}

/// Assign role payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignRoleRequest {
    pub user_id: i64,
    pub role: String,
}

/// Remove role payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoveRoleRequest {
    pub user_id: i64,
}

/// Resolved role of one user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRoleResponse {
    pub user_id: i64,
    pub role: Role,
    /// False when the role is the implicit default
    pub assigned: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    #[test]
    fn test_role_wire_names() {
        assert_eq!(
            serde_json::to_string(&Role::SuperAdmin).unwrap(),
            "\"super_admin\""
        );
        assert_eq!("seller".parse::<Role>().unwrap(), Role::Seller);
        assert_eq!(Role::default(), Role::User);
    }

    #[test]
    fn test_unknown_role_rejected() {
        let err = "admin".parse::<Role>().unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidRequest);
    }

    #[test]
    fn test_staff() {
        assert!(Role::SuperAdmin.is_staff());
        assert!(Role::Seller.is_staff());
        assert!(!Role::User.is_staff());
        assert!(!Role::Seller.is_super_admin());
    }
}
