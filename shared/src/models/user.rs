//! User Model

use serde::{Deserialize, Serialize};

use super::Role;

/// User entity (credentials live with the identity provider)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct User {
    pub id: i64,
    pub email: String,
    pub name: String,
    pub created_at: i64,
}

/// User with resolved role
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserWithRole {
    pub id: i64,
    pub email: String,
    pub name: String,
    pub role: Role,
}
