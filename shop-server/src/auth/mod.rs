//! Authentication middleware

pub mod jwt;

pub use jwt::{CurrentUser, MaybeUser, auth_middleware, create_token, optional_auth_middleware};
