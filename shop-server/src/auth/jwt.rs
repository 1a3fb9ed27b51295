//! Bearer JWT authentication
//!
//! Tokens are HS256 with claims `{sub, email, exp, iat}`; `sub` is the user id.
//! Registration and login live with the identity provider; `create_token`
//! is used by tooling and tests.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use shared::error::AppError;

use crate::security_log;
use crate::state::AppState;

/// JWT claims
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// User ID
    pub sub: String,
    pub email: String,
    /// Expiration (Unix timestamp seconds)
    pub exp: usize,
    /// Issued at (Unix timestamp seconds)
    pub iat: usize,
}

/// Verified identity of the caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    pub user_id: i64,
    pub email: String,
}

/// Identity on routes where authentication is optional
#[derive(Debug, Clone, Default)]
pub struct MaybeUser(pub Option<CurrentUser>);

const JWT_EXPIRY_HOURS: i64 = 24;

pub fn create_token(
    user_id: i64,
    email: &str,
    secret: &str,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = chrono::Utc::now();
    let claims = Claims {
        sub: user_id.to_string(),
        email: email.to_string(),
        exp: (now + chrono::Duration::hours(JWT_EXPIRY_HOURS)).timestamp() as usize,
        iat: now.timestamp() as usize,
    };

    jsonwebtoken::encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

/// Decode and verify a bearer token
pub fn verify_token(token: &str, secret: &str) -> Result<CurrentUser, AppError> {
    let token_data = jsonwebtoken::decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| {
        tracing::debug!("JWT validation failed: {e}");
        match e.kind() {
            ErrorKind::ExpiredSignature => AppError::token_expired(),
            _ => AppError::invalid_token("Invalid token"),
        }
    })?;

    let user_id = token_data
        .claims
        .sub
        .parse::<i64>()
        .map_err(|_| AppError::invalid_token("Invalid token subject"))?;

    Ok(CurrentUser {
        user_id,
        email: token_data.claims.email,
    })
}

fn bearer_token(request: &Request) -> Result<Option<&str>, AppError> {
    let Some(header) = request.headers().get(http::header::AUTHORIZATION) else {
        return Ok(None);
    };
    let token = header
        .to_str()
        .ok()
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or_else(|| AppError::invalid_token("Invalid Authorization format"))?;
    Ok(Some(token))
}

/// Require a valid bearer token and insert [`CurrentUser`]
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(&request)?.ok_or_else(AppError::not_authenticated)?;
    let user = verify_token(token, &state.jwt_secret).inspect_err(|e| {
        security_log!(WARN, "token_rejected", path = %request.uri().path(), reason = %e);
    })?;

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

/// Insert [`MaybeUser`]; a present but invalid token is still rejected
pub async fn optional_auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let user = match bearer_token(&request)? {
        Some(token) => Some(verify_token(token, &state.jwt_secret)?),
        None => None,
    };

    request.extensions_mut().insert(MaybeUser(user));
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::error::ErrorCode;

    const SECRET: &str = "test-secret";

    #[test]
    fn test_token_roundtrip_yields_user() {
        let token = create_token(42, "ana@example.com", SECRET).unwrap();
        let user = verify_token(&token, SECRET).unwrap();
        assert_eq!(user.user_id, 42);
        assert_eq!(user.email, "ana@example.com");
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let token = create_token(42, "ana@example.com", SECRET).unwrap();
        let err = verify_token(&token, "other-secret").unwrap_err();
        assert_eq!(err.code, ErrorCode::TokenInvalid);
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let claims = Claims {
            sub: "42".to_string(),
            email: "ana@example.com".to_string(),
            exp: 1_000,
            iat: 0,
        };
        let token = jsonwebtoken::encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();
        let err = verify_token(&token, SECRET).unwrap_err();
        assert_eq!(err.code, ErrorCode::TokenExpired);
    }
}
