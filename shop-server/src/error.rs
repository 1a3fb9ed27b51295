//! Unified service-layer error type
//!
//! `ServiceError` bridges DB-layer errors (`sqlx::Error`, `BoxError`) and the
//! API-layer error (`AppError`), so services can use `?` on both.

use axum::response::IntoResponse;
use shared::error::{AppError, ErrorCode};
use thiserror::Error;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Service-layer error
///
/// - `Db`: database/infrastructure errors (logged, mapped to InternalError)
/// - `App`: business-rule errors (passed through to the client)
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("database error: {0}")]
    Db(BoxError),
    #[error(transparent)]
    App(AppError),
}

impl ServiceError {
    /// Business error code, `None` for infrastructure failures
    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            ServiceError::App(e) => Some(e.code),
            ServiceError::Db(_) => None,
        }
    }
}

impl From<sqlx::Error> for ServiceError {
    fn from(e: sqlx::Error) -> Self {
        ServiceError::Db(e.into())
    }
}

impl From<BoxError> for ServiceError {
    fn from(e: BoxError) -> Self {
        ServiceError::Db(e)
    }
}

impl From<AppError> for ServiceError {
    fn from(e: AppError) -> Self {
        ServiceError::App(e)
    }
}

impl From<ErrorCode> for ServiceError {
    fn from(code: ErrorCode) -> Self {
        ServiceError::App(AppError::new(code))
    }
}

impl From<ServiceError> for AppError {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::App(app_err) => app_err,
            ServiceError::Db(db_err) => {
                tracing::error!(error = %db_err, "Service database error");
                AppError::new(ErrorCode::InternalError)
            }
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> axum::response::Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

/// Convenience type alias for service-layer results
pub type ServiceResult<T> = Result<T, ServiceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_db_error_is_hidden_from_clients() {
        let err = ServiceError::from(sqlx::Error::RowNotFound);
        assert_eq!(err.code(), None);

        let app: AppError = err.into();
        assert_eq!(app.code, ErrorCode::InternalError);
        assert_eq!(app.message, "Internal server error");
    }

    #[test]
    fn test_app_error_passes_through() {
        let err = ServiceError::from(AppError::insufficient_stock(3, "Kettle"));
        assert_eq!(err.code(), Some(ErrorCode::InsufficientStock));

        let app: AppError = err.into();
        assert_eq!(app.message, "insufficient stock for product Kettle");
    }
}
