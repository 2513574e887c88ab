use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// The application's error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// A database error.
    #[error("Database error: {0}")]
    Database(#[from] tokio_postgres::Error),

    /// A connection pool checkout error.
    #[error("Pool error: {0}")]
    Pool(#[from] deadpool_postgres::PoolError),

    /// A connection pool construction error.
    #[error("Pool build error: {0}")]
    PoolBuild(#[from] deadpool_postgres::BuildError),

    /// The email/password combination did not match a seller.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// No session cookie accompanied a request to a protected route.
    #[error("Authentication required")]
    Unauthenticated,

    /// The session token failed signature or expiry checks.
    #[error("Invalid or expired token")]
    InvalidOrExpiredToken,

    /// A resource not found error.
    #[error("Resource not found")]
    NotFound,

    /// A uniqueness conflict.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// A validation error.
    #[error("Validation error: {0}")]
    Validation(String),

    /// An internal server error.
    #[error("Internal server error: {0}")]
    Internal(String),
}

/// A `Result` type that uses `AppError` as the error type.
pub type Result<T> = std::result::Result<T, AppError>;

impl AppError {
    /// The status code and client-facing message for this error.
    fn status_and_message(&self) -> (StatusCode, String) {
        match self {
            AppError::Database(e) => {
                tracing::error!("Database error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Database error".to_string())
            }

            AppError::Pool(e) => {
                tracing::error!("Pool error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Database error".to_string())
            }

            AppError::PoolBuild(e) => {
                tracing::error!("Pool build error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Database error".to_string())
            }

            AppError::InvalidCredentials => {
                tracing::warn!("Authentication failed: invalid credentials");
                (StatusCode::UNAUTHORIZED, "Invalid credentials".to_string())
            }

            AppError::Unauthenticated => {
                tracing::debug!("Request without session cookie");
                (StatusCode::UNAUTHORIZED, "Authentication required".to_string())
            }

            AppError::InvalidOrExpiredToken => {
                tracing::warn!("Rejected invalid or expired token");
                (StatusCode::UNAUTHORIZED, "Invalid or expired token".to_string())
            }

            AppError::NotFound => {
                tracing::debug!("Resource not found");
                (StatusCode::NOT_FOUND, "Resource not found".to_string())
            }

            AppError::Conflict(msg) => {
                tracing::debug!("Conflict: {}", msg);
                (StatusCode::CONFLICT, msg.clone())
            }

            AppError::Validation(msg) => {
                tracing::debug!("Validation error: {}", msg);
                (StatusCode::BAD_REQUEST, msg.clone())
            }

            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();

        let body = sonic_rs::to_string(&sonic_rs::json!({
            "error": message
        }))
        .unwrap_or_else(|_| r#"{"error":"Internal server error"}"#.to_string());

        (
            status,
            [(http::header::CONTENT_TYPE, "application/json")],
            body,
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_of(error: AppError) -> (StatusCode, String) {
        let response = error.into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_invalid_credentials_is_generic() {
        let (status, body) = body_of(AppError::InvalidCredentials).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body, r#"{"error":"Invalid credentials"}"#);
    }

    #[tokio::test]
    async fn test_token_errors_are_unauthorized() {
        let (status, _) = body_of(AppError::InvalidOrExpiredToken).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = body_of(AppError::Unauthenticated).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_internal_error_hides_details() {
        let (status, body) = body_of(AppError::Internal("signing key exploded".into())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!body.contains("signing key"));
    }

    #[tokio::test]
    async fn test_client_errors_keep_message() {
        let (status, body) = body_of(AppError::Conflict("Email already registered".into())).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert!(body.contains("Email already registered"));

        let (status, _) = body_of(AppError::Validation("bad".into())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
