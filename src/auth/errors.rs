use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("User not found")]
    UserNotFound,
    #[error("A user with that username already exists")]
    UsernameAlreadyExists,
    #[error("A user with that email already exists")]
    EmailAlreadyExists,
    #[error("Admin accounts cannot be self-registered")]
    AdminSignupForbidden,
    #[error("Account is disabled")]
    AccountDisabled,
    #[error("Current password is incorrect")]
    IncorrectPassword,
    #[error("Invalid token")]
    InvalidToken,
    #[error("Token expired")]
    TokenExpired,
    #[error("Token has been revoked")]
    TokenRevoked,
    #[error("Missing authorization header")]
    MissingAuthHeader,
    #[error("Invalid authorization header format")]
    InvalidAuthHeaderFormat,
    #[error("Insufficient permissions")]
    InsufficientPermissions,
    #[error("Rate limit exceeded")]
    RateLimitExceeded,
    #[error("{0}")]
    Validation(String),
    #[error("Password validation failed: {0}")]
    PasswordValidation(#[from] crate::auth::password::PasswordError),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("JWT error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),
}

impl AuthError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::InvalidCredentials
            | AuthError::InvalidToken
            | AuthError::TokenExpired
            | AuthError::TokenRevoked
            | AuthError::MissingAuthHeader
            | AuthError::InvalidAuthHeaderFormat
            | AuthError::Jwt(_) => StatusCode::UNAUTHORIZED,
            AuthError::AdminSignupForbidden
            | AuthError::AccountDisabled
            | AuthError::InsufficientPermissions => StatusCode::FORBIDDEN,
            AuthError::UserNotFound => StatusCode::NOT_FOUND,
            AuthError::UsernameAlreadyExists | AuthError::EmailAlreadyExists => StatusCode::CONFLICT,
            AuthError::IncorrectPassword
            | AuthError::Validation(_)
            | AuthError::PasswordValidation(_) => StatusCode::BAD_REQUEST,
            AuthError::RateLimitExceeded => StatusCode::TOO_MANY_REQUESTS,
            AuthError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn short_message(&self) -> &'static str {
        match self {
            AuthError::InvalidCredentials => "Invalid credentials",
            AuthError::UserNotFound => "User not found",
            AuthError::UsernameAlreadyExists | AuthError::EmailAlreadyExists => "User already exists",
            AuthError::AdminSignupForbidden => "Forbidden",
            AuthError::AccountDisabled => "Account disabled",
            AuthError::IncorrectPassword => "Incorrect password",
            AuthError::InvalidToken => "Invalid token",
            AuthError::TokenExpired => "Token expired",
            AuthError::TokenRevoked => "Token revoked",
            AuthError::MissingAuthHeader => "Missing authorization header",
            AuthError::InvalidAuthHeaderFormat => "Invalid authorization header format",
            AuthError::InsufficientPermissions => "Insufficient permissions",
            AuthError::RateLimitExceeded => "Rate limit exceeded",
            AuthError::Validation(_) => "Validation failed",
            AuthError::PasswordValidation(_) => "Password validation failed",
            AuthError::Database(_) => "Database error",
            AuthError::Jwt(_) => "Token error",
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // Driver errors are logged, never echoed back.
        let message = match &self {
            AuthError::Database(err) => {
                tracing::error!("database error during authentication: {}", err);
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };

        let body = Json(json!({
            "error": self.short_message(),
            "message": message,
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(AuthError::InvalidCredentials.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(AuthError::TokenExpired.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(AuthError::AdminSignupForbidden.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(AuthError::InsufficientPermissions.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(AuthError::EmailAlreadyExists.status_code(), StatusCode::CONFLICT);
        assert_eq!(AuthError::RateLimitExceeded.status_code(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(
            AuthError::Validation("bad".to_string()).status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[tokio::test]
    async fn test_error_body_shape() {
        let response = AuthError::TokenExpired.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"], "Token expired");
        assert_eq!(body["message"], "Token expired");
    }
}
