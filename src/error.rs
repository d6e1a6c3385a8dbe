use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;

use crate::auth::AuthError;

/// Errors raised by the domain services and their handlers
#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    Conflict(String),
    /// Conflict that carries extra JSON fields merged into the response body
    #[error("{message}")]
    ConflictWith { message: String, details: Value },
    #[error("{0}")]
    Validation(String),
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn not_found(what: &str) -> Self {
        AppError::NotFound(format!("{} not found", what))
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Conflict(_) | AppError::ConflictWith { .. } => StatusCode::CONFLICT,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Auth(err) => err.status_code(),
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut messages: Vec<String> = errors
            .field_errors()
            .iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |err| match &err.message {
                    Some(message) => format!("{}: {}", field, message),
                    None => format!("{}: invalid value", field),
                })
            })
            .collect();
        messages.sort();
        AppError::Validation(messages.join("; "))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let (error, message, details) = match self {
            AppError::Auth(err) => return err.into_response(),
            AppError::NotFound(message) => ("Not found", message, None),
            AppError::Forbidden(message) => ("Forbidden", message, None),
            AppError::Conflict(message) => ("Conflict", message, None),
            AppError::ConflictWith { message, details } => ("Conflict", message, Some(details)),
            AppError::Validation(message) => ("Validation failed", message, None),
            AppError::Database(err) => {
                tracing::error!("database error: {}", err);
                ("Database error", "Internal server error".to_string(), None)
            }
            AppError::Internal(err) => {
                tracing::error!("internal error: {:#}", err);
                ("Internal server error", "Internal server error".to_string(), None)
            }
        };

        let mut body = json!({
            "error": error,
            "message": message,
        });
        if let (Some(Value::Object(extra)), Some(object)) = (details, body.as_object_mut()) {
            object.extend(extra);
        }

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_of(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_conflict_with_merges_details() {
        let error = AppError::ConflictWith {
            message: "You already have a gym registered".to_string(),
            details: json!({ "existing_gym": { "name": "Iron Temple" } }),
        };

        let response = error.into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);

        let body = body_of(response).await;
        assert_eq!(body["error"], "Conflict");
        assert_eq!(body["existing_gym"]["name"], "Iron Temple");
    }

    #[tokio::test]
    async fn test_auth_errors_keep_their_status() {
        let response = AppError::from(AuthError::InsufficientPermissions).into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        let body = body_of(response).await;
        assert_eq!(body["error"], "Insufficient permissions");
    }

    #[tokio::test]
    async fn test_internal_errors_are_not_leaked() {
        let response = AppError::Internal(anyhow::anyhow!("secret detail")).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_of(response).await;
        assert_eq!(body["message"], "Internal server error");
    }

    #[test]
    fn test_not_found_message() {
        let error = AppError::not_found("Gym");
        assert_eq!(error.to_string(), "Gym not found");
        assert_eq!(error.status_code(), StatusCode::NOT_FOUND);
    }
}
