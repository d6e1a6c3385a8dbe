use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Not logged in. Run 'gymhub login' first")]
    NotLoggedIn,

    #[error("Session expired. Run 'gymhub login' again")]
    SessionExpired,

    #[error("Authentication failed: {0}")]
    Unauthorized(String),

    #[error("Permission denied: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Too many requests: {0}")]
    RateLimited(String),

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Error body the server sends: `{"error": ..., "message": ...}`
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<String>,
    message: Option<String>,
}

fn error_message(status: StatusCode, body: &str) -> String {
    let parsed = serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|body| body.message.or(body.error));

    match parsed {
        Some(message) if !message.is_empty() => message,
        _ if !body.trim().is_empty() => body.trim().to_string(),
        _ => status.canonical_reason().unwrap_or("Unknown error").to_string(),
    }
}

impl ApiError {
    pub fn from_status(status: StatusCode, body: &str) -> Self {
        let msg = error_message(status, body);

        match status {
            StatusCode::UNAUTHORIZED => ApiError::Unauthorized(msg),
            StatusCode::FORBIDDEN => ApiError::Forbidden(msg),
            StatusCode::NOT_FOUND => ApiError::NotFound(msg),
            StatusCode::CONFLICT => ApiError::Conflict(msg),
            StatusCode::TOO_MANY_REQUESTS => ApiError::RateLimited(msg),
            status if status.is_server_error() => ApiError::ServerError(msg),
            _ => ApiError::BadRequest(msg),
        }
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert!(matches!(
            ApiError::from_status(StatusCode::UNAUTHORIZED, ""),
            ApiError::Unauthorized(_)
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::CONFLICT, ""),
            ApiError::Conflict(_)
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::UNPROCESSABLE_ENTITY, ""),
            ApiError::BadRequest(_)
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::BAD_GATEWAY, ""),
            ApiError::ServerError(_)
        ));
    }

    #[test]
    fn test_message_from_json_body() {
        let body = r#"{"error": "conflict", "message": "Attendance already marked for today"}"#;
        let err = ApiError::from_status(StatusCode::CONFLICT, body);
        assert_eq!(err.to_string(), "Conflict: Attendance already marked for today");

        let err = ApiError::from_status(StatusCode::NOT_FOUND, "");
        assert_eq!(err.to_string(), "Not found: Not Found");
    }
}
