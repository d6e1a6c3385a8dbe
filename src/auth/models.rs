use axum::{extract::FromRequestParts, http::request::Parts};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::auth::AuthError;
use crate::models::UserInfo;

/// Account types for role-based access control
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, sqlx::Type)]
#[sqlx(type_name = "user_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum UserType {
    Admin,
    GymOwner,
    Member,
}

impl UserType {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserType::Admin => "admin",
            UserType::GymOwner => "gym_owner",
            UserType::Member => "member",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "admin" => Some(UserType::Admin),
            "gym_owner" => Some(UserType::GymOwner),
            "member" => Some(UserType::Member),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

/// JWT token claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub username: String,
    pub user_type: UserType,
    pub token_type: TokenType,
    pub exp: usize,
    pub iat: usize,
    pub jti: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct SignupRequest {
    #[validate(length(min = 3, max = 150, message = "Username must be 3-150 characters"))]
    pub username: String,
    #[validate(
        email(message = "Enter a valid email address"),
        length(max = 255, message = "Email must be at most 255 characters")
    )]
    pub email: String,
    pub password: String,
    pub password_confirm: String,
    #[serde(default)]
    #[validate(length(max = 150))]
    pub first_name: String,
    #[serde(default)]
    #[validate(length(max = 150))]
    pub last_name: String,
    pub user_type: Option<UserType>,
    #[validate(length(max = 20))]
    pub phone: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub address: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RefreshTokenRequest {
    pub refresh: String,
}

#[derive(Debug, Deserialize)]
pub struct LogoutRequest {
    pub refresh: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(
        email(message = "Enter a valid email address"),
        length(max = 255, message = "Email must be at most 255 characters")
    )]
    pub email: Option<String>,
    #[validate(length(max = 150))]
    pub first_name: Option<String>,
    #[validate(length(max = 150))]
    pub last_name: Option<String>,
    #[validate(length(max = 20))]
    pub phone: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub address: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub user: UserInfo,
    pub access: String,
    pub refresh: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Authenticated caller, placed in request extensions by the JWT middleware
#[derive(Debug, Clone)]
pub struct UserSession {
    pub user_id: Uuid,
    pub username: String,
    pub user_type: UserType,
    pub jti: String,
    pub exp: usize,
}

impl UserSession {
    pub fn from_claims(claims: &Claims) -> Result<Self, uuid::Error> {
        Ok(Self {
            user_id: Uuid::parse_str(&claims.sub)?,
            username: claims.username.clone(),
            user_type: claims.user_type,
            jti: claims.jti.clone(),
            exp: claims.exp,
        })
    }

    pub fn is_admin(&self) -> bool {
        self.user_type == UserType::Admin
    }
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for UserSession
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<UserSession>()
            .cloned()
            .ok_or(AuthError::MissingAuthHeader)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_type_round_trips_through_json() {
        let json = serde_json::to_string(&UserType::GymOwner).unwrap();
        assert_eq!(json, "\"gym_owner\"");
        let parsed: UserType = serde_json::from_str("\"member\"").unwrap();
        assert_eq!(parsed, UserType::Member);
        assert_eq!(UserType::parse("ADMIN"), Some(UserType::Admin));
        assert_eq!(UserType::parse("coach"), None);
    }

    #[test]
    fn test_signup_validation() {
        let request = SignupRequest {
            username: "ab".to_string(),
            email: "not-an-email".to_string(),
            password: "password1".to_string(),
            password_confirm: "password1".to_string(),
            first_name: String::new(),
            last_name: String::new(),
            user_type: None,
            phone: None,
            date_of_birth: None,
            address: None,
        };

        let errors = request.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("username"));
        assert!(fields.contains_key("email"));
    }

    #[test]
    fn test_signup_email_longer_than_column_rejected() {
        let email = format!("{}@{}.{}.{}.com", "m".repeat(64), "x".repeat(63), "y".repeat(63), "z".repeat(63));
        let request = SignupRequest {
            username: "maria".to_string(),
            email,
            password: "password1".to_string(),
            password_confirm: "password1".to_string(),
            first_name: String::new(),
            last_name: String::new(),
            user_type: None,
            phone: None,
            date_of_birth: None,
            address: None,
        };

        let errors = request.validate().unwrap_err();
        assert_eq!(errors.field_errors().keys().collect::<Vec<_>>(), vec![&"email"]);
    }

    #[test]
    fn test_session_from_claims() {
        let user_id = Uuid::new_v4();
        let claims = Claims {
            sub: user_id.to_string(),
            username: "maria".to_string(),
            user_type: UserType::Member,
            token_type: TokenType::Access,
            exp: 10,
            iat: 0,
            jti: "abc".to_string(),
        };

        let session = UserSession::from_claims(&claims).unwrap();
        assert_eq!(session.user_id, user_id);
        assert!(!session.is_admin());

        let bad = Claims {
            sub: "not-a-uuid".to_string(),
            ..claims
        };
        assert!(UserSession::from_claims(&bad).is_err());
    }
}
