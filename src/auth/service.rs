use chrono::DateTime;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::auth::password::{hash_password, verify_password};
use crate::auth::{
    AuthError, AuthResponse, ChangePasswordRequest, JwtService, LoginRequest, MessageResponse,
    RefreshTokenRequest, SignupRequest, TokenResponse, TokenType, UpdateProfileRequest,
    UserSession, UserType,
};
use crate::models::validation::{validate_phone, validate_username};
use crate::models::{NewUser, User, UserInfo};
use crate::services::UserService;

#[derive(Debug, Clone)]
pub struct AuthService {
    jwt_service: JwtService,
    db: PgPool,
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db_err) if db_err.is_unique_violation())
}

fn token_digest(token: &str) -> String {
    format!("{:x}", md5::compute(token))
}

impl AuthService {
    pub fn new(db: PgPool, jwt_service: JwtService) -> Self {
        Self { jwt_service, db }
    }

    pub fn jwt(&self) -> &JwtService {
        &self.jwt_service
    }

    fn users(&self) -> UserService {
        UserService::new(self.db.clone())
    }

    /// Register a member or gym owner and sign them in
    pub async fn signup(&self, request: SignupRequest) -> Result<AuthResponse, AuthError> {
        request
            .validate()
            .map_err(|errors| AuthError::Validation(crate::error::AppError::from(errors).to_string()))?;
        validate_username(request.username.trim()).map_err(AuthError::Validation)?;
        if let Some(phone) = request.phone.as_deref().filter(|p| !p.trim().is_empty()) {
            validate_phone(phone).map_err(AuthError::Validation)?;
        }

        let user_type = request.user_type.unwrap_or(UserType::Member);
        if user_type == UserType::Admin {
            tracing::warn!(username = %request.username, "rejected admin self-registration");
            return Err(AuthError::AdminSignupForbidden);
        }

        if request.password != request.password_confirm {
            return Err(AuthError::Validation("Passwords don't match".to_string()));
        }

        let users = self.users();
        if users.find_by_username(&request.username).await?.is_some() {
            return Err(AuthError::UsernameAlreadyExists);
        }
        if users.email_taken(&request.email, None).await? {
            return Err(AuthError::EmailAlreadyExists);
        }

        let password_hash = hash_password(&request.password)?;

        let user = users
            .create_user(NewUser {
                username: request.username.trim().to_string(),
                email: request.email.trim().to_string(),
                password_hash,
                first_name: request.first_name.trim().to_string(),
                last_name: request.last_name.trim().to_string(),
                user_type,
                phone: request.phone,
                date_of_birth: request.date_of_birth,
                address: request.address,
            })
            .await
            .map_err(|err| {
                // Lost a race against a concurrent signup.
                if is_unique_violation(&err) {
                    AuthError::UsernameAlreadyExists
                } else {
                    AuthError::Database(err)
                }
            })?;

        tracing::info!(user_id = %user.id, user_type = user.user_type.as_str(), "user registered");

        self.issue_tokens(user).await
    }

    pub async fn login(&self, request: LoginRequest) -> Result<AuthResponse, AuthError> {
        if request.username.trim().is_empty() || request.password.is_empty() {
            return Err(AuthError::Validation("Must include username and password".to_string()));
        }

        let user = self
            .users()
            .find_by_username(&request.username)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !verify_password(&request.password, &user.password_hash)? {
            tracing::warn!(username = %request.username, "failed login attempt");
            return Err(AuthError::InvalidCredentials);
        }

        if !user.is_active {
            return Err(AuthError::AccountDisabled);
        }

        self.issue_tokens(user).await
    }

    /// Exchange a stored, unrevoked refresh token for a new access token
    pub async fn refresh_token(&self, request: RefreshTokenRequest) -> Result<TokenResponse, AuthError> {
        let claims = self
            .jwt_service
            .validate_typed(&request.refresh, TokenType::Refresh)?;
        let user_id = Uuid::parse_str(&claims.sub).map_err(|_| AuthError::InvalidToken)?;

        if !self.is_refresh_token_valid(user_id, &request.refresh).await? {
            return Err(AuthError::TokenRevoked);
        }

        let user = self
            .users()
            .get_user(user_id)
            .await?
            .filter(|user| user.is_active)
            .ok_or(AuthError::InvalidToken)?;

        let access = self
            .jwt_service
            .create_access_token(user.id, &user.username, user.user_type)?;

        Ok(TokenResponse { access })
    }

    /// Revoke the given refresh token and blacklist the caller's access token
    pub async fn logout(
        &self,
        session: &UserSession,
        refresh: Option<&str>,
    ) -> Result<MessageResponse, AuthError> {
        if let Some(refresh) = refresh {
            sqlx::query(
                "UPDATE refresh_tokens SET revoked = TRUE WHERE user_id = $1 AND token_hash = $2",
            )
            .bind(session.user_id)
            .bind(token_digest(refresh))
            .execute(&self.db)
            .await?;
        }

        self.blacklist_token(&session.jti, session.exp as i64).await?;

        tracing::info!(user_id = %session.user_id, "user logged out");

        Ok(MessageResponse::new("Successfully logged out"))
    }

    pub async fn profile(&self, user_id: Uuid) -> Result<UserInfo, AuthError> {
        let user = self
            .users()
            .get_user(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        Ok(user.into())
    }

    pub async fn update_profile(
        &self,
        user_id: Uuid,
        request: UpdateProfileRequest,
    ) -> Result<UserInfo, AuthError> {
        request
            .validate()
            .map_err(|errors| AuthError::Validation(crate::error::AppError::from(errors).to_string()))?;
        if let Some(phone) = request.phone.as_deref().filter(|p| !p.trim().is_empty()) {
            validate_phone(phone).map_err(AuthError::Validation)?;
        }

        let users = self.users();
        if let Some(email) = &request.email {
            if users.email_taken(email, Some(user_id)).await? {
                return Err(AuthError::EmailAlreadyExists);
            }
        }

        let user = users
            .update_profile(user_id, &request)
            .await
            .map_err(|err| {
                if is_unique_violation(&err) {
                    AuthError::EmailAlreadyExists
                } else {
                    AuthError::Database(err)
                }
            })?
            .ok_or(AuthError::UserNotFound)?;

        Ok(user.into())
    }

    /// Change the password and revoke every outstanding refresh token
    pub async fn change_password(
        &self,
        user_id: Uuid,
        request: ChangePasswordRequest,
    ) -> Result<MessageResponse, AuthError> {
        let users = self.users();
        let user = users.get_user(user_id).await?.ok_or(AuthError::UserNotFound)?;

        if !verify_password(&request.current_password, &user.password_hash)? {
            return Err(AuthError::IncorrectPassword);
        }

        let password_hash = hash_password(&request.new_password)?;
        users.set_password_hash(user_id, &password_hash).await?;
        self.revoke_user_refresh_tokens(user_id).await?;

        tracing::info!(user_id = %user_id, "password changed, refresh tokens revoked");

        Ok(MessageResponse::new("Password changed successfully"))
    }

    pub async fn is_token_blacklisted(&self, jti: &str) -> Result<bool, AuthError> {
        let result = sqlx::query("SELECT 1 FROM token_blacklist WHERE jti = $1 AND expires_at > NOW()")
            .bind(jti)
            .fetch_optional(&self.db)
            .await?;

        Ok(result.is_some())
    }

    /// Validate an access token, check it against the blacklist and make
    /// sure its account still exists and is active
    pub async fn validate_session(&self, token: &str) -> Result<UserSession, AuthError> {
        let session = self.jwt_service.extract_user_session(token)?;

        if self.is_token_blacklisted(&session.jti).await? {
            return Err(AuthError::TokenRevoked);
        }

        let is_active: Option<bool> = sqlx::query_scalar("SELECT is_active FROM users WHERE id = $1")
            .bind(session.user_id)
            .fetch_optional(&self.db)
            .await?;

        match is_active {
            Some(true) => Ok(session),
            Some(false) => {
                tracing::debug!(user_id = %session.user_id, "token presented for inactive account");
                Err(AuthError::InvalidToken)
            }
            None => {
                tracing::debug!(user_id = %session.user_id, "token presented for deleted account");
                Err(AuthError::InvalidToken)
            }
        }
    }

    async fn issue_tokens(&self, user: User) -> Result<AuthResponse, AuthError> {
        let (access, refresh) = self
            .jwt_service
            .create_token_pair(user.id, &user.username, user.user_type)?;

        self.store_refresh_token(user.id, &refresh).await?;

        Ok(AuthResponse {
            user: user.into(),
            access,
            refresh,
        })
    }

    async fn store_refresh_token(&self, user_id: Uuid, refresh_token: &str) -> Result<(), AuthError> {
        let claims = self.jwt_service.validate_token(refresh_token)?;
        let expires_at = DateTime::from_timestamp(claims.exp as i64, 0).ok_or(AuthError::InvalidToken)?;

        sqlx::query(
            "INSERT INTO refresh_tokens (id, user_id, token_hash, expires_at)
             VALUES ($1, $2, $3, $4)",
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(token_digest(refresh_token))
        .bind(expires_at)
        .execute(&self.db)
        .await?;

        Ok(())
    }

    async fn is_refresh_token_valid(&self, user_id: Uuid, refresh_token: &str) -> Result<bool, AuthError> {
        let result = sqlx::query(
            "SELECT 1 FROM refresh_tokens
             WHERE user_id = $1 AND token_hash = $2 AND expires_at > NOW() AND NOT revoked",
        )
        .bind(user_id)
        .bind(token_digest(refresh_token))
        .fetch_optional(&self.db)
        .await?;

        Ok(result.is_some())
    }

    async fn revoke_user_refresh_tokens(&self, user_id: Uuid) -> Result<(), AuthError> {
        sqlx::query("UPDATE refresh_tokens SET revoked = TRUE WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.db)
            .await?;

        Ok(())
    }

    async fn blacklist_token(&self, jti: &str, exp: i64) -> Result<(), AuthError> {
        let expires_at = DateTime::from_timestamp(exp, 0).ok_or(AuthError::InvalidToken)?;

        sqlx::query(
            "INSERT INTO token_blacklist (jti, expires_at) VALUES ($1, $2)
             ON CONFLICT (jti) DO NOTHING",
        )
        .bind(jti)
        .bind(expires_at)
        .execute(&self.db)
        .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_digest_is_stable_hex() {
        let digest = token_digest("some.refresh.token");
        assert_eq!(digest.len(), 32);
        assert_eq!(digest, token_digest("some.refresh.token"));
        assert_ne!(digest, token_digest("other.refresh.token"));
    }
}
