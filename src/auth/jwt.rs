use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use crate::auth::{AuthError, Claims, TokenType, UserSession, UserType};

/// JWT token service for creating and validating tokens
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_token_expires_in: Duration,
    refresh_token_expires_in: Duration,
}

impl std::fmt::Debug for JwtService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtService")
            .field("encoding_key", &"[REDACTED]")
            .field("decoding_key", &"[REDACTED]")
            .field("access_token_expires_in", &self.access_token_expires_in)
            .field("refresh_token_expires_in", &self.refresh_token_expires_in)
            .finish()
    }
}

impl JwtService {
    /// Create a JWT service with the default lifetimes (15 minutes / 30 days)
    pub fn new(secret: &str) -> Self {
        Self::with_lifetimes(secret, Duration::minutes(15), Duration::days(30))
    }

    pub fn with_lifetimes(secret: &str, access: Duration, refresh: Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            access_token_expires_in: access,
            refresh_token_expires_in: refresh,
        }
    }

    fn create_token(
        &self,
        user_id: Uuid,
        username: &str,
        user_type: UserType,
        token_type: TokenType,
    ) -> Result<String, AuthError> {
        let now = Utc::now();
        let lifetime = match token_type {
            TokenType::Access => self.access_token_expires_in,
            TokenType::Refresh => self.refresh_token_expires_in,
        };

        let claims = Claims {
            sub: user_id.to_string(),
            username: username.to_string(),
            user_type,
            token_type,
            exp: (now + lifetime).timestamp() as usize,
            iat: now.timestamp() as usize,
            jti: Uuid::new_v4().to_string(),
        };

        encode(&Header::default(), &claims, &self.encoding_key).map_err(AuthError::Jwt)
    }

    pub fn create_access_token(
        &self,
        user_id: Uuid,
        username: &str,
        user_type: UserType,
    ) -> Result<String, AuthError> {
        self.create_token(user_id, username, user_type, TokenType::Access)
    }

    pub fn create_refresh_token(
        &self,
        user_id: Uuid,
        username: &str,
        user_type: UserType,
    ) -> Result<String, AuthError> {
        self.create_token(user_id, username, user_type, TokenType::Refresh)
    }

    /// Create token pair (access + refresh)
    pub fn create_token_pair(
        &self,
        user_id: Uuid,
        username: &str,
        user_type: UserType,
    ) -> Result<(String, String), AuthError> {
        let access = self.create_access_token(user_id, username, user_type)?;
        let refresh = self.create_refresh_token(user_id, username, user_type)?;
        Ok((access, refresh))
    }

    /// Validate signature and expiry, returning the decoded claims
    pub fn validate_token(&self, token: &str) -> Result<Claims, AuthError> {
        let validation = Validation::new(Algorithm::HS256);

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|token_data| token_data.claims)
            .map_err(|err| match err.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                _ => AuthError::InvalidToken,
            })
    }

    /// Validate a token and require it to be of the given type
    pub fn validate_typed(&self, token: &str, expected: TokenType) -> Result<Claims, AuthError> {
        let claims = self.validate_token(token)?;
        if claims.token_type != expected {
            return Err(AuthError::InvalidToken);
        }
        Ok(claims)
    }

    /// Extract user session from an access token
    pub fn extract_user_session(&self, token: &str) -> Result<UserSession, AuthError> {
        let claims = self.validate_typed(token, TokenType::Access)?;
        UserSession::from_claims(&claims).map_err(|_| AuthError::InvalidToken)
    }

    pub fn access_token_expires_in_seconds(&self) -> usize {
        self.access_token_expires_in.num_seconds() as usize
    }
}

/// Extract bearer token from authorization header
pub fn extract_bearer_token(auth_header: &str) -> Result<&str, AuthError> {
    match auth_header.strip_prefix("Bearer ") {
        Some(token) if !token.trim().is_empty() => Ok(token.trim()),
        _ => Err(AuthError::InvalidAuthHeaderFormat),
    }
}
