use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};

use super::AppState;
use crate::auth::{
    AuthError, AuthResponse, AuthService, ChangePasswordRequest, LoginRequest, LogoutRequest,
    MessageResponse, RefreshTokenRequest, SignupRequest, TokenResponse, UpdateProfileRequest,
    UserSession,
};
use crate::models::UserInfo;

/// Sign-in routes that do not need a token; rate limited by the caller
pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/api/auth/signup", post(signup))
        .route("/api/auth/login", post(login))
        .route("/api/auth/refresh", post(refresh_token))
}

pub fn protected_routes() -> Router<AppState> {
    Router::new()
        .route("/api/auth/logout", post(logout))
        .route("/api/auth/change-password", post(change_password))
        .route("/api/auth/profile", get(get_profile).put(update_profile))
}

/// Register a member or gym owner
#[tracing::instrument(skip(auth_service, request), fields(username = %request.username))]
async fn signup(
    State(auth_service): State<AuthService>,
    Json(request): Json<SignupRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), AuthError> {
    let response = auth_service.signup(request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

#[tracing::instrument(skip(auth_service, request), fields(username = %request.username))]
async fn login(
    State(auth_service): State<AuthService>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, AuthError> {
    let response = auth_service.login(request).await?;
    Ok(Json(response))
}

/// Exchange a refresh token for a new access token
#[tracing::instrument(skip(auth_service, request))]
async fn refresh_token(
    State(auth_service): State<AuthService>,
    Json(request): Json<RefreshTokenRequest>,
) -> Result<Json<TokenResponse>, AuthError> {
    let response = auth_service.refresh_token(request).await?;
    Ok(Json(response))
}

#[tracing::instrument(skip(auth_service, session, body), fields(user_id = %session.user_id))]
async fn logout(
    State(auth_service): State<AuthService>,
    session: UserSession,
    body: Option<Json<LogoutRequest>>,
) -> Result<Json<MessageResponse>, AuthError> {
    let refresh = body.and_then(|Json(request)| request.refresh);
    let response = auth_service.logout(&session, refresh.as_deref()).await?;
    Ok(Json(response))
}

#[tracing::instrument(skip(auth_service, session), fields(user_id = %session.user_id))]
async fn get_profile(
    State(auth_service): State<AuthService>,
    session: UserSession,
) -> Result<Json<UserInfo>, AuthError> {
    let user = auth_service.profile(session.user_id).await?;
    Ok(Json(user))
}

#[tracing::instrument(skip(auth_service, session, request), fields(user_id = %session.user_id))]
async fn update_profile(
    State(auth_service): State<AuthService>,
    session: UserSession,
    Json(request): Json<UpdateProfileRequest>,
) -> Result<Json<UserInfo>, AuthError> {
    let user = auth_service.update_profile(session.user_id, request).await?;
    Ok(Json(user))
}

#[tracing::instrument(skip(auth_service, session, request), fields(user_id = %session.user_id))]
async fn change_password(
    State(auth_service): State<AuthService>,
    session: UserSession,
    Json(request): Json<ChangePasswordRequest>,
) -> Result<Json<MessageResponse>, AuthError> {
    let response = auth_service.change_password(session.user_id, request).await?;
    Ok(Json(response))
}
