use axum::{
    extract::{Path, Query, State},
    response::Json,
    routing::{get, post},
    Router,
};
use uuid::Uuid;

use super::AppState;
use crate::auth::UserSession;
use crate::error::AppResult;
use crate::models::{AdminGymQuery, AdminGymView, ApprovalRequest, ApprovalResponse, ApprovalStats};
use crate::services::ApprovalService;

/// Gym review routes; the router layers admin-only access on top
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/admin/gyms", get(all_gyms))
        .route("/api/admin/gyms/pending", get(pending_gyms))
        .route("/api/admin/gyms/:id/approve", post(approve_gym))
        .route("/api/admin/gyms/:id/reject", post(reject_gym))
        .route("/api/admin/approval-stats", get(approval_stats))
}

#[tracing::instrument(skip(state))]
async fn pending_gyms(State(state): State<AppState>) -> AppResult<Json<Vec<AdminGymView>>> {
    let gyms = ApprovalService::new(state.db).pending_gyms().await?;
    Ok(Json(gyms))
}

#[tracing::instrument(skip(state))]
async fn all_gyms(
    State(state): State<AppState>,
    Query(query): Query<AdminGymQuery>,
) -> AppResult<Json<Vec<AdminGymView>>> {
    let gyms = ApprovalService::new(state.db).all_gyms(query.status).await?;
    Ok(Json(gyms))
}

#[tracing::instrument(skip(state, session, body), fields(admin_id = %session.user_id))]
async fn approve_gym(
    State(state): State<AppState>,
    session: UserSession,
    Path(gym_id): Path<Uuid>,
    body: Option<Json<ApprovalRequest>>,
) -> AppResult<Json<ApprovalResponse>> {
    let notes = body.and_then(|Json(request)| request.notes);
    let response = ApprovalService::new(state.db)
        .approve(gym_id, &session, notes)
        .await?;
    Ok(Json(response))
}

#[tracing::instrument(skip(state, session, body), fields(admin_id = %session.user_id))]
async fn reject_gym(
    State(state): State<AppState>,
    session: UserSession,
    Path(gym_id): Path<Uuid>,
    body: Option<Json<ApprovalRequest>>,
) -> AppResult<Json<ApprovalResponse>> {
    let notes = body.and_then(|Json(request)| request.notes);
    let response = ApprovalService::new(state.db)
        .reject(gym_id, &session, notes)
        .await?;
    Ok(Json(response))
}

#[tracing::instrument(skip(state))]
async fn approval_stats(State(state): State<AppState>) -> AppResult<Json<ApprovalStats>> {
    let stats = ApprovalService::new(state.db).approval_stats().await?;
    Ok(Json(stats))
}
