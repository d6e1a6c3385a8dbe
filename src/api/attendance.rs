use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use uuid::Uuid;

use super::AppState;
use crate::auth::UserSession;
use crate::error::AppResult;
use crate::models::{
    AttendanceAnalytics, AttendanceRecord, AttendanceStats, CheckTodayResponse, LeaderboardEntry,
    MarkAttendanceResponse,
};
use crate::services::AttendanceService;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/gyms/:id/attendance/mark", post(mark_attendance))
        .route("/api/gyms/:id/attendance/check-today", get(check_today))
        .route("/api/gyms/:id/attendance/stats", get(attendance_stats))
        .route("/api/gyms/:id/attendance/history", get(attendance_history))
        .route("/api/gyms/:id/attendance/leaderboard", get(leaderboard))
        .route("/api/gyms/:id/attendance/analytics", get(analytics))
        .route("/api/gyms/:id/attendance/recalculate", post(recalculate))
}

/// Check in for today
#[tracing::instrument(skip(state, session), fields(user_id = %session.user_id))]
async fn mark_attendance(
    State(state): State<AppState>,
    session: UserSession,
    Path(gym_id): Path<Uuid>,
) -> AppResult<(StatusCode, Json<MarkAttendanceResponse>)> {
    let response = AttendanceService::new(state.db).mark(&session, gym_id).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

#[tracing::instrument(skip(state, session), fields(user_id = %session.user_id))]
async fn check_today(
    State(state): State<AppState>,
    session: UserSession,
    Path(gym_id): Path<Uuid>,
) -> AppResult<Json<CheckTodayResponse>> {
    let response = AttendanceService::new(state.db)
        .check_today(&session, gym_id)
        .await?;
    Ok(Json(response))
}

#[tracing::instrument(skip(state, session), fields(user_id = %session.user_id))]
async fn attendance_stats(
    State(state): State<AppState>,
    session: UserSession,
    Path(gym_id): Path<Uuid>,
) -> AppResult<Json<AttendanceStats>> {
    let stats = AttendanceService::new(state.db).stats(&session, gym_id).await?;
    Ok(Json(stats))
}

#[tracing::instrument(skip(state, session), fields(user_id = %session.user_id))]
async fn attendance_history(
    State(state): State<AppState>,
    session: UserSession,
    Path(gym_id): Path<Uuid>,
) -> AppResult<Json<Vec<AttendanceRecord>>> {
    let records = AttendanceService::new(state.db).history(&session, gym_id).await?;
    Ok(Json(records))
}

#[tracing::instrument(skip(state, session))]
async fn leaderboard(
    State(state): State<AppState>,
    session: UserSession,
    Path(gym_id): Path<Uuid>,
) -> AppResult<Json<Vec<LeaderboardEntry>>> {
    let board = AttendanceService::new(state.db)
        .leaderboard(&session, gym_id)
        .await?;
    Ok(Json(board))
}

/// Owner view of a gym's attendance
#[tracing::instrument(skip(state, session))]
async fn analytics(
    State(state): State<AppState>,
    session: UserSession,
    Path(gym_id): Path<Uuid>,
) -> AppResult<Json<AttendanceAnalytics>> {
    let analytics = AttendanceService::new(state.db).analytics(&session, gym_id).await?;
    Ok(Json(analytics))
}

#[tracing::instrument(skip(state, session))]
async fn recalculate(
    State(state): State<AppState>,
    session: UserSession,
    Path(gym_id): Path<Uuid>,
) -> AppResult<Json<Value>> {
    let updated = AttendanceService::new(state.db)
        .recalculate_gym(&session, gym_id)
        .await?;
    Ok(Json(json!({
        "message": "Streaks recalculated",
        "updated_records": updated,
    })))
}
