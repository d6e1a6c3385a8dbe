use axum::{extract::State, response::Json, routing::get, Router};

use super::AppState;
use crate::auth::UserSession;
use crate::error::AppResult;
use crate::models::DashboardStats;
use crate::services::DashboardService;

pub fn routes() -> Router<AppState> {
    Router::new().route("/api/dashboard/stats", get(dashboard_stats))
}

/// Role-specific dashboard numbers
#[tracing::instrument(skip(state, session), fields(user_id = %session.user_id))]
async fn dashboard_stats(
    State(state): State<AppState>,
    session: UserSession,
) -> AppResult<Json<DashboardStats>> {
    let stats = DashboardService::new(state.db).stats(&session).await?;
    Ok(Json(stats))
}
