use axum::{extract::State, http::StatusCode, response::Json, routing::get, Router};

use super::AppState;
use crate::auth::UserSession;
use crate::error::AppResult;
use crate::models::{ExerciseRoutine, GenerateRoutineRequest};
use crate::services::RoutineService;

pub fn routes() -> Router<AppState> {
    Router::new().route("/api/routines", get(list_routines).post(generate_routine))
}

#[tracing::instrument(skip(state, session), fields(user_id = %session.user_id))]
async fn list_routines(
    State(state): State<AppState>,
    session: UserSession,
) -> AppResult<Json<Vec<ExerciseRoutine>>> {
    let routines = RoutineService::new(state.db, state.recommender)
        .list_routines(session.user_id)
        .await?;
    Ok(Json(routines))
}

#[tracing::instrument(skip(state, session, request), fields(user_id = %session.user_id))]
async fn generate_routine(
    State(state): State<AppState>,
    session: UserSession,
    Json(request): Json<GenerateRoutineRequest>,
) -> AppResult<(StatusCode, Json<ExerciseRoutine>)> {
    let routine = RoutineService::new(state.db, state.recommender)
        .generate_routine(session.user_id, request)
        .await?;
    Ok((StatusCode::CREATED, Json(routine)))
}
