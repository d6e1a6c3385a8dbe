use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::get,
    Router,
};
use uuid::Uuid;

use super::AppState;
use crate::auth::UserSession;
use crate::error::AppResult;
use crate::models::{
    CreateExerciseEntryRequest, ExerciseEntry, ExerciseEntryQuery, UpdateExerciseEntryRequest,
};
use crate::services::ExerciseEntryService;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/exercise-entries", get(list_entries).post(create_entry))
        .route(
            "/api/exercise-entries/:id",
            get(get_entry).put(update_entry).delete(delete_entry),
        )
}

#[tracing::instrument(skip(state, session), fields(user_id = %session.user_id))]
async fn list_entries(
    State(state): State<AppState>,
    session: UserSession,
    Query(query): Query<ExerciseEntryQuery>,
) -> AppResult<Json<Vec<ExerciseEntry>>> {
    let entries = ExerciseEntryService::new(state.db).list(&session, &query).await?;
    Ok(Json(entries))
}

#[tracing::instrument(skip(state, session, request), fields(user_id = %session.user_id))]
async fn create_entry(
    State(state): State<AppState>,
    session: UserSession,
    Json(request): Json<CreateExerciseEntryRequest>,
) -> AppResult<(StatusCode, Json<ExerciseEntry>)> {
    let entry = ExerciseEntryService::new(state.db).create(&session, request).await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

#[tracing::instrument(skip(state, session), fields(user_id = %session.user_id))]
async fn get_entry(
    State(state): State<AppState>,
    session: UserSession,
    Path(entry_id): Path<Uuid>,
) -> AppResult<Json<ExerciseEntry>> {
    let entry = ExerciseEntryService::new(state.db).get(entry_id, &session).await?;
    Ok(Json(entry))
}

#[tracing::instrument(skip(state, session, request), fields(user_id = %session.user_id))]
async fn update_entry(
    State(state): State<AppState>,
    session: UserSession,
    Path(entry_id): Path<Uuid>,
    Json(request): Json<UpdateExerciseEntryRequest>,
) -> AppResult<Json<ExerciseEntry>> {
    let entry = ExerciseEntryService::new(state.db)
        .update(entry_id, &session, request)
        .await?;
    Ok(Json(entry))
}

#[tracing::instrument(skip(state, session), fields(user_id = %session.user_id))]
async fn delete_entry(
    State(state): State<AppState>,
    session: UserSession,
    Path(entry_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    ExerciseEntryService::new(state.db).delete(entry_id, &session).await?;
    Ok(StatusCode::NO_CONTENT)
}
