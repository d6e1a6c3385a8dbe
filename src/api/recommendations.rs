use axum::{
    extract::State,
    response::Json,
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use validator::Validate;

use super::AppState;
use crate::auth::UserSession;
use crate::error::{AppError, AppResult};
use crate::models::{ExerciseCategories, ExerciseFilter, RecommendationRequest, SimilarRequest};
use crate::services::recommendation_service::DEFAULT_RECOMMENDATIONS;

const MAX_RECOMMENDATIONS: usize = 50;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/ml/recommendations", post(recommendations))
        .route("/api/ml/filter", post(filter_exercises))
        .route("/api/ml/similar", post(similar_exercises))
        .route("/api/ml/categories", get(categories))
        .route("/api/ml/health", get(ml_health))
}

fn requested_count(requested: Option<usize>) -> AppResult<usize> {
    let count = requested.unwrap_or(DEFAULT_RECOMMENDATIONS);
    if count == 0 || count > MAX_RECOMMENDATIONS {
        return Err(AppError::Validation(format!(
            "num_recommendations must be between 1 and {}",
            MAX_RECOMMENDATIONS
        )));
    }
    Ok(count)
}

/// Personalised exercise recommendations for a profile
#[tracing::instrument(skip(state, session), fields(user_id = %session.user_id))]
async fn recommendations(
    State(state): State<AppState>,
    session: UserSession,
    Json(request): Json<RecommendationRequest>,
) -> AppResult<Json<Value>> {
    request.profile.validate()?;
    let count = requested_count(request.num_recommendations)?;

    let recommendations = state.recommender.recommend(&request.profile, count);
    tracing::debug!(found = recommendations.len(), "Generated recommendations");

    Ok(Json(json!({
        "total_found": recommendations.len(),
        "recommendations": recommendations,
        "user_profile": request.profile.resolve(),
    })))
}

#[tracing::instrument(skip(state, _session))]
async fn filter_exercises(
    State(state): State<AppState>,
    _session: UserSession,
    Json(filter): Json<ExerciseFilter>,
) -> AppResult<Json<Value>> {
    let exercises = state.recommender.filter(&filter);
    Ok(Json(json!({
        "total_found": exercises.len(),
        "exercises": exercises,
        "filters_applied": filter,
    })))
}

#[tracing::instrument(skip(state, _session))]
async fn similar_exercises(
    State(state): State<AppState>,
    _session: UserSession,
    Json(request): Json<SimilarRequest>,
) -> AppResult<Json<Value>> {
    let name = request.exercise_name.trim();
    if name.is_empty() {
        return Err(AppError::Validation("exercise_name is required".to_string()));
    }
    let count = requested_count(request.num_recommendations)?;

    let similar = state.recommender.similar(name, count);
    Ok(Json(json!({
        "total_found": similar.len(),
        "similar_exercises": similar,
        "base_exercise": name,
    })))
}

async fn categories(
    State(state): State<AppState>,
    _session: UserSession,
) -> Json<ExerciseCategories> {
    Json(state.recommender.categories())
}

async fn ml_health(State(state): State<AppState>, _session: UserSession) -> Json<Value> {
    Json(json!({
        "status": if state.recommender.is_empty() { "degraded" } else { "healthy" },
        "total_exercises": state.recommender.len(),
        "service": "exercise-recommender",
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requested_count_bounds() {
        assert_eq!(requested_count(None).unwrap(), DEFAULT_RECOMMENDATIONS);
        assert_eq!(requested_count(Some(1)).unwrap(), 1);
        assert_eq!(requested_count(Some(50)).unwrap(), 50);
        assert!(matches!(requested_count(Some(0)), Err(AppError::Validation(_))));
        assert!(matches!(requested_count(Some(51)), Err(AppError::Validation(_))));
    }
}
