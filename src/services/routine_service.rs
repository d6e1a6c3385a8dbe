use std::sync::Arc;

use chrono::Utc;
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::models::{ExerciseRoutine, GenerateRoutineRequest, UserProfile};
use crate::services::recommendation_service::{ExerciseRecommender, DEFAULT_RECOMMENDATIONS};

const ROUTINE_COLUMNS: &str =
    "id, user_id, age, weight_kg, height_cm, experience_level, routine_data, created_at, updated_at";
const MAX_ROUTINE_EXERCISES: usize = 20;

/// Generates and stores exercise routines built from recommendations
pub struct RoutineService {
    db: PgPool,
    recommender: Arc<ExerciseRecommender>,
}

impl RoutineService {
    pub fn new(db: PgPool, recommender: Arc<ExerciseRecommender>) -> Self {
        Self { db, recommender }
    }

    pub async fn generate_routine(
        &self,
        user_id: Uuid,
        request: GenerateRoutineRequest,
    ) -> AppResult<ExerciseRoutine> {
        request.validate()?;
        let count = request.num_exercises.unwrap_or(DEFAULT_RECOMMENDATIONS);
        if count == 0 || count > MAX_ROUTINE_EXERCISES {
            return Err(AppError::Validation(format!(
                "num_exercises must be between 1 and {}",
                MAX_ROUTINE_EXERCISES
            )));
        }

        let profile = UserProfile {
            age: Some(request.age),
            weight: Some(request.weight_kg),
            height: Some(request.height_cm),
            gender: request.gender,
            experience_level: Some(request.experience_level),
        };
        let exercises = self.recommender.recommend(&profile, count);

        let routine_data = json!({
            "profile": profile.resolve(),
            "total_duration": exercises.iter().map(|e| e.duration).sum::<i32>(),
            "total_calories": exercises.iter().map(|e| e.calories_burned).sum::<i32>(),
            "exercises": exercises,
        });

        let now = Utc::now();
        let routine = sqlx::query_as::<_, ExerciseRoutine>(&format!(
            "INSERT INTO exercise_routines (id, user_id, age, weight_kg, height_cm,
                                            experience_level, routine_data, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $8)
             RETURNING {}",
            ROUTINE_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(request.age)
        .bind(request.weight_kg)
        .bind(request.height_cm)
        .bind(request.experience_level)
        .bind(&routine_data)
        .bind(now)
        .fetch_one(&self.db)
        .await?;

        tracing::info!(routine_id = %routine.id, user_id = %user_id, exercises = count, "routine generated");
        Ok(routine)
    }

    /// The user's saved routines, newest first
    pub async fn list_routines(&self, user_id: Uuid) -> AppResult<Vec<ExerciseRoutine>> {
        let routines = sqlx::query_as::<_, ExerciseRoutine>(&format!(
            "SELECT {} FROM exercise_routines WHERE user_id = $1 ORDER BY created_at DESC",
            ROUTINE_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(&self.db)
        .await?;

        Ok(routines)
    }
}
