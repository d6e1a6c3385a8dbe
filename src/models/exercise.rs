use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ExerciseEntry {
    pub id: Uuid,
    pub member_id: Uuid,
    pub exercise_name: String,
    pub exercise_type: Option<String>,
    pub body_part: Option<String>,
    pub duration_minutes: i32,
    pub calories_burned: i32,
    pub sets: Option<i32>,
    pub reps: Option<i32>,
    pub weight_kg: Option<f64>,
    pub notes: Option<String>,
    pub date: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub const ENTRY_COLUMNS: &str = "id, member_id, exercise_name, exercise_type, body_part, \
     duration_minutes, calories_burned, sets, reps, weight_kg, notes, date, created_at, updated_at";

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateExerciseEntryRequest {
    #[validate(length(min = 1, max = 200, message = "Exercise name is required"))]
    pub exercise_name: String,
    #[validate(length(max = 50))]
    pub exercise_type: Option<String>,
    #[validate(length(max = 50))]
    pub body_part: Option<String>,
    #[serde(default)]
    #[validate(range(min = 0, max = 1440))]
    pub duration_minutes: i32,
    #[serde(default)]
    #[validate(range(min = 0))]
    pub calories_burned: i32,
    #[validate(range(min = 0))]
    pub sets: Option<i32>,
    #[validate(range(min = 0))]
    pub reps: Option<i32>,
    #[validate(range(min = 0.0))]
    pub weight_kg: Option<f64>,
    pub notes: Option<String>,
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateExerciseEntryRequest {
    #[validate(length(min = 1, max = 200))]
    pub exercise_name: Option<String>,
    #[validate(length(max = 50))]
    pub exercise_type: Option<String>,
    #[validate(length(max = 50))]
    pub body_part: Option<String>,
    #[validate(range(min = 0, max = 1440))]
    pub duration_minutes: Option<i32>,
    #[validate(range(min = 0))]
    pub calories_burned: Option<i32>,
    #[validate(range(min = 0))]
    pub sets: Option<i32>,
    #[validate(range(min = 0))]
    pub reps: Option<i32>,
    #[validate(range(min = 0.0))]
    pub weight_kg: Option<f64>,
    pub notes: Option<String>,
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ExerciseEntryQuery {
    /// Gym owners only: restrict to one member of their gyms
    pub member_id: Option<Uuid>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub limit: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_negative_values_rejected() {
        let request: CreateExerciseEntryRequest = serde_json::from_value(serde_json::json!({
            "exercise_name": "Squat",
            "duration_minutes": -5,
            "calories_burned": 120
        }))
        .unwrap();
        let errors = request.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("duration_minutes"));
    }

    #[test]
    fn test_defaults_applied() {
        let request: CreateExerciseEntryRequest =
            serde_json::from_value(serde_json::json!({ "exercise_name": "Plank" })).unwrap();
        assert!(request.validate().is_ok());
        assert_eq!(request.duration_minutes, 0);
        assert_eq!(request.calories_burned, 0);
        assert!(request.date.is_none());
    }
}
