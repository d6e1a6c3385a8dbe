use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "experience_level", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ExperienceLevel {
    Beginner,
    Intermediate,
    Advanced,
}

impl ExperienceLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExperienceLevel::Beginner => "beginner",
            ExperienceLevel::Intermediate => "intermediate",
            ExperienceLevel::Advanced => "advanced",
        }
    }

    /// Catalog levels are capitalised ("Beginner"); compare case-insensitively
    pub fn matches(&self, catalog_level: &str) -> bool {
        self.as_str().eq_ignore_ascii_case(catalog_level)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    #[default]
    Male,
    Female,
}

/// Catalog entry
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Exercise {
    pub title: &'static str,
    pub exercise_type: &'static str,
    pub body_part: &'static str,
    pub equipment: &'static str,
    pub level: &'static str,
    pub rating: f64,
    pub description: &'static str,
}

/// Profile as submitted; missing fields fall back to defaults
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UserProfile {
    #[validate(range(min = 1, max = 120))]
    pub age: Option<i32>,
    #[validate(range(min = 1.0, max = 500.0))]
    pub weight: Option<f64>,
    #[validate(range(min = 50.0, max = 300.0))]
    pub height: Option<f64>,
    pub gender: Option<Gender>,
    pub experience_level: Option<ExperienceLevel>,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct ResolvedProfile {
    pub age: i32,
    pub weight: f64,
    pub height: f64,
    pub gender: Gender,
    pub experience_level: ExperienceLevel,
}

impl UserProfile {
    pub fn resolve(&self) -> ResolvedProfile {
        ResolvedProfile {
            age: self.age.unwrap_or(25),
            weight: self.weight.unwrap_or(70.0),
            height: self.height.unwrap_or(170.0),
            gender: self.gender.unwrap_or_default(),
            experience_level: self.experience_level.unwrap_or(ExperienceLevel::Beginner),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Recommendation {
    pub name: String,
    #[serde(rename = "type")]
    pub exercise_type: String,
    pub equipment: String,
    pub level: String,
    pub body_part: String,
    pub calories_burned: i32,
    pub duration: i32,
    pub description: String,
    pub instructions: String,
    pub similarity_score: f64,
    pub rating: f64,
    pub recommended_for: String,
    pub difficulty: String,
    pub target_muscles: String,
    pub benefits: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExerciseSummary {
    pub name: String,
    #[serde(rename = "type")]
    pub exercise_type: String,
    pub equipment: String,
    pub level: String,
    pub body_part: String,
    pub calories_burned: i32,
    pub duration: i32,
    pub description: String,
    pub rating: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimilarExercise {
    pub name: String,
    #[serde(rename = "type")]
    pub exercise_type: String,
    pub equipment: String,
    pub level: String,
    pub body_part: String,
    pub description: String,
    pub rating: f64,
    pub similarity_score: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExerciseCategories {
    pub types: Vec<String>,
    pub body_parts: Vec<String>,
    pub equipment: Vec<String>,
    pub levels: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExerciseFilter {
    #[serde(rename = "type")]
    pub exercise_type: Option<String>,
    pub body_part: Option<String>,
    pub equipment: Option<String>,
    pub level: Option<String>,
    pub min_rating: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RecommendationRequest {
    #[serde(flatten)]
    pub profile: UserProfile,
    pub num_recommendations: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SimilarRequest {
    pub exercise_name: String,
    pub num_recommendations: Option<usize>,
}

/// Stored result of a routine generation
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ExerciseRoutine {
    pub id: Uuid,
    pub user_id: Uuid,
    pub age: i32,
    pub weight_kg: f64,
    pub height_cm: f64,
    pub experience_level: ExperienceLevel,
    pub routine_data: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct GenerateRoutineRequest {
    #[validate(range(min = 13, max = 100, message = "Age must be between 13 and 100"))]
    pub age: i32,
    #[validate(range(min = 1.0, max = 500.0))]
    pub weight_kg: f64,
    #[validate(range(min = 50.0, max = 300.0))]
    pub height_cm: f64,
    pub experience_level: ExperienceLevel,
    pub gender: Option<Gender>,
    pub num_exercises: Option<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_defaults() {
        let resolved = UserProfile::default().resolve();
        assert_eq!(resolved.age, 25);
        assert_eq!(resolved.weight, 70.0);
        assert_eq!(resolved.height, 170.0);
        assert_eq!(resolved.gender, Gender::Male);
        assert_eq!(resolved.experience_level, ExperienceLevel::Beginner);
    }

    #[test]
    fn test_level_matching_ignores_case() {
        assert!(ExperienceLevel::Intermediate.matches("Intermediate"));
        assert!(!ExperienceLevel::Beginner.matches("Advanced"));
    }

    #[test]
    fn test_routine_age_bounds() {
        let request = GenerateRoutineRequest {
            age: 12,
            weight_kg: 45.0,
            height_cm: 150.0,
            experience_level: ExperienceLevel::Beginner,
            gender: None,
            num_exercises: None,
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_recommendation_request_accepts_flat_profile() {
        let request: RecommendationRequest = serde_json::from_value(serde_json::json!({
            "age": 40,
            "gender": "female",
            "experience_level": "advanced",
            "num_recommendations": 3
        }))
        .unwrap();
        assert_eq!(request.profile.age, Some(40));
        assert_eq!(request.profile.gender, Some(Gender::Female));
        assert_eq!(request.num_recommendations, Some(3));
    }
}
