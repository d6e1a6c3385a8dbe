use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "gym_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum GymStatus {
    Pending,
    Approved,
    Rejected,
}

impl GymStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            GymStatus::Pending => "pending",
            GymStatus::Approved => "approved",
            GymStatus::Rejected => "rejected",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Gym {
    pub id: Uuid,
    pub name: String,
    pub address: String,
    pub phone: String,
    pub email: String,
    pub description: Option<String>,
    pub owner_id: Uuid,
    pub status: GymStatus,
    pub rejection_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub const GYM_COLUMNS: &str = "id, name, address, phone, email, description, owner_id, status, \
     rejection_reason, created_at, updated_at";

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateGymRequest {
    #[validate(length(min = 1, max = 200, message = "Gym name must be 1-200 characters"))]
    pub name: String,
    #[validate(length(min = 1, message = "Address is required"))]
    pub address: String,
    #[validate(length(min = 1, max = 20))]
    pub phone: String,
    #[validate(
        email(message = "Enter a valid email address"),
        length(max = 255, message = "Email must be at most 255 characters")
    )]
    pub email: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateGymRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    #[validate(length(min = 1))]
    pub address: Option<String>,
    #[validate(length(min = 1, max = 20))]
    pub phone: Option<String>,
    #[validate(
        email(message = "Enter a valid email address"),
        length(max = 255, message = "Email must be at most 255 characters")
    )]
    pub email: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct GymListQuery {
    pub city: Option<String>,
    pub search: Option<String>,
}

/// What registering a gym means for an owner, given the gym they already have
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationDecision {
    Create,
    Resubmit(Uuid),
    AlreadyRegistered,
}

pub fn decide_registration(existing: Option<&Gym>) -> RegistrationDecision {
    match existing {
        None => RegistrationDecision::Create,
        Some(gym) if gym.status == GymStatus::Rejected => RegistrationDecision::Resubmit(gym.id),
        Some(_) => RegistrationDecision::AlreadyRegistered,
    }
}

/// Approved gym as listed to prospective members
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct AvailableGym {
    pub id: Uuid,
    pub name: String,
    pub address: String,
    pub phone: String,
    pub email: String,
    pub description: Option<String>,
    pub member_count: i64,
    pub owner_name: String,
}

/// Active member of a gym with their activity totals
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct GymMemberSummary {
    pub membership_id: Uuid,
    pub member_id: Uuid,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub membership_start_date: Option<NaiveDate>,
    #[sqlx(default)]
    pub current_streak: i32,
    #[sqlx(default)]
    pub longest_streak: i32,
    pub attendance_count: i64,
    pub total_workouts: i64,
    pub total_calories: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct MyGymDetails {
    #[serde(flatten)]
    pub gym: Gym,
    pub total_members: i64,
    pub total_workouts: i64,
    pub total_calories: i64,
    pub members: Vec<GymMemberSummary>,
}

#[derive(Debug, Serialize)]
pub struct GymRegistrationResponse {
    pub message: String,
    pub gym: Gym,
    pub resubmitted: bool,
}
