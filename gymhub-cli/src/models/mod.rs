//! Response shapes the CLI reads from the GymHub API. Fields the CLI
//! never shows are left out; serde skips them.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserInfo {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    pub user_type: String,
}

impl UserInfo {
    pub fn display_name(&self) -> String {
        let full = format!("{} {}", self.first_name, self.last_name);
        match full.trim() {
            "" => self.username.clone(),
            name => name.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Clone, Serialize)]
pub struct SignupRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub password_confirm: String,
    pub user_type: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub first_name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub last_name: String,
}

#[derive(Debug, Deserialize)]
pub struct AuthResponse {
    pub user: UserInfo,
    pub access: String,
    pub refresh: String,
}

#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Gym {
    pub id: Uuid,
    pub name: String,
    pub address: String,
    pub phone: String,
    #[serde(default)]
    pub member_count: i64,
    #[serde(default)]
    pub owner_name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Plan {
    pub id: Uuid,
    pub gym_id: Uuid,
    pub duration_months: i32,
    pub price: f64,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Membership {
    pub id: Uuid,
    pub gym_id: Uuid,
    pub gym_name: String,
    pub member_name: String,
    pub status: String,
    pub effective_status: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub days_remaining: Option<i64>,
    pub plan_details: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AttendanceRecord {
    pub id: Uuid,
    pub date: NaiveDate,
    pub check_in_time: DateTime<Utc>,
    pub streak_count: i32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MarkAttendanceResponse {
    pub message: String,
    pub attendance: AttendanceRecord,
    pub current_streak: i32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AttendanceStats {
    pub total_attendance: i64,
    pub current_streak: i32,
    pub longest_streak: i32,
    pub attendance_percentage: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LeaderboardEntry {
    pub rank: usize,
    pub member_name: String,
    pub username: String,
    pub total_attendance: i64,
    pub current_streak: i32,
    pub longest_streak: i32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Notice {
    pub id: Uuid,
    pub gym_name: String,
    pub title: String,
    pub message: String,
    pub created_at_formatted: String,
}
