use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::membership::MembershipView;
use crate::models::notice::NoticeView;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct RecentWorkout {
    pub id: Uuid,
    pub exercise_name: String,
    pub date: NaiveDate,
    pub calories_burned: i32,
    pub duration_minutes: i32,
}

#[derive(Debug, Clone, Serialize)]
pub struct MemberDashboard {
    pub not_enrolled: bool,
    pub current_streak: i32,
    pub longest_streak: i32,
    pub total_workouts: i64,
    pub total_calories: i64,
    pub recent_workouts: Vec<RecentWorkout>,
    pub active_memberships: Vec<MembershipView>,
}

#[derive(Debug, Clone, Default, Serialize, FromRow)]
pub struct GymStatusCounts {
    pub pending: i64,
    pub approved: i64,
    pub rejected: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct OwnerDashboard {
    pub gyms: GymStatusCounts,
    pub active_members: i64,
    pub pending_requests: i64,
    pub today_check_ins: i64,
    pub recent_notices: Vec<NoticeView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct UserTypeCounts {
    pub admins: i64,
    pub gym_owners: i64,
    pub members: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct AdminDashboard {
    pub users: UserTypeCounts,
    pub gyms: GymStatusCounts,
    pub active_memberships: i64,
    pub generated_at: DateTime<Utc>,
}

/// Dashboard payload, shaped by the caller's account type
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum DashboardStats {
    Member(MemberDashboard),
    GymOwner(OwnerDashboard),
    Admin(AdminDashboard),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dashboard_is_tagged_by_role() {
        let stats = DashboardStats::Member(MemberDashboard {
            not_enrolled: true,
            current_streak: 0,
            longest_streak: 0,
            total_workouts: 0,
            total_calories: 0,
            recent_workouts: vec![],
            active_memberships: vec![],
        });

        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["role"], "member");
        assert_eq!(json["not_enrolled"], true);
    }
}
