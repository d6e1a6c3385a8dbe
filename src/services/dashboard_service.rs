use chrono::{NaiveDate, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::{UserSession, UserType};
use crate::error::AppResult;
use crate::models::{
    current_streak, AdminDashboard, DashboardStats, GymStatusCounts, MemberDashboard,
    MembershipStatus, OwnerDashboard, RecentWorkout, UserTypeCounts,
};
use crate::services::{MembershipService, NoticeService, UserService};

const RECENT_WORKOUTS: i64 = 5;
const RECENT_NOTICES: i64 = 5;

pub struct DashboardService {
    db: PgPool,
}

impl DashboardService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub async fn stats(&self, session: &UserSession) -> AppResult<DashboardStats> {
        let stats = match session.user_type {
            UserType::Member => DashboardStats::Member(self.member_stats(session).await?),
            UserType::GymOwner => DashboardStats::GymOwner(self.owner_stats(session.user_id).await?),
            UserType::Admin => DashboardStats::Admin(self.admin_stats().await?),
        };
        Ok(stats)
    }

    async fn member_stats(&self, session: &UserSession) -> AppResult<MemberDashboard> {
        let today = Utc::now().date_naive();

        let active_memberships: Vec<_> = MembershipService::new(self.db.clone())
            .list_memberships(session, Some(MembershipStatus::Approved))
            .await?
            .into_iter()
            .filter(|m| m.effective_status == MembershipStatus::Approved.as_str())
            .collect();

        // Latest record per gym; the best live streak wins.
        let latest_per_gym: Vec<(NaiveDate, i32)> = sqlx::query_as(
            "SELECT DISTINCT ON (gym_id) date, streak_count
             FROM attendance
             WHERE member_id = $1
             ORDER BY gym_id, date DESC",
        )
        .bind(session.user_id)
        .fetch_all(&self.db)
        .await?;

        let current = latest_per_gym
            .into_iter()
            .map(|latest| current_streak(Some(latest), today))
            .max()
            .unwrap_or(0);

        let longest: Option<i32> =
            sqlx::query_scalar("SELECT MAX(streak_count) FROM attendance WHERE member_id = $1")
                .bind(session.user_id)
                .fetch_one(&self.db)
                .await?;

        let (total_workouts, total_calories): (i64, i64) = sqlx::query_as(
            "SELECT COUNT(*), COALESCE(SUM(calories_burned), 0)::BIGINT
             FROM exercise_entries WHERE member_id = $1",
        )
        .bind(session.user_id)
        .fetch_one(&self.db)
        .await?;

        let recent_workouts = sqlx::query_as::<_, RecentWorkout>(
            "SELECT id, exercise_name, date, calories_burned, duration_minutes
             FROM exercise_entries
             WHERE member_id = $1
             ORDER BY date DESC, created_at DESC
             LIMIT $2",
        )
        .bind(session.user_id)
        .bind(RECENT_WORKOUTS)
        .fetch_all(&self.db)
        .await?;

        Ok(MemberDashboard {
            not_enrolled: active_memberships.is_empty(),
            current_streak: current,
            longest_streak: longest.unwrap_or(0),
            total_workouts,
            total_calories,
            recent_workouts,
            active_memberships,
        })
    }

    async fn gym_status_counts(&self, owner_id: Option<Uuid>) -> AppResult<GymStatusCounts> {
        let counts = sqlx::query_as::<_, GymStatusCounts>(
            "SELECT COUNT(*) FILTER (WHERE status = 'pending') AS pending,
                    COUNT(*) FILTER (WHERE status = 'approved') AS approved,
                    COUNT(*) FILTER (WHERE status = 'rejected') AS rejected
             FROM gyms
             WHERE $1::uuid IS NULL OR owner_id = $1",
        )
        .bind(owner_id)
        .fetch_one(&self.db)
        .await?;

        Ok(counts)
    }

    async fn owner_stats(&self, owner_id: Uuid) -> AppResult<OwnerDashboard> {
        let today = Utc::now().date_naive();
        let gyms = self.gym_status_counts(Some(owner_id)).await?;

        let (active_members, pending_requests): (i64, i64) = sqlx::query_as(
            "SELECT COUNT(DISTINCT m.member_id) FILTER (
                        WHERE m.status = 'approved' AND (m.end_date IS NULL OR m.end_date >= $2)),
                    COUNT(*) FILTER (WHERE m.status = 'pending')
             FROM memberships m
             JOIN gyms g ON g.id = m.gym_id
             WHERE g.owner_id = $1",
        )
        .bind(owner_id)
        .bind(today)
        .fetch_one(&self.db)
        .await?;

        let today_check_ins: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM attendance a
             JOIN gyms g ON g.id = a.gym_id
             WHERE g.owner_id = $1 AND a.date = $2",
        )
        .bind(owner_id)
        .bind(today)
        .fetch_one(&self.db)
        .await?;

        let recent_notices = NoticeService::new(self.db.clone())
            .recent_for_owner(owner_id, RECENT_NOTICES)
            .await?;

        Ok(OwnerDashboard {
            gyms,
            active_members,
            pending_requests,
            today_check_ins,
            recent_notices,
        })
    }

    async fn admin_stats(&self) -> AppResult<AdminDashboard> {
        let users = UserService::new(self.db.clone());
        let user_counts = UserTypeCounts {
            admins: users.count_by_type(UserType::Admin).await?,
            gym_owners: users.count_by_type(UserType::GymOwner).await?,
            members: users.count_by_type(UserType::Member).await?,
        };

        let active_memberships: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM memberships
             WHERE status = 'approved' AND (end_date IS NULL OR end_date >= $1)",
        )
        .bind(Utc::now().date_naive())
        .fetch_one(&self.db)
        .await?;

        Ok(AdminDashboard {
            users: user_counts,
            gyms: self.gym_status_counts(None).await?,
            active_memberships,
            generated_at: Utc::now(),
        })
    }
}
