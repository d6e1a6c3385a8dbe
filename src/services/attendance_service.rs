use chrono::{NaiveDate, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::{UserSession, UserType};
use crate::error::{AppError, AppResult};
use crate::models::{
    attendance_percentage, current_streak, next_streak, rank_leaderboard, recalculate_streaks,
    AttendanceAnalytics, AttendanceRecord, AttendanceStats, CheckTodayResponse, Gym,
    LeaderboardEntry, MarkAttendanceResponse, MemberAttendanceRow, RecentAttendance,
    ATTENDANCE_COLUMNS,
};
use crate::services::{GymService, MembershipService};

const LEADERBOARD_SIZE: usize = 10;
const HISTORY_LIMIT: i64 = 30;
const RECENT_LIMIT: i64 = 20;
const AVERAGE_WINDOW_DAYS: i64 = 30;

/// Active members of a gym with their attendance aggregates
const MEMBER_ROWS_SELECT: &str = "
    SELECT DISTINCT ON (u.id)
           u.id AS member_id, u.username, u.first_name, u.last_name, m.start_date,
           (SELECT COUNT(*) FROM attendance a
             WHERE a.member_id = u.id AND a.gym_id = $1) AS total_attendance,
           (SELECT MAX(a.streak_count) FROM attendance a
             WHERE a.member_id = u.id AND a.gym_id = $1) AS longest_streak,
           latest.date AS latest_date,
           latest.streak_count AS latest_streak
    FROM memberships m
    JOIN users u ON u.id = m.member_id
    LEFT JOIN LATERAL (
        SELECT a.date, a.streak_count FROM attendance a
        WHERE a.member_id = u.id AND a.gym_id = $1
        ORDER BY a.date DESC
        LIMIT 1
    ) latest ON TRUE
    WHERE m.gym_id = $1 AND m.status = 'approved'
      AND (m.end_date IS NULL OR m.end_date >= $2)
    ORDER BY u.id, m.start_date DESC NULLS LAST";

pub struct AttendanceService {
    db: PgPool,
}

impl AttendanceService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    fn today() -> NaiveDate {
        Utc::now().date_naive()
    }

    async fn require_active_member(&self, session: &UserSession, gym_id: Uuid) -> AppResult<NaiveDate> {
        if session.user_type != UserType::Member {
            return Err(AppError::Forbidden(
                "Only members can use attendance tracking".to_string(),
            ));
        }

        let membership = MembershipService::new(self.db.clone())
            .in_force_membership(session.user_id, gym_id)
            .await?
            .ok_or_else(|| {
                AppError::Forbidden("You need an active membership at this gym".to_string())
            })?;

        Ok(membership.start_date.unwrap_or_else(Self::today))
    }

    /// Gym for owner-only views
    async fn require_gym_owner(&self, session: &UserSession, gym_id: Uuid) -> AppResult<Gym> {
        GymService::new(self.db.clone())
            .require_owned_gym(gym_id, session)
            .await
    }

    async fn latest_record(&self, member_id: Uuid, gym_id: Uuid) -> AppResult<Option<(NaiveDate, i32)>> {
        let latest: Option<(NaiveDate, i32)> = sqlx::query_as(
            "SELECT date, streak_count FROM attendance
             WHERE member_id = $1 AND gym_id = $2
             ORDER BY date DESC
             LIMIT 1",
        )
        .bind(member_id)
        .bind(gym_id)
        .fetch_optional(&self.db)
        .await?;

        Ok(latest)
    }

    /// Latest (date, streak) and longest streak of a member at a gym
    pub async fn streak_summary(
        &self,
        member_id: Uuid,
        gym_id: Uuid,
    ) -> AppResult<(Option<(NaiveDate, i32)>, i32)> {
        let latest = self.latest_record(member_id, gym_id).await?;
        let longest: Option<i32> = sqlx::query_scalar(
            "SELECT MAX(streak_count) FROM attendance WHERE member_id = $1 AND gym_id = $2",
        )
        .bind(member_id)
        .bind(gym_id)
        .fetch_one(&self.db)
        .await?;

        Ok((latest, longest.unwrap_or(0)))
    }

    pub async fn mark(&self, session: &UserSession, gym_id: Uuid) -> AppResult<MarkAttendanceResponse> {
        GymService::new(self.db.clone()).require_gym(gym_id).await?;
        self.require_active_member(session, gym_id).await?;

        let today = Self::today();
        let previous = self.latest_record(session.user_id, gym_id).await?;
        if matches!(previous, Some((date, _)) if date == today) {
            return Err(AppError::Conflict("Attendance already marked for today".to_string()));
        }
        let streak = next_streak(previous, today);

        let record = sqlx::query_as::<_, AttendanceRecord>(&format!(
            "INSERT INTO attendance (id, member_id, gym_id, date, check_in_time, streak_count)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {}",
            ATTENDANCE_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(session.user_id)
        .bind(gym_id)
        .bind(today)
        .bind(Utc::now())
        .bind(streak)
        .fetch_one(&self.db)
        .await
        .map_err(|err| match &err {
            // Lost a race with a concurrent check-in for the same day.
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                AppError::Conflict("Attendance already marked for today".to_string())
            }
            _ => AppError::Database(err),
        })?;

        tracing::info!(
            member_id = %session.user_id,
            gym_id = %gym_id,
            streak = record.streak_count,
            "attendance marked"
        );

        Ok(MarkAttendanceResponse {
            message: format!("Attendance marked. Current streak: {} day(s)", record.streak_count),
            current_streak: record.streak_count,
            attendance: record,
        })
    }

    pub async fn check_today(&self, session: &UserSession, gym_id: Uuid) -> AppResult<CheckTodayResponse> {
        let record = sqlx::query_as::<_, AttendanceRecord>(&format!(
            "SELECT {} FROM attendance WHERE member_id = $1 AND gym_id = $2 AND date = $3",
            ATTENDANCE_COLUMNS
        ))
        .bind(session.user_id)
        .bind(gym_id)
        .bind(Self::today())
        .fetch_optional(&self.db)
        .await?;

        Ok(CheckTodayResponse {
            marked: record.is_some(),
            check_in_time: record.as_ref().map(|r| r.check_in_time),
            streak_count: record.map(|r| r.streak_count),
        })
    }

    pub async fn stats(&self, session: &UserSession, gym_id: Uuid) -> AppResult<AttendanceStats> {
        let start_date = self.require_active_member(session, gym_id).await?;

        let total_attendance: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM attendance WHERE member_id = $1 AND gym_id = $2 AND date >= $3",
        )
        .bind(session.user_id)
        .bind(gym_id)
        .bind(start_date)
        .fetch_one(&self.db)
        .await?;

        let today = Self::today();
        let (latest, longest) = self.streak_summary(session.user_id, gym_id).await?;

        Ok(AttendanceStats {
            total_attendance,
            current_streak: current_streak(latest, today),
            longest_streak: longest,
            attendance_percentage: attendance_percentage(total_attendance, Some(start_date), today),
        })
    }

    pub async fn history(&self, session: &UserSession, gym_id: Uuid) -> AppResult<Vec<AttendanceRecord>> {
        let records = sqlx::query_as::<_, AttendanceRecord>(&format!(
            "SELECT {} FROM attendance
             WHERE member_id = $1 AND gym_id = $2
             ORDER BY date DESC
             LIMIT $3",
            ATTENDANCE_COLUMNS
        ))
        .bind(session.user_id)
        .bind(gym_id)
        .bind(HISTORY_LIMIT)
        .fetch_all(&self.db)
        .await?;

        Ok(records)
    }

    async fn member_rows(&self, gym_id: Uuid, today: NaiveDate) -> AppResult<Vec<MemberAttendanceRow>> {
        let rows = sqlx::query_as::<_, MemberAttendanceRow>(MEMBER_ROWS_SELECT)
            .bind(gym_id)
            .bind(today)
            .fetch_all(&self.db)
            .await?;

        Ok(rows)
    }

    /// Top members of a gym; open to its active members and its owner
    pub async fn leaderboard(&self, session: &UserSession, gym_id: Uuid) -> AppResult<Vec<LeaderboardEntry>> {
        let gym = GymService::new(self.db.clone()).require_gym(gym_id).await?;
        if gym.owner_id != session.user_id {
            self.require_active_member(session, gym_id).await?;
        }

        let today = Self::today();
        let rows = self.member_rows(gym_id, today).await?;
        Ok(rank_leaderboard(rows, today, LEADERBOARD_SIZE))
    }

    pub async fn analytics(&self, session: &UserSession, gym_id: Uuid) -> AppResult<AttendanceAnalytics> {
        let gym = self.require_gym_owner(session, gym_id).await?;
        let today = Self::today();

        let rows = self.member_rows(gym_id, today).await?;
        let total_members = rows.len() as i64;

        let (today_count, week_count, window_count): (i64, i64, i64) = sqlx::query_as(
            "SELECT COUNT(*) FILTER (WHERE date = $2),
                    COUNT(*) FILTER (WHERE date > $2 - 7),
                    COUNT(*) FILTER (WHERE date > $2 - $3::int)
             FROM attendance WHERE gym_id = $1",
        )
        .bind(gym_id)
        .bind(today)
        .bind(AVERAGE_WINDOW_DAYS as i32)
        .fetch_one(&self.db)
        .await?;

        let average_daily_attendance =
            (window_count as f64 / AVERAGE_WINDOW_DAYS as f64 * 10.0).round() / 10.0;

        let recent_attendance = sqlx::query_as::<_, RecentAttendance>(
            "SELECT a.member_id,
                    COALESCE(NULLIF(TRIM(u.first_name || ' ' || u.last_name), ''), u.username) AS member_name,
                    a.date, a.check_in_time, a.streak_count
             FROM attendance a
             JOIN users u ON u.id = a.member_id
             WHERE a.gym_id = $1
             ORDER BY a.check_in_time DESC
             LIMIT $2",
        )
        .bind(gym_id)
        .bind(RECENT_LIMIT)
        .fetch_all(&self.db)
        .await?;

        Ok(AttendanceAnalytics {
            gym_id: gym.id,
            gym_name: gym.name,
            total_members,
            today_count,
            week_count,
            average_daily_attendance,
            top_attenders: rank_leaderboard(rows, today, LEADERBOARD_SIZE),
            recent_attendance,
        })
    }

    /// Rewrite stored streak counts of one member at one gym from their dates.
    /// Returns the number of rows whose count changed.
    pub async fn recalculate_streaks(&self, member_id: Uuid, gym_id: Uuid) -> AppResult<u64> {
        let mut tx = self.db.begin().await?;

        let stored: Vec<(NaiveDate, i32)> = sqlx::query_as(
            "SELECT date, streak_count FROM attendance
             WHERE member_id = $1 AND gym_id = $2
             ORDER BY date ASC
             FOR UPDATE",
        )
        .bind(member_id)
        .bind(gym_id)
        .fetch_all(&mut *tx)
        .await?;

        let dates: Vec<NaiveDate> = stored.iter().map(|(date, _)| *date).collect();
        let mut changed = 0;
        for ((date, expected), (_, current)) in recalculate_streaks(&dates).into_iter().zip(stored) {
            if expected == current {
                continue;
            }
            sqlx::query(
                "UPDATE attendance SET streak_count = $4
                 WHERE member_id = $1 AND gym_id = $2 AND date = $3",
            )
            .bind(member_id)
            .bind(gym_id)
            .bind(date)
            .bind(expected)
            .execute(&mut *tx)
            .await?;
            changed += 1;
        }

        tx.commit().await?;

        if changed > 0 {
            tracing::info!(member_id = %member_id, gym_id = %gym_id, changed, "streaks recalculated");
        }
        Ok(changed)
    }

    /// Repair streaks of everyone with records at the owner's gym
    pub async fn recalculate_gym(&self, session: &UserSession, gym_id: Uuid) -> AppResult<u64> {
        self.require_gym_owner(session, gym_id).await?;

        let members: Vec<Uuid> =
            sqlx::query_scalar("SELECT DISTINCT member_id FROM attendance WHERE gym_id = $1")
                .bind(gym_id)
                .fetch_all(&self.db)
                .await?;

        let mut changed = 0;
        for member_id in members {
            changed += self.recalculate_streaks(member_id, gym_id).await?;
        }
        Ok(changed)
    }
}

