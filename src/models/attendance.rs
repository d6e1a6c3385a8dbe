use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AttendanceRecord {
    pub id: Uuid,
    pub member_id: Uuid,
    pub gym_id: Uuid,
    pub date: NaiveDate,
    pub check_in_time: DateTime<Utc>,
    pub streak_count: i32,
}

pub const ATTENDANCE_COLUMNS: &str = "id, member_id, gym_id, date, check_in_time, streak_count";

/// Streak for a check-in on `date`, given the member's previous record at the gym.
/// Only a record dated exactly the day before continues the streak.
pub fn next_streak(previous: Option<(NaiveDate, i32)>, date: NaiveDate) -> i32 {
    match previous {
        Some((prev_date, prev_streak)) if prev_date + Duration::days(1) == date => prev_streak + 1,
        _ => 1,
    }
}

/// Streak still alive on `today`: the latest record must be from today or yesterday
pub fn current_streak(latest: Option<(NaiveDate, i32)>, today: NaiveDate) -> i32 {
    match latest {
        Some((date, streak)) if date == today || date + Duration::days(1) == today => streak,
        _ => 0,
    }
}

/// Streak counts for a set of dates, returned in ascending date order.
/// Duplicate dates are collapsed.
pub fn recalculate_streaks(dates: &[NaiveDate]) -> Vec<(NaiveDate, i32)> {
    let mut sorted = dates.to_vec();
    sorted.sort_unstable();
    sorted.dedup();

    let mut result: Vec<(NaiveDate, i32)> = Vec::with_capacity(sorted.len());
    for date in sorted {
        let streak = next_streak(result.last().copied(), date);
        result.push((date, streak));
    }
    result
}

/// Attendance days over days since `start` (inclusive), one decimal, capped at 100
pub fn attendance_percentage(attended_days: i64, start: Option<NaiveDate>, today: NaiveDate) -> f64 {
    let Some(start) = start else {
        return 0.0;
    };
    let span = (today - start).num_days() + 1;
    if span <= 0 {
        return 0.0;
    }

    let pct = attended_days as f64 / span as f64 * 100.0;
    (pct.min(100.0) * 10.0).round() / 10.0
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarkAttendanceResponse {
    pub message: String,
    pub attendance: AttendanceRecord,
    pub current_streak: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckTodayResponse {
    pub marked: bool,
    pub check_in_time: Option<DateTime<Utc>>,
    pub streak_count: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AttendanceStats {
    pub total_attendance: i64,
    pub current_streak: i32,
    pub longest_streak: i32,
    pub attendance_percentage: f64,
}

/// Per-member aggregate used to build leaderboards
#[derive(Debug, Clone, FromRow)]
pub struct MemberAttendanceRow {
    pub member_id: Uuid,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub start_date: Option<NaiveDate>,
    pub total_attendance: i64,
    pub longest_streak: Option<i32>,
    pub latest_date: Option<NaiveDate>,
    pub latest_streak: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LeaderboardEntry {
    pub rank: usize,
    pub member_id: Uuid,
    pub member_name: String,
    pub username: String,
    pub total_attendance: i64,
    pub current_streak: i32,
    pub longest_streak: i32,
    pub attendance_percentage: f64,
}

/// Rank members by current streak, then total attendance, then name
pub fn rank_leaderboard(
    rows: Vec<MemberAttendanceRow>,
    today: NaiveDate,
    limit: usize,
) -> Vec<LeaderboardEntry> {
    let mut entries: Vec<LeaderboardEntry> = rows
        .into_iter()
        .map(|row| {
            let latest = row.latest_date.zip(row.latest_streak);
            LeaderboardEntry {
                rank: 0,
                member_id: row.member_id,
                member_name: crate::models::user::display_name(
                    &row.first_name,
                    &row.last_name,
                    &row.username,
                ),
                username: row.username,
                total_attendance: row.total_attendance,
                current_streak: current_streak(latest, today),
                longest_streak: row.longest_streak.unwrap_or(0),
                attendance_percentage: attendance_percentage(row.total_attendance, row.start_date, today),
            }
        })
        .collect();

    entries.sort_by(|a, b| {
        b.current_streak
            .cmp(&a.current_streak)
            .then(b.total_attendance.cmp(&a.total_attendance))
            .then_with(|| a.member_name.to_lowercase().cmp(&b.member_name.to_lowercase()))
    });
    entries.truncate(limit);

    for (index, entry) in entries.iter_mut().enumerate() {
        entry.rank = index + 1;
    }
    entries
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RecentAttendance {
    pub member_id: Uuid,
    pub member_name: String,
    pub date: NaiveDate,
    pub check_in_time: DateTime<Utc>,
    pub streak_count: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttendanceAnalytics {
    pub gym_id: Uuid,
    pub gym_name: String,
    pub total_members: i64,
    pub today_count: i64,
    pub week_count: i64,
    pub average_daily_attendance: f64,
    pub top_attenders: Vec<LeaderboardEntry>,
    pub recent_attendance: Vec<RecentAttendance>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn row(name: &str, total: i64, latest: Option<(NaiveDate, i32)>) -> MemberAttendanceRow {
        MemberAttendanceRow {
            member_id: Uuid::new_v4(),
            username: name.to_lowercase(),
            first_name: name.to_string(),
            last_name: String::new(),
            start_date: Some(date(2024, 3, 1)),
            total_attendance: total,
            longest_streak: latest.map(|(_, streak)| streak),
            latest_date: latest.map(|(d, _)| d),
            latest_streak: latest.map(|(_, streak)| streak),
        }
    }

    #[test]
    fn test_next_streak() {
        let today = date(2024, 3, 10);
        assert_eq!(next_streak(None, today), 1);
        assert_eq!(next_streak(Some((date(2024, 3, 9), 4)), today), 5);
        assert_eq!(next_streak(Some((date(2024, 3, 8), 4)), today), 1);
    }

    #[test]
    fn test_streak_across_month_boundary() {
        assert_eq!(next_streak(Some((date(2024, 2, 29), 2)), date(2024, 3, 1)), 3);
    }

    #[test]
    fn test_current_streak_decays_after_a_missed_day() {
        let today = date(2024, 3, 10);
        assert_eq!(current_streak(Some((today, 3)), today), 3);
        assert_eq!(current_streak(Some((date(2024, 3, 9), 3)), today), 3);
        assert_eq!(current_streak(Some((date(2024, 3, 8), 3)), today), 0);
        assert_eq!(current_streak(None, today), 0);
    }

    #[test]
    fn test_recalculate_streaks() {
        let dates = vec![
            date(2024, 3, 5),
            date(2024, 3, 1),
            date(2024, 3, 2),
            date(2024, 3, 3),
            date(2024, 3, 3),
            date(2024, 3, 6),
        ];

        assert_eq!(
            recalculate_streaks(&dates),
            vec![
                (date(2024, 3, 1), 1),
                (date(2024, 3, 2), 2),
                (date(2024, 3, 3), 3),
                (date(2024, 3, 5), 1),
                (date(2024, 3, 6), 2),
            ]
        );
        assert!(recalculate_streaks(&[]).is_empty());
    }

    #[test]
    fn test_attendance_percentage() {
        let today = date(2024, 3, 10);
        assert_eq!(attendance_percentage(5, Some(date(2024, 3, 1)), today), 50.0);
        assert_eq!(attendance_percentage(1, Some(date(2024, 3, 8)), today), 33.3);
        assert_eq!(attendance_percentage(30, Some(date(2024, 3, 8)), today), 100.0);
        assert_eq!(attendance_percentage(3, None, today), 0.0);
        assert_eq!(attendance_percentage(3, Some(date(2024, 3, 11)), today), 0.0);
    }

    #[test]
    fn test_leaderboard_ordering_and_ranks() {
        let today = date(2024, 3, 10);
        let rows = vec![
            row("Carol", 9, Some((date(2024, 3, 1), 6))),
            row("Bob", 4, Some((today, 4))),
            row("Alice", 6, Some((date(2024, 3, 9), 4))),
            row("Dave", 0, None),
        ];

        let board = rank_leaderboard(rows, today, 10);
        let names: Vec<&str> = board.iter().map(|e| e.member_name.as_str()).collect();

        // Carol's streak lapsed, so she ranks on attendance behind live streaks.
        assert_eq!(names, vec!["Alice", "Bob", "Carol", "Dave"]);
        assert_eq!(board[0].rank, 1);
        assert_eq!(board[2].current_streak, 0);
        assert_eq!(board[2].longest_streak, 6);
        assert_eq!(board[3].rank, 4);
    }

    #[test]
    fn test_leaderboard_truncates() {
        let today = date(2024, 3, 10);
        let rows = (0..15).map(|i| row(&format!("M{:02}", i), i, None)).collect();
        let board = rank_leaderboard(rows, today, 10);
        assert_eq!(board.len(), 10);
        assert_eq!(board[0].member_name, "M14");
        assert_eq!(board[9].rank, 10);
    }
}
