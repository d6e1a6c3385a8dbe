use chrono::{DateTime, Months, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::plan::plan_details;
use crate::models::user::display_name;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "membership_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum MembershipStatus {
    Pending,
    Approved,
    Rejected,
    Terminated,
}

impl MembershipStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MembershipStatus::Pending => "pending",
            MembershipStatus::Approved => "approved",
            MembershipStatus::Rejected => "rejected",
            MembershipStatus::Terminated => "terminated",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Some(MembershipStatus::Pending),
            "approved" => Some(MembershipStatus::Approved),
            "rejected" => Some(MembershipStatus::Rejected),
            "terminated" => Some(MembershipStatus::Terminated),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MembershipAction {
    Approve,
    Reject,
    Terminate,
}

impl MembershipAction {
    pub fn verb(&self) -> &'static str {
        match self {
            MembershipAction::Approve => "approve",
            MembershipAction::Reject => "reject",
            MembershipAction::Terminate => "terminate",
        }
    }

    /// Status the membership must currently have for the action to apply
    pub fn required_status(&self) -> MembershipStatus {
        match self {
            MembershipAction::Approve | MembershipAction::Reject => MembershipStatus::Pending,
            MembershipAction::Terminate => MembershipStatus::Approved,
        }
    }

    pub fn resulting_status(&self) -> MembershipStatus {
        match self {
            MembershipAction::Approve => MembershipStatus::Approved,
            MembershipAction::Reject => MembershipStatus::Rejected,
            MembershipAction::Terminate => MembershipStatus::Terminated,
        }
    }

    /// Check the transition, returning the error message when it is not allowed
    pub fn check(&self, current: MembershipStatus) -> Result<MembershipStatus, String> {
        if current == self.required_status() {
            Ok(self.resulting_status())
        } else {
            Err(format!(
                "Cannot {} a membership that is {}",
                self.verb(),
                current.as_str()
            ))
        }
    }
}

/// Start plus whole calendar months, clamped to the last day of a short month
pub fn membership_end_date(start: NaiveDate, months: i32) -> NaiveDate {
    start
        .checked_add_months(Months::new(months.max(0) as u32))
        .unwrap_or(NaiveDate::MAX)
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Membership {
    pub id: Uuid,
    pub member_id: Uuid,
    pub gym_id: Uuid,
    pub plan_id: Option<Uuid>,
    pub status: MembershipStatus,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub const MEMBERSHIP_COLUMNS: &str =
    "id, member_id, gym_id, plan_id, status, start_date, end_date, created_at, updated_at";

/// Membership joined with the gym, member and plan it refers to
#[derive(Debug, Clone, FromRow)]
pub struct MembershipRow {
    pub id: Uuid,
    pub member_id: Uuid,
    pub gym_id: Uuid,
    pub plan_id: Option<Uuid>,
    pub status: MembershipStatus,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub gym_name: String,
    pub gym_address: String,
    pub member_username: String,
    pub member_first_name: String,
    pub member_last_name: String,
    pub member_email: String,
    pub plan_duration_months: Option<i32>,
    pub plan_price: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MembershipView {
    pub id: Uuid,
    pub member_id: Uuid,
    pub gym_id: Uuid,
    pub plan_id: Option<Uuid>,
    pub status: MembershipStatus,
    pub effective_status: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub days_remaining: Option<i64>,
    pub gym_name: String,
    pub gym_address: String,
    pub member_name: String,
    pub member_username: String,
    pub member_email: String,
    pub plan_details: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Approved and not past its end date on `today`
pub fn is_in_force(status: MembershipStatus, end_date: Option<NaiveDate>, today: NaiveDate) -> bool {
    status == MembershipStatus::Approved && end_date.map_or(true, |end| end >= today)
}

/// Status as shown to users: an approved membership past its end date reads "expired"
pub fn effective_status(status: MembershipStatus, end_date: Option<NaiveDate>, today: NaiveDate) -> String {
    if status == MembershipStatus::Approved && !is_in_force(status, end_date, today) {
        "expired".to_string()
    } else {
        status.as_str().to_string()
    }
}

pub fn days_remaining(status: MembershipStatus, end_date: Option<NaiveDate>, today: NaiveDate) -> Option<i64> {
    if status != MembershipStatus::Approved {
        return None;
    }
    end_date.map(|end| (end - today).num_days().max(0))
}

impl MembershipRow {
    pub fn into_view(self, today: NaiveDate) -> MembershipView {
        let plan_details = match (self.plan_duration_months, self.plan_price) {
            (Some(months), Some(price)) => Some(plan_details(months, price)),
            _ => None,
        };

        MembershipView {
            id: self.id,
            member_id: self.member_id,
            gym_id: self.gym_id,
            plan_id: self.plan_id,
            status: self.status,
            effective_status: effective_status(self.status, self.end_date, today),
            start_date: self.start_date,
            end_date: self.end_date,
            days_remaining: days_remaining(self.status, self.end_date, today),
            gym_name: self.gym_name,
            gym_address: self.gym_address,
            member_name: display_name(
                &self.member_first_name,
                &self.member_last_name,
                &self.member_username,
            ),
            member_username: self.member_username,
            member_email: self.member_email,
            plan_details,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct MembershipQuery {
    pub status: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_end_date_adds_calendar_months() {
        assert_eq!(membership_end_date(date(2024, 1, 15), 3), date(2024, 4, 15));
        assert_eq!(membership_end_date(date(2024, 6, 1), 12), date(2025, 6, 1));
    }

    #[test]
    fn test_end_date_clamps_to_month_end() {
        assert_eq!(membership_end_date(date(2023, 8, 31), 6), date(2024, 2, 29));
        assert_eq!(membership_end_date(date(2024, 11, 30), 3), date(2025, 2, 28));
    }

    #[test]
    fn test_transitions() {
        use MembershipAction::*;
        use MembershipStatus::*;

        assert_eq!(Approve.check(Pending), Ok(Approved));
        assert_eq!(Reject.check(Pending), Ok(Rejected));
        assert_eq!(Terminate.check(Approved), Ok(Terminated));

        assert_eq!(
            Approve.check(Rejected),
            Err("Cannot approve a membership that is rejected".to_string())
        );
        assert!(Terminate.check(Pending).is_err());
        assert!(Reject.check(Terminated).is_err());
    }

    #[test]
    fn test_effective_status_and_days_remaining() {
        let today = date(2024, 5, 10);

        assert_eq!(
            effective_status(MembershipStatus::Approved, Some(date(2024, 5, 9)), today),
            "expired"
        );
        assert_eq!(
            effective_status(MembershipStatus::Approved, Some(today), today),
            "approved"
        );
        assert_eq!(effective_status(MembershipStatus::Pending, None, today), "pending");

        assert_eq!(
            days_remaining(MembershipStatus::Approved, Some(date(2024, 5, 20)), today),
            Some(10)
        );
        assert_eq!(
            days_remaining(MembershipStatus::Approved, Some(date(2024, 5, 1)), today),
            Some(0)
        );
        assert_eq!(days_remaining(MembershipStatus::Rejected, Some(today), today), None);
    }

    #[test]
    fn test_parse_status() {
        assert_eq!(MembershipStatus::parse(" Approved "), Some(MembershipStatus::Approved));
        assert_eq!(MembershipStatus::parse("expired"), None);
    }
}
