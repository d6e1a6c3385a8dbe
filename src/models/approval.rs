use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::gym::GymStatus;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "approval_action", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ApprovalAction {
    Approved,
    Rejected,
}

impl ApprovalAction {
    pub fn resulting_status(&self) -> GymStatus {
        match self {
            ApprovalAction::Approved => GymStatus::Approved,
            ApprovalAction::Rejected => GymStatus::Rejected,
        }
    }
}

/// An admin may only decide on a gym that is still pending
pub fn check_reviewable(current: GymStatus, action: ApprovalAction) -> Result<GymStatus, String> {
    if current == GymStatus::Pending {
        Ok(action.resulting_status())
    } else {
        Err(format!("Gym is already {}", current.as_str()))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct GymApprovalHistory {
    pub id: Uuid,
    pub gym_id: Uuid,
    pub admin_id: Uuid,
    pub action: ApprovalAction,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ApprovalRequest {
    pub notes: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AdminGymQuery {
    pub status: Option<GymStatus>,
}

/// Gym with the owner's contact details, for the admin review screens
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct AdminGymView {
    pub id: Uuid,
    pub name: String,
    pub address: String,
    pub phone: String,
    pub email: String,
    pub description: Option<String>,
    pub status: GymStatus,
    pub rejection_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub owner_id: Uuid,
    pub owner_username: String,
    pub owner_name: String,
    pub owner_email: String,
    pub owner_phone: Option<String>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ApprovalHistoryView {
    pub id: Uuid,
    pub gym_id: Uuid,
    pub gym_name: String,
    pub admin_id: Uuid,
    pub admin_name: String,
    pub action: ApprovalAction,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    #[sqlx(default)]
    pub created_at_formatted: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ApprovalStats {
    pub pending_gyms: i64,
    pub approved_gyms: i64,
    pub rejected_gyms: i64,
    pub today_approvals: i64,
    pub today_rejections: i64,
    pub recent_history: Vec<ApprovalHistoryView>,
}

#[derive(Debug, Serialize)]
pub struct ApprovalResponse {
    pub message: String,
    pub gym: AdminGymView,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_pending_gyms_are_reviewable() {
        assert_eq!(
            check_reviewable(GymStatus::Pending, ApprovalAction::Approved),
            Ok(GymStatus::Approved)
        );
        assert_eq!(
            check_reviewable(GymStatus::Pending, ApprovalAction::Rejected),
            Ok(GymStatus::Rejected)
        );
        assert_eq!(
            check_reviewable(GymStatus::Approved, ApprovalAction::Rejected),
            Err("Gym is already approved".to_string())
        );
        assert!(check_reviewable(GymStatus::Rejected, ApprovalAction::Approved).is_err());
    }
}
