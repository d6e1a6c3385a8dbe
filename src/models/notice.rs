use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Notice {
    pub id: Uuid,
    pub gym_id: Uuid,
    pub title: String,
    pub message: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct NoticeRow {
    pub id: Uuid,
    pub gym_id: Uuid,
    pub title: String,
    pub message: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub gym_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoticeView {
    pub id: Uuid,
    pub gym_id: Uuid,
    pub gym_name: String,
    pub title: String,
    pub message: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub created_at_formatted: String,
    pub updated_at: DateTime<Utc>,
}

/// e.g. "March 05, 2024 at 06:30 PM"
pub fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.format("%B %d, %Y at %I:%M %p").to_string()
}

impl From<NoticeRow> for NoticeView {
    fn from(row: NoticeRow) -> Self {
        Self {
            created_at_formatted: format_timestamp(&row.created_at),
            id: row.id,
            gym_id: row.gym_id,
            gym_name: row.gym_name,
            title: row.title,
            message: row.message,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateNoticeRequest {
    /// Required when the owner has more than one gym
    pub gym_id: Option<Uuid>,
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: String,
    #[validate(length(min = 1, message = "Message is required"))]
    pub message: String,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateNoticeRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: Option<String>,
    #[validate(length(min = 1, message = "Message is required"))]
    pub message: Option<String>,
    pub is_active: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_format_timestamp() {
        let timestamp = Utc.with_ymd_and_hms(2024, 3, 5, 18, 30, 0).unwrap();
        assert_eq!(format_timestamp(&timestamp), "March 05, 2024 at 06:30 PM");
    }

    #[test]
    fn test_title_length_limit() {
        let request = CreateNoticeRequest {
            gym_id: None,
            title: "x".repeat(201),
            message: "Closed on Sunday".to_string(),
        };
        assert!(request.validate().is_err());
    }
}
