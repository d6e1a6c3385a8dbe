use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// Plan lengths a gym may offer, in months
pub const PLAN_DURATIONS: [i32; 3] = [3, 6, 12];

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MembershipPlan {
    pub id: Uuid,
    pub gym_id: Uuid,
    pub duration_months: i32,
    pub price: f64,
    pub description: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub const PLAN_COLUMNS: &str =
    "id, gym_id, duration_months, price, description, is_active, created_at, updated_at";

impl MembershipPlan {
    pub fn details(&self) -> String {
        plan_details(self.duration_months, self.price)
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreatePlanRequest {
    pub duration_months: i32,
    #[validate(range(min = 0.0, message = "Price cannot be negative"))]
    pub price: f64,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdatePlanRequest {
    #[validate(range(min = 0.0, message = "Price cannot be negative"))]
    pub price: Option<f64>,
    pub description: Option<String>,
    pub is_active: Option<bool>,
}

pub fn validate_duration(duration_months: i32) -> Result<(), String> {
    if PLAN_DURATIONS.contains(&duration_months) {
        Ok(())
    } else {
        Err(format!(
            "Plan duration must be one of 3, 6 or 12 months, got {}",
            duration_months
        ))
    }
}

pub fn duration_label(duration_months: i32) -> String {
    if duration_months == 1 {
        "1 Month".to_string()
    } else {
        format!("{} Months", duration_months)
    }
}

/// Human label for a plan, e.g. "6 Months - 4999.00"
pub fn plan_details(duration_months: i32, price: f64) -> String {
    format!("{} - {:.2}", duration_label(duration_months), price)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_durations() {
        for months in PLAN_DURATIONS {
            assert!(validate_duration(months).is_ok());
        }
        assert!(validate_duration(1).is_err());
        assert!(validate_duration(24).is_err());
    }

    #[test]
    fn test_plan_details() {
        assert_eq!(plan_details(6, 4999.0), "6 Months - 4999.00");
        assert_eq!(plan_details(12, 9999.5), "12 Months - 9999.50");
    }

    #[test]
    fn test_negative_price_rejected() {
        let request = CreatePlanRequest {
            duration_months: 3,
            price: -1.0,
            description: None,
        };
        assert!(request.validate().is_err());
    }
}
