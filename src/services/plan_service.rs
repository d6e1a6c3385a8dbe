use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::auth::UserSession;
use crate::error::{AppError, AppResult};
use crate::models::validation::non_blank;
use crate::models::{
    validate_duration, CreatePlanRequest, MembershipPlan, UpdatePlanRequest, PLAN_COLUMNS,
};
use crate::services::GymService;

pub struct PlanService {
    db: PgPool,
}

impl PlanService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Active plans of a gym, shortest first
    pub async fn list_plans(&self, gym_id: Uuid) -> AppResult<Vec<MembershipPlan>> {
        let plans = sqlx::query_as::<_, MembershipPlan>(&format!(
            "SELECT {} FROM membership_plans
             WHERE gym_id = $1 AND is_active
             ORDER BY duration_months ASC",
            PLAN_COLUMNS
        ))
        .bind(gym_id)
        .fetch_all(&self.db)
        .await?;

        Ok(plans)
    }

    pub async fn get_plan(&self, gym_id: Uuid, plan_id: Uuid) -> AppResult<MembershipPlan> {
        sqlx::query_as::<_, MembershipPlan>(&format!(
            "SELECT {} FROM membership_plans WHERE id = $1 AND gym_id = $2",
            PLAN_COLUMNS
        ))
        .bind(plan_id)
        .bind(gym_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::not_found("Membership plan"))
    }

    pub async fn create_plan(
        &self,
        gym_id: Uuid,
        session: &UserSession,
        request: CreatePlanRequest,
    ) -> AppResult<MembershipPlan> {
        request.validate()?;
        validate_duration(request.duration_months).map_err(AppError::Validation)?;
        GymService::new(self.db.clone())
            .require_owned_gym(gym_id, session)
            .await?;

        // A deactivated plan of the same length is brought back instead of duplicated.
        let plan = sqlx::query_as::<_, MembershipPlan>(&format!(
            "INSERT INTO membership_plans (id, gym_id, duration_months, price, description,
                                           is_active, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, TRUE, $6, $6)
             ON CONFLICT (gym_id, duration_months) DO UPDATE
                SET price = EXCLUDED.price, description = EXCLUDED.description,
                    is_active = TRUE, updated_at = EXCLUDED.updated_at
                WHERE NOT membership_plans.is_active
             RETURNING {}",
            PLAN_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(gym_id)
        .bind(request.duration_months)
        .bind(request.price)
        .bind(non_blank(request.description.as_deref()))
        .bind(Utc::now())
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| {
            AppError::Conflict(format!(
                "This gym already has a {} month plan",
                request.duration_months
            ))
        })?;

        tracing::info!(gym_id = %gym_id, plan_id = %plan.id, months = plan.duration_months, "plan created");
        Ok(plan)
    }

    pub async fn update_plan(
        &self,
        gym_id: Uuid,
        plan_id: Uuid,
        session: &UserSession,
        request: UpdatePlanRequest,
    ) -> AppResult<MembershipPlan> {
        request.validate()?;
        GymService::new(self.db.clone())
            .require_owned_gym(gym_id, session)
            .await?;
        self.get_plan(gym_id, plan_id).await?;

        let plan = sqlx::query_as::<_, MembershipPlan>(&format!(
            "UPDATE membership_plans
             SET price = COALESCE($3, price),
                 description = COALESCE($4, description),
                 is_active = COALESCE($5, is_active),
                 updated_at = NOW()
             WHERE id = $1 AND gym_id = $2
             RETURNING {}",
            PLAN_COLUMNS
        ))
        .bind(plan_id)
        .bind(gym_id)
        .bind(request.price)
        .bind(&request.description)
        .bind(request.is_active)
        .fetch_one(&self.db)
        .await?;

        Ok(plan)
    }

    /// Deactivate a plan; memberships already on it keep their reference
    pub async fn delete_plan(&self, gym_id: Uuid, plan_id: Uuid, session: &UserSession) -> AppResult<()> {
        GymService::new(self.db.clone())
            .require_owned_gym(gym_id, session)
            .await?;
        self.get_plan(gym_id, plan_id).await?;

        sqlx::query("UPDATE membership_plans SET is_active = FALSE, updated_at = NOW() WHERE id = $1")
            .bind(plan_id)
            .execute(&self.db)
            .await?;

        tracing::info!(gym_id = %gym_id, plan_id = %plan_id, "plan deactivated");
        Ok(())
    }
}
