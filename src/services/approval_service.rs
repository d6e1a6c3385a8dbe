use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::UserSession;
use crate::error::{AppError, AppResult};
use crate::models::notice::format_timestamp;
use crate::models::validation::non_blank;
use crate::models::{
    check_reviewable, AdminGymView, ApprovalAction, ApprovalHistoryView, ApprovalResponse,
    ApprovalStats, GymApprovalHistory, GymStatus, GymStatusCounts,
};
use crate::services::GymService;

const RECENT_HISTORY: i64 = 10;

const ADMIN_GYM_SELECT: &str = "
    SELECT g.id, g.name, g.address, g.phone, g.email, g.description, g.status,
           g.rejection_reason, g.created_at, g.updated_at, g.owner_id,
           u.username AS owner_username,
           COALESCE(NULLIF(TRIM(u.first_name || ' ' || u.last_name), ''), u.username) AS owner_name,
           u.email AS owner_email, u.phone AS owner_phone
    FROM gyms g
    JOIN users u ON u.id = g.owner_id";

pub struct ApprovalService {
    db: PgPool,
}

impl ApprovalService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    async fn admin_view(&self, gym_id: Uuid) -> AppResult<AdminGymView> {
        sqlx::query_as::<_, AdminGymView>(&format!("{} WHERE g.id = $1", ADMIN_GYM_SELECT))
            .bind(gym_id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::not_found("Gym"))
    }

    /// Gyms waiting for review, oldest submission first
    pub async fn pending_gyms(&self) -> AppResult<Vec<AdminGymView>> {
        let gyms = sqlx::query_as::<_, AdminGymView>(&format!(
            "{} WHERE g.status = 'pending' ORDER BY g.updated_at ASC",
            ADMIN_GYM_SELECT
        ))
        .fetch_all(&self.db)
        .await?;

        Ok(gyms)
    }

    pub async fn all_gyms(&self, status: Option<GymStatus>) -> AppResult<Vec<AdminGymView>> {
        let gyms = sqlx::query_as::<_, AdminGymView>(&format!(
            "{} WHERE ($1::gym_status IS NULL OR g.status = $1) ORDER BY g.created_at DESC",
            ADMIN_GYM_SELECT
        ))
        .bind(status)
        .fetch_all(&self.db)
        .await?;

        Ok(gyms)
    }

    pub async fn approve(
        &self,
        gym_id: Uuid,
        session: &UserSession,
        notes: Option<String>,
    ) -> AppResult<ApprovalResponse> {
        self.review(gym_id, session, ApprovalAction::Approved, notes).await
    }

    pub async fn reject(
        &self,
        gym_id: Uuid,
        session: &UserSession,
        notes: Option<String>,
    ) -> AppResult<ApprovalResponse> {
        self.review(gym_id, session, ApprovalAction::Rejected, notes).await
    }

    async fn review(
        &self,
        gym_id: Uuid,
        session: &UserSession,
        action: ApprovalAction,
        notes: Option<String>,
    ) -> AppResult<ApprovalResponse> {
        let gym = GymService::new(self.db.clone()).require_gym(gym_id).await?;
        let next_status = check_reviewable(gym.status, action).map_err(|message| {
            tracing::warn!(gym_id = %gym_id, admin_id = %session.user_id, "{}", message);
            AppError::Conflict(message)
        })?;
        let notes = non_blank(notes.as_deref());
        let rejection_reason = match action {
            ApprovalAction::Rejected => notes.clone(),
            ApprovalAction::Approved => None,
        };

        let mut tx = self.db.begin().await?;

        let updated = sqlx::query(
            "UPDATE gyms SET status = $2, rejection_reason = $3, updated_at = NOW()
             WHERE id = $1 AND status = 'pending'",
        )
        .bind(gym_id)
        .bind(next_status)
        .bind(&rejection_reason)
        .execute(&mut *tx)
        .await?;

        if updated.rows_affected() == 0 {
            return Err(AppError::Conflict("Gym was reviewed by another admin".to_string()));
        }

        let history = sqlx::query_as::<_, GymApprovalHistory>(
            "INSERT INTO gym_approval_history (id, gym_id, admin_id, action, notes, created_at)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING id, gym_id, admin_id, action, notes, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(gym_id)
        .bind(session.user_id)
        .bind(action)
        .bind(&notes)
        .bind(Utc::now())
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(
            gym_id = %gym_id,
            admin_id = %history.admin_id,
            history_id = %history.id,
            status = next_status.as_str(),
            "gym reviewed"
        );

        Ok(ApprovalResponse {
            message: format!("Gym '{}' has been {}", gym.name, next_status.as_str()),
            gym: self.admin_view(gym_id).await?,
        })
    }

    pub async fn approval_stats(&self) -> AppResult<ApprovalStats> {
        let counts = sqlx::query_as::<_, GymStatusCounts>(
            "SELECT COUNT(*) FILTER (WHERE status = 'pending') AS pending,
                    COUNT(*) FILTER (WHERE status = 'approved') AS approved,
                    COUNT(*) FILTER (WHERE status = 'rejected') AS rejected
             FROM gyms",
        )
        .fetch_one(&self.db)
        .await?;

        let (today_approvals, today_rejections): (i64, i64) = sqlx::query_as(
            "SELECT COUNT(*) FILTER (WHERE action = 'approved'),
                    COUNT(*) FILTER (WHERE action = 'rejected')
             FROM gym_approval_history
             WHERE (created_at AT TIME ZONE 'UTC')::date = $1",
        )
        .bind(Utc::now().date_naive())
        .fetch_one(&self.db)
        .await?;

        let mut recent_history = sqlx::query_as::<_, ApprovalHistoryView>(
            "SELECT h.id, h.gym_id, g.name AS gym_name, h.admin_id,
                    COALESCE(NULLIF(TRIM(u.first_name || ' ' || u.last_name), ''), u.username) AS admin_name,
                    h.action, h.notes, h.created_at
             FROM gym_approval_history h
             JOIN gyms g ON g.id = h.gym_id
             JOIN users u ON u.id = h.admin_id
             ORDER BY h.created_at DESC
             LIMIT $1",
        )
        .bind(RECENT_HISTORY)
        .fetch_all(&self.db)
        .await?;

        for entry in recent_history.iter_mut() {
            entry.created_at_formatted = format_timestamp(&entry.created_at);
        }

        Ok(ApprovalStats {
            pending_gyms: counts.pending,
            approved_gyms: counts.approved,
            rejected_gyms: counts.rejected,
            today_approvals,
            today_rejections,
            recent_history,
        })
    }
}
