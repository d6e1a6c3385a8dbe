use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::auth::{UserSession, UserType};
use crate::error::{AppError, AppResult};
use crate::models::validation::require_text;
use crate::models::{CreateNoticeRequest, NoticeRow, NoticeView, UpdateNoticeRequest};
use crate::services::GymService;

const NOTICE_VIEW_SELECT: &str = "
    SELECT n.id, n.gym_id, n.title, n.message, n.is_active, n.created_at, n.updated_at,
           g.name AS gym_name
    FROM notices n
    JOIN gyms g ON g.id = n.gym_id";

pub struct NoticeService {
    db: PgPool,
}

impl NoticeService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    async fn fetch_row(&self, notice_id: Uuid) -> AppResult<NoticeRow> {
        sqlx::query_as::<_, NoticeRow>(&format!("{} WHERE n.id = $1", NOTICE_VIEW_SELECT))
            .bind(notice_id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::not_found("Notice"))
    }

    /// Notice row whose gym belongs to the caller
    async fn fetch_owned(&self, notice_id: Uuid, session: &UserSession) -> AppResult<NoticeRow> {
        let row = self.fetch_row(notice_id).await?;
        GymService::new(self.db.clone())
            .require_owned_gym(row.gym_id, session)
            .await
            .map_err(|err| match err {
                AppError::Forbidden(_) => AppError::Forbidden(
                    "Only the gym owner can change this notice".to_string(),
                ),
                other => other,
            })?;
        Ok(row)
    }

    /// Active notices the caller can see, newest first
    pub async fn list(&self, session: &UserSession) -> AppResult<Vec<NoticeView>> {
        let scope = match session.user_type {
            UserType::GymOwner => "g.owner_id = $1",
            UserType::Member => {
                "EXISTS (SELECT 1 FROM memberships m
                         WHERE m.gym_id = n.gym_id AND m.member_id = $1 AND m.status = 'approved')"
            }
            UserType::Admin => "($1::uuid IS NOT NULL)",
        };

        let rows = sqlx::query_as::<_, NoticeRow>(&format!(
            "{} WHERE n.is_active AND {} ORDER BY n.created_at DESC",
            NOTICE_VIEW_SELECT, scope
        ))
        .bind(session.user_id)
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(NoticeView::from).collect())
    }

    /// Latest active notices across the owner's gyms
    pub async fn recent_for_owner(&self, owner_id: Uuid, limit: i64) -> AppResult<Vec<NoticeView>> {
        let rows = sqlx::query_as::<_, NoticeRow>(&format!(
            "{} WHERE n.is_active AND g.owner_id = $1 ORDER BY n.created_at DESC LIMIT $2",
            NOTICE_VIEW_SELECT
        ))
        .bind(owner_id)
        .bind(limit)
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(NoticeView::from).collect())
    }

    pub async fn get(&self, notice_id: Uuid) -> AppResult<NoticeView> {
        let row = self.fetch_row(notice_id).await?;
        if !row.is_active {
            return Err(AppError::not_found("Notice"));
        }
        Ok(row.into())
    }

    pub async fn create(&self, session: &UserSession, request: CreateNoticeRequest) -> AppResult<NoticeView> {
        if session.user_type != UserType::GymOwner {
            return Err(AppError::Forbidden("Only gym owners can post notices".to_string()));
        }
        request.validate()?;
        let title = require_text("title", &request.title)?;
        let message = require_text("message", &request.message)?;

        let gyms = GymService::new(self.db.clone());
        let gym = match request.gym_id {
            Some(gym_id) => gyms.require_owned_gym(gym_id, session).await?,
            None => gyms
                .find_owner_gym(session.user_id)
                .await?
                .ok_or_else(|| AppError::NotFound("No gym found for this owner".to_string()))?,
        };

        let notice_id = Uuid::new_v4();
        sqlx::query(
            "INSERT INTO notices (id, gym_id, title, message, is_active, created_at, updated_at)
             VALUES ($1, $2, $3, $4, TRUE, $5, $5)",
        )
        .bind(notice_id)
        .bind(gym.id)
        .bind(&title)
        .bind(&message)
        .bind(Utc::now())
        .execute(&self.db)
        .await?;

        tracing::info!(notice_id = %notice_id, gym_id = %gym.id, "notice posted");
        Ok(self.fetch_row(notice_id).await?.into())
    }

    pub async fn update(
        &self,
        notice_id: Uuid,
        session: &UserSession,
        request: UpdateNoticeRequest,
    ) -> AppResult<NoticeView> {
        request.validate()?;
        self.fetch_owned(notice_id, session).await?;

        let title = request.title.as_deref().map(|t| require_text("title", t)).transpose()?;
        let message = request
            .message
            .as_deref()
            .map(|m| require_text("message", m))
            .transpose()?;

        sqlx::query(
            "UPDATE notices
             SET title = COALESCE($2, title),
                 message = COALESCE($3, message),
                 is_active = COALESCE($4, is_active),
                 updated_at = NOW()
             WHERE id = $1",
        )
        .bind(notice_id)
        .bind(&title)
        .bind(&message)
        .bind(request.is_active)
        .execute(&self.db)
        .await?;

        Ok(self.fetch_row(notice_id).await?.into())
    }

    pub async fn delete(&self, notice_id: Uuid, session: &UserSession) -> AppResult<()> {
        self.fetch_owned(notice_id, session).await?;

        sqlx::query("DELETE FROM notices WHERE id = $1")
            .bind(notice_id)
            .execute(&self.db)
            .await?;

        tracing::info!(notice_id = %notice_id, "notice deleted");
        Ok(())
    }
}
