use chrono::{NaiveDate, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::{UserSession, UserType};
use crate::error::{AppError, AppResult};
use crate::models::{
    membership_end_date, GymStatus, Membership, MembershipAction, MembershipRow, MembershipStatus,
    MembershipView, MEMBERSHIP_COLUMNS,
};
use crate::services::{GymService, PlanService};

const MEMBERSHIP_VIEW_SELECT: &str = "
    SELECT m.id, m.member_id, m.gym_id, m.plan_id, m.status, m.start_date, m.end_date,
           m.created_at, m.updated_at,
           g.name AS gym_name, g.address AS gym_address,
           u.username AS member_username, u.first_name AS member_first_name,
           u.last_name AS member_last_name, u.email AS member_email,
           p.duration_months AS plan_duration_months, p.price AS plan_price
    FROM memberships m
    JOIN gyms g ON g.id = m.gym_id
    JOIN users u ON u.id = m.member_id
    LEFT JOIN membership_plans p ON p.id = m.plan_id";

pub struct MembershipService {
    db: PgPool,
}

impl MembershipService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    fn today() -> NaiveDate {
        Utc::now().date_naive()
    }

    pub async fn get_membership(&self, membership_id: Uuid) -> AppResult<Membership> {
        sqlx::query_as::<_, Membership>(&format!(
            "SELECT {} FROM memberships WHERE id = $1",
            MEMBERSHIP_COLUMNS
        ))
        .bind(membership_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::not_found("Membership"))
    }

    pub async fn get_view(&self, membership_id: Uuid) -> AppResult<MembershipView> {
        let row = sqlx::query_as::<_, MembershipRow>(&format!("{} WHERE m.id = $1", MEMBERSHIP_VIEW_SELECT))
            .bind(membership_id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::not_found("Membership"))?;

        Ok(row.into_view(Self::today()))
    }

    /// The member's membership at a gym that is approved and not yet past its end date
    pub async fn in_force_membership(&self, member_id: Uuid, gym_id: Uuid) -> AppResult<Option<Membership>> {
        let membership = sqlx::query_as::<_, Membership>(&format!(
            "SELECT {} FROM memberships
             WHERE member_id = $1 AND gym_id = $2 AND status = 'approved'
               AND (end_date IS NULL OR end_date >= $3)
             ORDER BY start_date DESC NULLS LAST
             LIMIT 1",
            MEMBERSHIP_COLUMNS
        ))
        .bind(member_id)
        .bind(gym_id)
        .bind(Self::today())
        .fetch_optional(&self.db)
        .await?;

        Ok(membership)
    }

    pub async fn request_membership(
        &self,
        session: &UserSession,
        gym_id: Uuid,
        plan_id: Uuid,
    ) -> AppResult<MembershipView> {
        if session.user_type != UserType::Member {
            return Err(AppError::Forbidden(
                "Only members can request a membership".to_string(),
            ));
        }

        let gym = GymService::new(self.db.clone()).require_gym(gym_id).await?;
        if gym.status != GymStatus::Approved {
            return Err(AppError::Validation(
                "This gym is not accepting members yet".to_string(),
            ));
        }

        let plan = PlanService::new(self.db.clone()).get_plan(gym_id, plan_id).await?;
        if !plan.is_active {
            return Err(AppError::Validation(
                "This membership plan is no longer offered".to_string(),
            ));
        }

        let blocking: Option<MembershipStatus> = sqlx::query_scalar(
            "SELECT status FROM memberships
             WHERE member_id = $1 AND gym_id = $2
               AND (status = 'pending'
                    OR (status = 'approved' AND (end_date IS NULL OR end_date >= $3)))
             LIMIT 1",
        )
        .bind(session.user_id)
        .bind(gym_id)
        .bind(Self::today())
        .fetch_optional(&self.db)
        .await?;

        if let Some(status) = blocking {
            let message = match status {
                MembershipStatus::Pending => "You already have a pending request for this gym",
                _ => "You already have an active membership at this gym",
            };
            return Err(AppError::Conflict(message.to_string()));
        }

        let membership_id = Uuid::new_v4();
        let now = Utc::now();
        sqlx::query(
            "INSERT INTO memberships (id, member_id, gym_id, plan_id, status, created_at, updated_at)
             VALUES ($1, $2, $3, $4, 'pending', $5, $5)",
        )
        .bind(membership_id)
        .bind(session.user_id)
        .bind(gym_id)
        .bind(plan_id)
        .bind(now)
        .execute(&self.db)
        .await
        .map_err(|err| match &err {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => AppError::Conflict(
                "You already have a pending request for this gym".to_string(),
            ),
            _ => AppError::Database(err),
        })?;

        tracing::info!(
            membership_id = %membership_id,
            member_id = %session.user_id,
            gym_id = %gym_id,
            "membership requested"
        );

        self.get_view(membership_id).await
    }

    /// Memberships visible to the caller, newest first
    pub async fn list_memberships(
        &self,
        session: &UserSession,
        status: Option<MembershipStatus>,
    ) -> AppResult<Vec<MembershipView>> {
        let scope = match session.user_type {
            UserType::Member => "m.member_id = $1",
            UserType::GymOwner => "g.owner_id = $1",
            UserType::Admin => "($1::uuid IS NOT NULL)",
        };

        let rows = sqlx::query_as::<_, MembershipRow>(&format!(
            "{} WHERE {} AND ($2::membership_status IS NULL OR m.status = $2)
             ORDER BY m.created_at DESC",
            MEMBERSHIP_VIEW_SELECT, scope
        ))
        .bind(session.user_id)
        .bind(status)
        .fetch_all(&self.db)
        .await?;

        let today = Self::today();
        Ok(rows.into_iter().map(|row| row.into_view(today)).collect())
    }

    pub async fn approve(&self, membership_id: Uuid, session: &UserSession) -> AppResult<MembershipView> {
        self.apply(membership_id, session, MembershipAction::Approve).await
    }

    pub async fn reject(&self, membership_id: Uuid, session: &UserSession) -> AppResult<MembershipView> {
        self.apply(membership_id, session, MembershipAction::Reject).await
    }

    pub async fn terminate(&self, membership_id: Uuid, session: &UserSession) -> AppResult<MembershipView> {
        self.apply(membership_id, session, MembershipAction::Terminate).await
    }

    async fn apply(
        &self,
        membership_id: Uuid,
        session: &UserSession,
        action: MembershipAction,
    ) -> AppResult<MembershipView> {
        let membership = self.get_membership(membership_id).await?;
        let gym = GymService::new(self.db.clone()).require_gym(membership.gym_id).await?;

        let is_gym_owner = gym.owner_id == session.user_id;
        let allowed = match action {
            MembershipAction::Approve | MembershipAction::Reject => is_gym_owner,
            MembershipAction::Terminate => is_gym_owner || membership.member_id == session.user_id,
        };
        if !allowed {
            return Err(AppError::Forbidden(format!(
                "You cannot {} this membership",
                action.verb()
            )));
        }

        let next_status = action.check(membership.status).map_err(|message| {
            tracing::warn!(membership_id = %membership_id, "{}", message);
            AppError::Conflict(message)
        })?;

        let today = Self::today();
        let (start_date, end_date) = match action {
            MembershipAction::Approve => {
                let months = match membership.plan_id {
                    Some(plan_id) => PlanService::new(self.db.clone())
                        .get_plan(membership.gym_id, plan_id)
                        .await?
                        .duration_months,
                    None => {
                        return Err(AppError::Validation(
                            "Membership has no plan to approve".to_string(),
                        ))
                    }
                };
                (Some(today), Some(membership_end_date(today, months)))
            }
            MembershipAction::Reject => (membership.start_date, membership.end_date),
            MembershipAction::Terminate => (membership.start_date, Some(today)),
        };

        // The status guard in WHERE keeps concurrent transitions from both applying.
        let result = sqlx::query(
            "UPDATE memberships
             SET status = $2, start_date = $3, end_date = $4, updated_at = NOW()
             WHERE id = $1 AND status = $5",
        )
        .bind(membership_id)
        .bind(next_status)
        .bind(start_date)
        .bind(end_date)
        .bind(membership.status)
        .execute(&self.db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::Conflict(
                "Membership was changed by another request".to_string(),
            ));
        }

        tracing::info!(
            membership_id = %membership_id,
            from = membership.status.as_str(),
            to = next_status.as_str(),
            by = %session.user_id,
            "membership status changed"
        );

        self.get_view(membership_id).await
    }
}
