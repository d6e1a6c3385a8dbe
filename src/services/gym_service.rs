use chrono::Utc;
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::auth::{UserSession, UserType};
use crate::error::{AppError, AppResult};
use crate::models::validation::{contains_pattern, non_blank, require_text, validate_phone};
use crate::models::{
    current_streak, decide_registration, AvailableGym, CreateGymRequest, Gym, GymListQuery,
    GymMemberSummary, GymRegistrationResponse, GymStatus, MyGymDetails, RegistrationDecision,
    UpdateGymRequest, GYM_COLUMNS,
};
use crate::services::AttendanceService;

pub struct GymService {
    db: PgPool,
}

fn name_conflict(err: sqlx::Error) -> AppError {
    match &err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            AppError::Conflict("A gym with this name already exists".to_string())
        }
        _ => AppError::Database(err),
    }
}

impl GymService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub async fn get_gym(&self, gym_id: Uuid) -> AppResult<Option<Gym>> {
        let gym = sqlx::query_as::<_, Gym>(&format!("SELECT {} FROM gyms WHERE id = $1", GYM_COLUMNS))
            .bind(gym_id)
            .fetch_optional(&self.db)
            .await?;

        Ok(gym)
    }

    pub async fn require_gym(&self, gym_id: Uuid) -> AppResult<Gym> {
        self.get_gym(gym_id)
            .await?
            .ok_or_else(|| AppError::not_found("Gym"))
    }

    /// Gym the caller owns; 404 when missing, 403 when it belongs to someone else
    pub async fn require_owned_gym(&self, gym_id: Uuid, session: &UserSession) -> AppResult<Gym> {
        let gym = self.require_gym(gym_id).await?;
        if gym.owner_id != session.user_id {
            return Err(AppError::Forbidden("You do not own this gym".to_string()));
        }
        Ok(gym)
    }

    /// Gym visible to the caller: approved gyms to everyone, others to the owner or an admin
    pub async fn get_visible_gym(&self, gym_id: Uuid, session: &UserSession) -> AppResult<Gym> {
        let gym = self.require_gym(gym_id).await?;
        let visible = gym.status == GymStatus::Approved
            || gym.owner_id == session.user_id
            || session.is_admin();

        if visible {
            Ok(gym)
        } else {
            Err(AppError::not_found("Gym"))
        }
    }

    async fn name_taken(&self, name: &str, except: Option<Uuid>) -> AppResult<bool> {
        let taken: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM gyms WHERE LOWER(name) = LOWER($1)
                           AND ($2::uuid IS NULL OR id <> $2))",
        )
        .bind(name)
        .bind(except)
        .fetch_one(&self.db)
        .await?;

        Ok(taken)
    }

    /// First gym of an owner, oldest first
    pub async fn find_owner_gym(&self, owner_id: Uuid) -> AppResult<Option<Gym>> {
        let gym = sqlx::query_as::<_, Gym>(&format!(
            "SELECT {} FROM gyms WHERE owner_id = $1 ORDER BY created_at ASC LIMIT 1",
            GYM_COLUMNS
        ))
        .bind(owner_id)
        .fetch_optional(&self.db)
        .await?;

        Ok(gym)
    }

    /// Register a gym for an owner, or resubmit their rejected one
    pub async fn register_gym(
        &self,
        owner_id: Uuid,
        request: CreateGymRequest,
    ) -> AppResult<GymRegistrationResponse> {
        request.validate()?;
        let name = require_text("name", &request.name)?;
        let address = require_text("address", &request.address)?;
        let phone = require_text("phone", &request.phone)?;
        validate_phone(&phone).map_err(AppError::Validation)?;
        let email = require_text("email", &request.email)?;
        let description = non_blank(request.description.as_deref());

        let existing = self.find_owner_gym(owner_id).await?;

        match decide_registration(existing.as_ref()) {
            RegistrationDecision::AlreadyRegistered => {
                let gym = existing.ok_or_else(|| AppError::not_found("Gym"))?;
                tracing::warn!(owner_id = %owner_id, gym_id = %gym.id, "duplicate gym registration");
                Err(AppError::ConflictWith {
                    message: "You already have a gym registered".to_string(),
                    details: json!({
                        "existing_gym": {
                            "id": gym.id,
                            "name": gym.name,
                            "status": gym.status,
                        }
                    }),
                })
            }
            RegistrationDecision::Resubmit(gym_id) => {
                if self.name_taken(&name, Some(gym_id)).await? {
                    return Err(AppError::Conflict("A gym with this name already exists".to_string()));
                }

                let gym = sqlx::query_as::<_, Gym>(&format!(
                    "UPDATE gyms
                     SET name = $2, address = $3, phone = $4, email = $5, description = $6,
                         status = 'pending', rejection_reason = NULL, updated_at = NOW()
                     WHERE id = $1
                     RETURNING {}",
                    GYM_COLUMNS
                ))
                .bind(gym_id)
                .bind(&name)
                .bind(&address)
                .bind(&phone)
                .bind(&email)
                .bind(&description)
                .fetch_one(&self.db)
                .await
                .map_err(name_conflict)?;

                tracing::info!(gym_id = %gym.id, "rejected gym resubmitted for review");

                Ok(GymRegistrationResponse {
                    message: "Gym resubmitted for approval".to_string(),
                    gym,
                    resubmitted: true,
                })
            }
            RegistrationDecision::Create => {
                if self.name_taken(&name, None).await? {
                    return Err(AppError::Conflict("A gym with this name already exists".to_string()));
                }

                let now = Utc::now();
                let gym = sqlx::query_as::<_, Gym>(&format!(
                    "INSERT INTO gyms (id, name, address, phone, email, description, owner_id,
                                       status, created_at, updated_at)
                     VALUES ($1, $2, $3, $4, $5, $6, $7, 'pending', $8, $8)
                     RETURNING {}",
                    GYM_COLUMNS
                ))
                .bind(Uuid::new_v4())
                .bind(&name)
                .bind(&address)
                .bind(&phone)
                .bind(&email)
                .bind(&description)
                .bind(owner_id)
                .bind(now)
                .fetch_one(&self.db)
                .await
                .map_err(name_conflict)?;

                tracing::info!(gym_id = %gym.id, owner_id = %owner_id, "gym registered, awaiting approval");

                Ok(GymRegistrationResponse {
                    message: "Gym registered and awaiting approval".to_string(),
                    gym,
                    resubmitted: false,
                })
            }
        }
    }

    /// Approved gyms, optionally filtered by city (address) and name
    pub async fn list_available(&self, query: &GymListQuery) -> AppResult<Vec<AvailableGym>> {
        let city = non_blank(query.city.as_deref()).map(|c| contains_pattern(&c));
        let search = non_blank(query.search.as_deref()).map(|s| contains_pattern(&s));

        let gyms = sqlx::query_as::<_, AvailableGym>(
            "SELECT g.id, g.name, g.address, g.phone, g.email, g.description,
                    (SELECT COUNT(*) FROM memberships m
                      WHERE m.gym_id = g.id AND m.status = 'approved'
                        AND (m.end_date IS NULL OR m.end_date >= $3)) AS member_count,
                    COALESCE(NULLIF(TRIM(u.first_name || ' ' || u.last_name), ''), u.username) AS owner_name
             FROM gyms g
             JOIN users u ON u.id = g.owner_id
             WHERE g.status = 'approved'
               AND ($1::text IS NULL OR g.address ILIKE $1 ESCAPE '\\')
               AND ($2::text IS NULL OR g.name ILIKE $2 ESCAPE '\\')
             ORDER BY g.name ASC",
        )
        .bind(city)
        .bind(search)
        .bind(Utc::now().date_naive())
        .fetch_all(&self.db)
        .await?;

        Ok(gyms)
    }

    pub async fn my_gyms(&self, owner_id: Uuid) -> AppResult<Vec<Gym>> {
        let gyms = sqlx::query_as::<_, Gym>(&format!(
            "SELECT {} FROM gyms WHERE owner_id = $1 ORDER BY created_at ASC",
            GYM_COLUMNS
        ))
        .bind(owner_id)
        .fetch_all(&self.db)
        .await?;

        Ok(gyms)
    }

    async fn require_manageable(&self, gym_id: Uuid, session: &UserSession) -> AppResult<Gym> {
        let gym = self.require_gym(gym_id).await?;
        if gym.owner_id != session.user_id && !session.is_admin() {
            return Err(AppError::Forbidden(
                "Only the gym owner or an admin can change this gym".to_string(),
            ));
        }
        Ok(gym)
    }

    pub async fn update_gym(
        &self,
        gym_id: Uuid,
        session: &UserSession,
        request: UpdateGymRequest,
    ) -> AppResult<Gym> {
        request.validate()?;
        self.require_manageable(gym_id, session).await?;

        let name = request.name.as_deref().map(|n| require_text("name", n)).transpose()?;
        if let Some(phone) = &request.phone {
            validate_phone(phone).map_err(AppError::Validation)?;
        }
        if let Some(name) = &name {
            if self.name_taken(name, Some(gym_id)).await? {
                return Err(AppError::Conflict("A gym with this name already exists".to_string()));
            }
        }

        let gym = sqlx::query_as::<_, Gym>(&format!(
            "UPDATE gyms
             SET name = COALESCE($2, name),
                 address = COALESCE($3, address),
                 phone = COALESCE($4, phone),
                 email = COALESCE($5, email),
                 description = COALESCE($6, description),
                 updated_at = NOW()
             WHERE id = $1
             RETURNING {}",
            GYM_COLUMNS
        ))
        .bind(gym_id)
        .bind(&name)
        .bind(request.address.as_deref().map(str::trim))
        .bind(request.phone.as_deref().map(str::trim))
        .bind(request.email.as_deref().map(str::trim))
        .bind(&request.description)
        .fetch_one(&self.db)
        .await
        .map_err(name_conflict)?;

        Ok(gym)
    }

    /// Delete a gym; plans, memberships, attendance and notices cascade
    pub async fn delete_gym(&self, gym_id: Uuid, session: &UserSession) -> AppResult<()> {
        self.require_manageable(gym_id, session).await?;

        sqlx::query("DELETE FROM gyms WHERE id = $1")
            .bind(gym_id)
            .execute(&self.db)
            .await?;

        tracing::info!(gym_id = %gym_id, deleted_by = %session.user_id, "gym deleted");
        Ok(())
    }

    /// The owner's first gym with totals and its active member roster
    pub async fn my_gym_details(&self, owner_id: Uuid) -> AppResult<MyGymDetails> {
        let gym = self
            .find_owner_gym(owner_id)
            .await?
            .ok_or_else(|| AppError::NotFound("No gym found for this owner".to_string()))?;
        let today = Utc::now().date_naive();

        let mut members = sqlx::query_as::<_, GymMemberSummary>(
            "SELECT m.id AS membership_id, u.id AS member_id, u.username, u.email,
                    u.first_name, u.last_name, m.start_date AS membership_start_date,
                    (SELECT COUNT(*) FROM attendance a
                      WHERE a.member_id = u.id AND a.gym_id = m.gym_id) AS attendance_count,
                    (SELECT COUNT(*) FROM exercise_entries e WHERE e.member_id = u.id) AS total_workouts,
                    (SELECT COALESCE(SUM(e.calories_burned), 0)::BIGINT FROM exercise_entries e
                      WHERE e.member_id = u.id) AS total_calories
             FROM memberships m
             JOIN users u ON u.id = m.member_id
             WHERE m.gym_id = $1 AND m.status = 'approved'
               AND (m.end_date IS NULL OR m.end_date >= $2)
             ORDER BY u.username ASC",
        )
        .bind(gym.id)
        .bind(today)
        .fetch_all(&self.db)
        .await?;

        let attendance = AttendanceService::new(self.db.clone());
        for member in members.iter_mut() {
            let (latest, longest) = attendance.streak_summary(member.member_id, gym.id).await?;
            member.current_streak = current_streak(latest, today);
            member.longest_streak = longest;
        }

        let total_workouts = members.iter().map(|m| m.total_workouts).sum();
        let total_calories = members.iter().map(|m| m.total_calories).sum();

        Ok(MyGymDetails {
            total_members: members.len() as i64,
            total_workouts,
            total_calories,
            members,
            gym,
        })
    }

    /// Delete the owner's gym together with the owner's own account
    pub async fn delete_my_gym(&self, session: &UserSession) -> AppResult<serde_json::Value> {
        if session.user_type != UserType::GymOwner {
            return Err(AppError::Forbidden(
                "Only gym owners can access this endpoint".to_string(),
            ));
        }

        let gym = self
            .find_owner_gym(session.user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("No gym found for this owner".to_string()))?;

        let mut tx = self.db.begin().await?;
        sqlx::query("DELETE FROM gyms WHERE id = $1")
            .bind(gym.id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(session.user_id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        tracing::info!(gym_id = %gym.id, owner_id = %session.user_id, "gym and owner account deleted");

        Ok(json!({
            "message": format!(
                "Gym '{}' and owner account have been deleted along with all associated data",
                gym.name
            ),
            "account_deleted": true,
        }))
    }
}
