use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::auth::{UserSession, UserType};
use crate::error::{AppError, AppResult};
use crate::models::validation::{non_blank, require_text};
use crate::models::{
    CreateExerciseEntryRequest, ExerciseEntry, ExerciseEntryQuery, UpdateExerciseEntryRequest,
    ENTRY_COLUMNS,
};

const DEFAULT_LIMIT: i64 = 50;
const MAX_LIMIT: i64 = 200;

pub struct ExerciseEntryService {
    db: PgPool,
}

impl ExerciseEntryService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    fn require_member(session: &UserSession) -> AppResult<()> {
        if session.user_type != UserType::Member {
            return Err(AppError::Forbidden(
                "Only members can log exercise entries".to_string(),
            ));
        }
        Ok(())
    }

    /// Entry owned by the caller; someone else's entry is reported as missing
    async fn get_owned(&self, entry_id: Uuid, member_id: Uuid) -> AppResult<ExerciseEntry> {
        sqlx::query_as::<_, ExerciseEntry>(&format!(
            "SELECT {} FROM exercise_entries WHERE id = $1 AND member_id = $2",
            ENTRY_COLUMNS
        ))
        .bind(entry_id)
        .bind(member_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::not_found("Exercise entry"))
    }

    pub async fn get(&self, entry_id: Uuid, session: &UserSession) -> AppResult<ExerciseEntry> {
        self.get_owned(entry_id, session.user_id).await
    }

    /// Members see their own log; gym owners see entries of their active members
    pub async fn list(&self, session: &UserSession, query: &ExerciseEntryQuery) -> AppResult<Vec<ExerciseEntry>> {
        let limit = query.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);

        let scope = match session.user_type {
            UserType::Member => "member_id = $1",
            UserType::GymOwner => {
                "member_id IN (SELECT m.member_id FROM memberships m
                               JOIN gyms g ON g.id = m.gym_id
                               WHERE g.owner_id = $1 AND m.status = 'approved'
                                 AND (m.end_date IS NULL OR m.end_date >= $6))"
            }
            UserType::Admin => {
                return Err(AppError::Forbidden(
                    "Exercise logs are only visible to members and their gym owners".to_string(),
                ))
            }
        };

        let entries = sqlx::query_as::<_, ExerciseEntry>(&format!(
            "SELECT {} FROM exercise_entries
             WHERE {}
               AND ($2::uuid IS NULL OR member_id = $2)
               AND ($3::date IS NULL OR date >= $3)
               AND ($4::date IS NULL OR date <= $4)
             ORDER BY date DESC, created_at DESC
             LIMIT $5",
            ENTRY_COLUMNS, scope
        ))
        .bind(session.user_id)
        .bind(query.member_id)
        .bind(query.from)
        .bind(query.to)
        .bind(limit)
        .bind(Utc::now().date_naive())
        .fetch_all(&self.db)
        .await?;

        Ok(entries)
    }

    pub async fn create(
        &self,
        session: &UserSession,
        request: CreateExerciseEntryRequest,
    ) -> AppResult<ExerciseEntry> {
        Self::require_member(session)?;
        request.validate()?;
        let exercise_name = require_text("exercise_name", &request.exercise_name)?;
        let now = Utc::now();

        let entry = sqlx::query_as::<_, ExerciseEntry>(&format!(
            "INSERT INTO exercise_entries (id, member_id, exercise_name, exercise_type, body_part,
                                           duration_minutes, calories_burned, sets, reps, weight_kg,
                                           notes, date, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $13)
             RETURNING {}",
            ENTRY_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(session.user_id)
        .bind(&exercise_name)
        .bind(non_blank(request.exercise_type.as_deref()))
        .bind(non_blank(request.body_part.as_deref()))
        .bind(request.duration_minutes)
        .bind(request.calories_burned)
        .bind(request.sets)
        .bind(request.reps)
        .bind(request.weight_kg)
        .bind(non_blank(request.notes.as_deref()))
        .bind(request.date.unwrap_or_else(|| now.date_naive()))
        .bind(now)
        .fetch_one(&self.db)
        .await?;

        tracing::info!(entry_id = %entry.id, member_id = %session.user_id, "exercise logged");
        Ok(entry)
    }

    pub async fn update(
        &self,
        entry_id: Uuid,
        session: &UserSession,
        request: UpdateExerciseEntryRequest,
    ) -> AppResult<ExerciseEntry> {
        request.validate()?;
        self.get_owned(entry_id, session.user_id).await?;
        let exercise_name = request
            .exercise_name
            .as_deref()
            .map(|name| require_text("exercise_name", name))
            .transpose()?;

        let entry = sqlx::query_as::<_, ExerciseEntry>(&format!(
            "UPDATE exercise_entries
             SET exercise_name = COALESCE($3, exercise_name),
                 exercise_type = COALESCE($4, exercise_type),
                 body_part = COALESCE($5, body_part),
                 duration_minutes = COALESCE($6, duration_minutes),
                 calories_burned = COALESCE($7, calories_burned),
                 sets = COALESCE($8, sets),
                 reps = COALESCE($9, reps),
                 weight_kg = COALESCE($10, weight_kg),
                 notes = COALESCE($11, notes),
                 date = COALESCE($12, date),
                 updated_at = NOW()
             WHERE id = $1 AND member_id = $2
             RETURNING {}",
            ENTRY_COLUMNS
        ))
        .bind(entry_id)
        .bind(session.user_id)
        .bind(&exercise_name)
        .bind(&request.exercise_type)
        .bind(&request.body_part)
        .bind(request.duration_minutes)
        .bind(request.calories_burned)
        .bind(request.sets)
        .bind(request.reps)
        .bind(request.weight_kg)
        .bind(&request.notes)
        .bind(request.date)
        .fetch_one(&self.db)
        .await?;

        Ok(entry)
    }

    pub async fn delete(&self, entry_id: Uuid, session: &UserSession) -> AppResult<()> {
        self.get_owned(entry_id, session.user_id).await?;

        sqlx::query("DELETE FROM exercise_entries WHERE id = $1")
            .bind(entry_id)
            .execute(&self.db)
            .await?;

        tracing::info!(entry_id = %entry_id, "exercise entry deleted");
        Ok(())
    }
}
