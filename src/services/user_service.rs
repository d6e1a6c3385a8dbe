use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::{UpdateProfileRequest, UserType};
use crate::models::{NewUser, User, USER_COLUMNS};

/// Row-level access to `users`. Errors stay as `sqlx::Error` so both the
/// auth layer and the domain services can map them into their own types.
#[derive(Debug, Clone)]
pub struct UserService {
    db: PgPool,
}

impl UserService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub async fn create_user(&self, new_user: NewUser) -> Result<User, sqlx::Error> {
        let now = Utc::now();

        sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (id, username, email, password_hash, first_name, last_name,
                                user_type, phone, date_of_birth, address, is_active,
                                created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, TRUE, $11, $11)
             RETURNING {}",
            USER_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(&new_user.username)
        .bind(&new_user.email)
        .bind(&new_user.password_hash)
        .bind(&new_user.first_name)
        .bind(&new_user.last_name)
        .bind(new_user.user_type)
        .bind(&new_user.phone)
        .bind(new_user.date_of_birth)
        .bind(&new_user.address)
        .bind(now)
        .fetch_one(&self.db)
        .await
    }

    pub async fn get_user(&self, user_id: Uuid) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS))
            .bind(user_id)
            .fetch_optional(&self.db)
            .await
    }

    /// Case-insensitive lookup by username
    pub async fn find_by_username(&self, username: &str) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE LOWER(username) = LOWER($1)",
            USER_COLUMNS
        ))
        .bind(username.trim())
        .fetch_optional(&self.db)
        .await
    }

    pub async fn email_taken(&self, email: &str, except: Option<Uuid>) -> Result<bool, sqlx::Error> {
        let taken: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM users WHERE LOWER(email) = LOWER($1)
                           AND ($2::uuid IS NULL OR id <> $2))",
        )
        .bind(email.trim())
        .bind(except)
        .fetch_one(&self.db)
        .await?;

        Ok(taken)
    }

    pub async fn update_profile(
        &self,
        user_id: Uuid,
        update: &UpdateProfileRequest,
    ) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            "UPDATE users
             SET email = COALESCE($2, email),
                 first_name = COALESCE($3, first_name),
                 last_name = COALESCE($4, last_name),
                 phone = COALESCE($5, phone),
                 date_of_birth = COALESCE($6, date_of_birth),
                 address = COALESCE($7, address),
                 updated_at = NOW()
             WHERE id = $1
             RETURNING {}",
            USER_COLUMNS
        ))
        .bind(user_id)
        .bind(update.email.as_deref().map(str::trim))
        .bind(&update.first_name)
        .bind(&update.last_name)
        .bind(&update.phone)
        .bind(update.date_of_birth)
        .bind(&update.address)
        .fetch_optional(&self.db)
        .await
    }

    pub async fn set_password_hash(&self, user_id: Uuid, password_hash: &str) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE users SET password_hash = $2, updated_at = NOW() WHERE id = $1")
            .bind(user_id)
            .bind(password_hash)
            .execute(&self.db)
            .await?;

        Ok(())
    }

    pub async fn delete_user(&self, user_id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(user_id)
            .execute(&self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn count_by_type(&self, user_type: UserType) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE user_type = $1")
            .bind(user_type)
            .fetch_one(&self.db)
            .await
    }
}
