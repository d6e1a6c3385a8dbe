use anyhow::{Context, Result};
use sqlx::PgPool;
use std::env;

use crate::auth::{hash_password, UserType};
use crate::models::NewUser;
use crate::services::UserService;

/// Admin account created at startup. Admins cannot sign up through the API.
#[derive(Debug, Clone)]
pub struct SeedConfig {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl SeedConfig {
    /// `None` unless ADMIN_USERNAME, ADMIN_EMAIL and ADMIN_PASSWORD are all set
    pub fn from_env() -> Option<Self> {
        let read = |key: &str| env::var(key).ok().filter(|value| !value.trim().is_empty());

        Some(Self {
            username: read("ADMIN_USERNAME")?,
            email: read("ADMIN_EMAIL")?,
            password: read("ADMIN_PASSWORD")?,
        })
    }
}

/// Create the configured admin unless the username already exists.
/// Returns whether an account was created.
pub async fn seed_admin(pool: &PgPool, seed: &SeedConfig) -> Result<bool> {
    let users = UserService::new(pool.clone());

    if users.find_by_username(&seed.username).await?.is_some() {
        tracing::debug!(username = %seed.username, "Admin account already present");
        return Ok(false);
    }

    let password_hash =
        hash_password(&seed.password).context("ADMIN_PASSWORD does not meet the password policy")?;

    let admin = users
        .create_user(NewUser {
            username: seed.username.clone(),
            email: seed.email.to_lowercase(),
            password_hash,
            first_name: String::new(),
            last_name: String::new(),
            user_type: UserType::Admin,
            phone: None,
            date_of_birth: None,
            address: None,
        })
        .await
        .context("failed to create admin account")?;

    tracing::info!(user_id = %admin.id, username = %admin.username, "Seeded admin account");
    Ok(true)
}
