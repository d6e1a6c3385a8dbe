use anyhow::{bail, Result};
use clap::{Args, ValueEnum};
use colored::Colorize;
use dialoguer::{Input, Password};
use std::path::Path;

use crate::api::ApiClient;
use crate::config::Config;
use crate::models::SignupRequest;

#[derive(Clone, Copy, ValueEnum)]
enum AccountType {
    Member,
    GymOwner,
}

impl AccountType {
    fn as_str(self) -> &'static str {
        match self {
            AccountType::Member => "member",
            AccountType::GymOwner => "gym_owner",
        }
    }
}

#[derive(Args)]
pub struct SignupCommand {
    /// Kind of account to create
    #[arg(long, value_enum, default_value = "member")]
    account_type: AccountType,
}

impl SignupCommand {
    pub async fn execute(self, path: Option<&Path>) -> Result<()> {
        let username: String = Input::new().with_prompt("Username").interact_text()?;
        let email: String = Input::new().with_prompt("Email").interact_text()?;
        let first_name: String = Input::new()
            .with_prompt("First name")
            .allow_empty(true)
            .interact_text()?;
        let last_name: String = Input::new()
            .with_prompt("Last name")
            .allow_empty(true)
            .interact_text()?;
        let password = Password::new()
            .with_prompt("Password")
            .with_confirmation("Confirm password", "Passwords don't match")
            .interact()?;

        if password.len() < 8 {
            bail!("Password must be at least 8 characters long");
        }

        let request = SignupRequest {
            username,
            email,
            password_confirm: password.clone(),
            password,
            user_type: self.account_type.as_str().to_string(),
            first_name,
            last_name,
        };

        let client = ApiClient::new(Config::load(path)?)?;
        let response = client.signup(&request).await?;

        println!(
            "{} Account created. Logged in as {}",
            "✓".green(),
            response.user.username.bold()
        );
        Ok(())
    }
}
