use anyhow::Result;
use clap::Args;
use colored::Colorize;
use dialoguer::{Input, Password};
use std::path::Path;

use crate::api::ApiClient;
use crate::config::Config;

#[derive(Args)]
pub struct LoginCommand {
    /// Username; prompted for when omitted
    #[arg(short, long)]
    username: Option<String>,

    /// Password; prompted for when omitted
    #[arg(long, env = "GYMHUB_PASSWORD", hide_env_values = true)]
    password: Option<String>,
}

impl LoginCommand {
    pub async fn execute(self, path: Option<&Path>) -> Result<()> {
        let username = match self.username {
            Some(username) => username,
            None => Input::new().with_prompt("Username").interact_text()?,
        };
        let password = match self.password {
            Some(password) => password,
            None => Password::new().with_prompt("Password").interact()?,
        };

        let client = ApiClient::new(Config::load(path)?)?;

        match client.login(&username, &password).await {
            Ok(response) => {
                println!("{} Logged in as {}", "✓".green(), response.user.username.bold());
                println!("  Account type: {}", response.user.user_type);
                Ok(())
            }
            Err(err) => {
                println!("{} Login failed: {}", "✗".red(), err);
                Err(err.into())
            }
        }
    }
}
