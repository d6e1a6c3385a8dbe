use anyhow::Result;
use colored::Colorize;
use std::path::Path;

use crate::api::ApiClient;
use crate::config::Config;

pub async fn logout(path: Option<&Path>) -> Result<()> {
    let config = Config::load(path)?;

    if !config.is_authenticated() {
        println!("You are not logged in.");
        return Ok(());
    }

    ApiClient::new(config)?.logout().await?;
    println!("{} Logged out", "✓".green());

    Ok(())
}
