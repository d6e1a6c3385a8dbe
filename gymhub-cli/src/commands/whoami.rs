use anyhow::Result;
use colored::Colorize;
use std::path::Path;

use super::authenticated_client;

pub async fn whoami(path: Option<&Path>) -> Result<()> {
    let client = authenticated_client(path)?;
    let user = client.profile().await?;

    println!("{}", user.display_name().bold());
    println!("  Username: {}", user.username);
    println!("  Email:    {}", user.email);
    println!("  Type:     {}", user.user_type);
    println!("  User ID:  {}", user.id.to_string().dimmed());

    Ok(())
}
