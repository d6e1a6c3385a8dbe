use anyhow::Result;
use colored::Colorize;
use std::path::Path;

use super::authenticated_client;

pub async fn list_notices(path: Option<&Path>) -> Result<()> {
    let client = authenticated_client(path)?;
    let notices = client.notices().await?;

    if notices.is_empty() {
        println!("No notices.");
        return Ok(());
    }

    for notice in &notices {
        println!(
            "{}  {} · {}",
            notice.title.bold(),
            notice.gym_name,
            notice.created_at_formatted.dimmed()
        );
        println!("  {}", notice.message);
        println!();
    }

    Ok(())
}
