use anyhow::Result;
use colored::{ColoredString, Colorize};
use std::path::Path;

use super::authenticated_client;

fn colored_status(status: &str) -> ColoredString {
    match status {
        "approved" => status.green(),
        "pending" => status.yellow(),
        "rejected" | "terminated" => status.red(),
        _ => status.dimmed(),
    }
}

pub async fn list_memberships(path: Option<&Path>, status: Option<&str>) -> Result<()> {
    let client = authenticated_client(path)?;
    let memberships = client.memberships(status).await?;

    if memberships.is_empty() {
        println!("No memberships found.");
        return Ok(());
    }

    for membership in &memberships {
        println!(
            "{}  [{}]  {}",
            membership.gym_name.bold(),
            colored_status(&membership.effective_status),
            membership.id.to_string().dimmed()
        );
        println!("  Member: {}", membership.member_name);
        if let Some(plan) = &membership.plan_details {
            println!("  Plan:   {}", plan);
        }
        if let (Some(start), Some(end)) = (membership.start_date, membership.end_date) {
            println!("  Period: {} to {}", start, end);
        }
        if let Some(days) = membership.days_remaining {
            println!("  {} days remaining", days);
        }
    }

    Ok(())
}
