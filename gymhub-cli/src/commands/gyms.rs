use anyhow::Result;
use colored::Colorize;
use std::path::Path;
use uuid::Uuid;

use super::authenticated_client;
use crate::models::Plan;

pub async fn list_gyms(path: Option<&Path>, city: Option<&str>) -> Result<()> {
    let client = authenticated_client(path)?;
    let gyms = client.available_gyms(city).await?;

    if gyms.is_empty() {
        println!("No gyms found.");
        return Ok(());
    }

    for gym in &gyms {
        println!("{}  {}", gym.name.bold(), gym.id.to_string().dimmed());
        println!("  {}", gym.address);
        println!(
            "  {} · {} members · run by {}",
            gym.phone, gym.member_count, gym.owner_name
        );
    }
    println!();
    println!("{} gym(s)", gyms.len());

    Ok(())
}

fn describe_plan(plan: &Plan) -> String {
    format!("{} months for ${:.2}", plan.duration_months, plan.price)
}

pub async fn show_plans(path: Option<&Path>, gym: Uuid) -> Result<()> {
    let client = authenticated_client(path)?;
    let plans = client.gym_plans(gym).await?;

    if plans.is_empty() {
        println!("This gym has no membership plans yet.");
        return Ok(());
    }

    for plan in &plans {
        println!("{}  {}", describe_plan(plan).bold(), plan.id.to_string().dimmed());
        if let Some(description) = plan.description.as_deref().filter(|d| !d.is_empty()) {
            println!("  {}", description);
        }
    }
    println!();
    println!("Join with: gymhub gyms join {} <plan-id>", gym);

    Ok(())
}

pub async fn join_gym(path: Option<&Path>, gym: Uuid, plan: Uuid) -> Result<()> {
    let client = authenticated_client(path)?;
    let membership = client.request_membership(gym, plan).await?;

    println!(
        "{} Membership requested at {} ({})",
        "✓".green(),
        membership.gym_name.bold(),
        membership.plan_details.as_deref().unwrap_or("no plan")
    );
    println!("  The gym owner will review your request.");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_plan() {
        let plan = Plan {
            id: Uuid::new_v4(),
            gym_id: Uuid::new_v4(),
            duration_months: 6,
            price: 149.5,
            description: None,
        };
        assert_eq!(describe_plan(&plan), "6 months for $149.50");
    }
}
