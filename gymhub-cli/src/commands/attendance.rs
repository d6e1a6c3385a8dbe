use anyhow::Result;
use colored::Colorize;
use std::path::Path;
use uuid::Uuid;

use super::authenticated_client;

pub async fn mark(path: Option<&Path>, gym: Uuid) -> Result<()> {
    let client = authenticated_client(path)?;
    let response = client.mark_attendance(gym).await?;

    println!("{} {}", "✓".green(), response.message);
    println!(
        "  Checked in at {}",
        response.attendance.check_in_time.format("%H:%M UTC")
    );
    println!("  Current streak: {} day(s)", response.current_streak.to_string().bold());

    Ok(())
}

pub async fn stats(path: Option<&Path>, gym: Uuid) -> Result<()> {
    let client = authenticated_client(path)?;
    let stats = client.attendance_stats(gym).await?;

    println!("{}", "Attendance".bold());
    println!("  Total visits:   {}", stats.total_attendance);
    println!("  Current streak: {}", stats.current_streak);
    println!("  Longest streak: {}", stats.longest_streak);
    println!("  Attendance:     {:.1}%", stats.attendance_percentage);

    Ok(())
}

pub async fn leaderboard(path: Option<&Path>, gym: Uuid) -> Result<()> {
    let client = authenticated_client(path)?;
    let entries = client.leaderboard(gym).await?;

    if entries.is_empty() {
        println!("No attendance recorded yet.");
        return Ok(());
    }

    println!(
        "{:>4}  {:<24} {:>7} {:>8} {:>8}",
        "#", "Member", "Visits", "Streak", "Longest"
    );
    for entry in &entries {
        println!(
            "{:>4}  {:<24} {:>7} {:>8} {:>8}",
            entry.rank,
            entry.member_name,
            entry.total_attendance,
            entry.current_streak,
            entry.longest_streak
        );
    }

    Ok(())
}
