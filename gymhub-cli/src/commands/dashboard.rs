use anyhow::Result;
use colored::Colorize;
use serde_json::Value;
use std::path::Path;

use super::authenticated_client;

/// Flat `key: value` lines for the scalar fields of a dashboard payload
fn summary_lines(stats: &Value) -> Vec<String> {
    let Some(fields) = stats.as_object() else {
        return Vec::new();
    };

    let mut lines = Vec::new();
    for (key, value) in fields {
        let label = key.replace('_', " ");
        match value {
            Value::Number(n) => lines.push(format!("{}: {}", label, n)),
            Value::Bool(b) => lines.push(format!("{}: {}", label, b)),
            Value::Object(inner) => {
                for (inner_key, inner_value) in inner {
                    if inner_value.is_number() {
                        lines.push(format!(
                            "{} {}: {}",
                            label,
                            inner_key.replace('_', " "),
                            inner_value
                        ));
                    }
                }
            }
            Value::Array(items) => lines.push(format!("{}: {}", label, items.len())),
            _ => {}
        }
    }
    lines
}

pub async fn show_dashboard(path: Option<&Path>) -> Result<()> {
    let client = authenticated_client(path)?;
    let stats = client.dashboard_stats().await?;

    let role = stats
        .get("role")
        .and_then(Value::as_str)
        .unwrap_or("dashboard")
        .replace('_', " ");
    println!("{}", format!("GymHub · {}", role).bold());
    for line in summary_lines(&stats) {
        println!("  {}", line);
    }

    Ok(())
}
