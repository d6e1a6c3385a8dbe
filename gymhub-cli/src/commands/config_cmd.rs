use anyhow::Result;
use std::path::Path;

use crate::config::Config;

fn masked(token: &str) -> String {
    if token.is_empty() {
        String::new()
    } else {
        format!("{}…", token.chars().take(8).collect::<String>())
    }
}

pub fn show_config(path: Option<&Path>) -> Result<()> {
    let mut config = Config::load(path)?;
    config.auth.access_token = masked(&config.auth.access_token);
    config.auth.refresh_token = masked(&config.auth.refresh_token);

    println!("# {}", config.path()?.display());
    println!("{}", toml::to_string_pretty(&config)?);

    Ok(())
}

pub fn init_config(path: Option<&Path>, force: bool) -> Result<()> {
    let file = match path {
        Some(path) => path.to_path_buf(),
        None => Config::default_path()?,
    };

    if file.exists() && !force {
        println!("Configuration file already exists at: {}", file.display());
        println!("Use --force to overwrite");
        return Ok(());
    }

    Config::default().with_path(&file).save()?;
    println!("✓ Configuration initialized at: {}", file.display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_masked() {
        assert_eq!(masked(""), "");
        assert_eq!(masked("eyJhbGciOiJIUzI1NiJ9.payload"), "eyJhbGci…");
    }
}
