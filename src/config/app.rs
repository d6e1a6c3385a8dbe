use anyhow::{bail, Result};
use std::env;
use std::net::IpAddr;

pub const DEFAULT_JWT_SECRET: &str = "your-secret-key-change-in-production";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub environment: String,
    pub log_level: String,
    pub jwt_secret: String,
    pub access_token_ttl_minutes: i64,
    pub refresh_token_ttl_days: i64,
    pub cors_origin: Option<String>,
    pub auth_rate_limit_per_minute: u32,
    /// Addresses or CIDR blocks whose `X-Forwarded-For` is believed
    pub trusted_proxies: Vec<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            environment: "development".to_string(),
            log_level: "info".to_string(),
            jwt_secret: DEFAULT_JWT_SECRET.to_string(),
            access_token_ttl_minutes: 15,
            refresh_token_ttl_days: 30,
            cors_origin: None,
            auth_rate_limit_per_minute: 10,
            trusted_proxies: Vec::new(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let host = env::var("HOST").unwrap_or(defaults.host);
        let port = env::var("PORT")
            .ok()
            .and_then(|value| value.parse().ok())
            .unwrap_or(defaults.port);
        let environment = env::var("ENVIRONMENT").unwrap_or(defaults.environment);
        let log_level = env::var("LOG_LEVEL").unwrap_or(defaults.log_level);
        let jwt_secret = env::var("JWT_SECRET").unwrap_or(defaults.jwt_secret);
        let access_token_ttl_minutes = env::var("ACCESS_TOKEN_TTL_MINUTES")
            .ok()
            .and_then(|value| value.parse().ok())
            .unwrap_or(defaults.access_token_ttl_minutes);
        let refresh_token_ttl_days = env::var("REFRESH_TOKEN_TTL_DAYS")
            .ok()
            .and_then(|value| value.parse().ok())
            .unwrap_or(defaults.refresh_token_ttl_days);
        let cors_origin = env::var("CORS_ORIGIN").ok().filter(|value| !value.is_empty());
        let auth_rate_limit_per_minute = env::var("AUTH_RATE_LIMIT_PER_MINUTE")
            .ok()
            .and_then(|value| value.parse().ok())
            .unwrap_or(defaults.auth_rate_limit_per_minute);
        let trusted_proxies = env::var("TRUSTED_PROXIES")
            .map(|value| parse_list(&value))
            .unwrap_or(defaults.trusted_proxies);

        let config = AppConfig {
            host,
            port,
            environment,
            log_level,
            jwt_secret,
            access_token_ttl_minutes,
            refresh_token_ttl_days,
            cors_origin,
            auth_rate_limit_per_minute,
            trusted_proxies,
        };
        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.is_production() && self.jwt_secret == DEFAULT_JWT_SECRET {
            bail!("JWT_SECRET must be set in production");
        }
        if self.access_token_ttl_minutes <= 0 || self.refresh_token_ttl_days <= 0 {
            bail!("token lifetimes must be positive");
        }
        if self.auth_rate_limit_per_minute == 0 {
            bail!("AUTH_RATE_LIMIT_PER_MINUTE must be at least 1");
        }
        if let Some(entry) = self.trusted_proxies.iter().find(|entry| !is_address_or_block(entry)) {
            bail!("TRUSTED_PROXIES entry '{}' is not an IP address or CIDR block", entry);
        }
        Ok(())
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(str::to_string)
        .collect()
}

fn is_address_or_block(entry: &str) -> bool {
    match entry.split_once('/') {
        Some((network, prefix)) => {
            network.parse::<IpAddr>().is_ok() && prefix.parse::<u8>().is_ok()
        }
        None => entry.parse::<IpAddr>().is_ok(),
    }
}
