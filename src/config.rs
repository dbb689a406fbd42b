use anyhow::{Context, Result};
use std::env;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub discord_token: String,
    pub database_url: String,
    pub session_max_age: Duration,
    pub sweep_interval: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();

        let discord_token = env::var("DISCORD_TOKEN")
            .map_err(|_| anyhow::anyhow!("DISCORD_TOKEN environment variable is required"))?;

        let database_url =
            env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite:standup.db".to_string());

        let max_age_minutes = parse_env_u64("STANDUP_SESSION_MAX_AGE_MINUTES", 60)?;
        let sweep_secs = parse_env_u64("STANDUP_SWEEP_INTERVAL_SECS", 300)?;

        Ok(Config {
            discord_token,
            database_url,
            session_max_age: Duration::from_secs(max_age_minutes * 60),
            sweep_interval: Duration::from_secs(sweep_secs.max(1)),
        })
    }
}

fn parse_env_u64(key: &str, default: u64) -> Result<u64> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<u64>()
            .with_context(|| format!("{} must be a non-negative integer, got {:?}", key, raw)),
        Err(_) => Ok(default),
    }
}
