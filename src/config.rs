use crate::error::{Error, Result};
use dotenvy::dotenv;
use std::env;
use std::ops::RangeInclusive;
use std::str::FromStr;
use std::sync::OnceLock;
use std::time::Duration;

/// Which number the replay endpoint reports in its message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReplayCount {
    /// Every entry a delivery was attempted for, whatever the outcome.
    #[default]
    Attempted,
    /// Only entries the target answered with a 2xx status.
    Delivered,
}

impl FromStr for ReplayCount {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "attempted" => Ok(Self::Attempted),
            "delivered" => Ok(Self::Delivered),
            other => Err(format!("expected `attempted` or `delivered`, got `{}`", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" | "text" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(format!("expected `pretty` or `json`, got `{}`", other)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server_address: String,
    pub database_url: String,
    pub db_max_connections: u32,
    pub forward_timeout: Duration,
    pub relay_concurrency: u32,
    pub max_body_bytes: usize,
    pub validate_target_urls: bool,
    pub replay_count: ReplayCount,
    pub log_format: LogFormat,
}

pub static CONFIG: OnceLock<Config> = OnceLock::new();

/// Upper bound for `RELAY_CONCURRENCY`.
pub const MAX_RELAY_CONCURRENCY: u32 = 1024;

impl Default for Config {
    fn default() -> Self {
        Self {
            server_address: "0.0.0.0:8000".to_string(),
            database_url: "sqlite://webhooks.db".to_string(),
            db_max_connections: 10,
            forward_timeout: Duration::from_secs(10),
            relay_concurrency: 16,
            max_body_bytes: 10 * 1024 * 1024,
            validate_target_urls: false,
            replay_count: ReplayCount::Attempted,
            log_format: LogFormat::Pretty,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();
        let defaults = Self::default();

        Ok(Self {
            server_address: get_env_or("SERVER_ADDRESS", defaults.server_address),
            database_url: get_env_or("DATABASE_URL", defaults.database_url),
            db_max_connections: get_env_parse_or("DB_MAX_CONNECTIONS", defaults.db_max_connections)?,
            forward_timeout: Duration::from_secs(check_range(
                "FORWARD_TIMEOUT_SECS",
                get_env_parse_or("FORWARD_TIMEOUT_SECS", defaults.forward_timeout.as_secs())?,
                1..=3600,
            )?),
            relay_concurrency: check_range(
                "RELAY_CONCURRENCY",
                get_env_parse_or("RELAY_CONCURRENCY", defaults.relay_concurrency)?,
                1..=MAX_RELAY_CONCURRENCY,
            )?,
            max_body_bytes: get_env_parse_or("MAX_BODY_BYTES", defaults.max_body_bytes)?,
            validate_target_urls: get_env_parse_or(
                "VALIDATE_TARGET_URLS",
                defaults.validate_target_urls,
            )?,
            replay_count: get_env_parse_or("REPLAY_COUNT", defaults.replay_count)?,
            log_format: get_env_parse_or("LOG_FORMAT", defaults.log_format)?,
        })
    }
}

fn get_env_or(name: &str, default: String) -> String {
    env::var(name).unwrap_or(default)
}

fn get_env_parse_or<T>(name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => parse_value(name, &raw),
        Err(_) => Ok(default),
    }
}

fn parse_value<T>(name: &str, raw: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse()
        .map_err(|e| Error::Config(format!("Invalid value for {}: {}", name, e)))
}

fn check_range<T>(name: &str, value: T, range: RangeInclusive<T>) -> Result<T>
where
    T: PartialOrd + std::fmt::Display,
{
    if range.contains(&value) {
        Ok(value)
    } else {
        Err(Error::Config(format!(
            "Invalid value for {}: {} is outside {}..={}",
            name,
            value,
            range.start(),
            range.end()
        )))
    }
}

pub fn init_config() -> Result<()> {
    let config = Config::from_env()?;
    CONFIG
        .set(config)
        .map_err(|_| Error::Config("Configuration has already been initialized".to_string()))?;
    Ok(())
}

pub fn get_config() -> &'static Config {
    CONFIG
        .get()
        .expect("Configuration has not been initialized")
}
