use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::persistence::WriteMode;
use crate::shared::StatsError;

pub const DEFAULT_SQLITE_PATH: &str = "stats.db";

#[derive(Debug, Clone, PartialEq)]
pub struct PrimaryStoreConfig {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub username: String,
    pub password: String,
    pub connect_timeout: Duration,
    pub write_mode: WriteMode,
}

impl Default for PrimaryStoreConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 5432,
            database: "roundstats".to_string(),
            username: "postgres".to_string(),
            password: String::new(),
            connect_timeout: Duration::from_secs(5),
            write_mode: WriteMode::Append,
        }
    }
}

impl PrimaryStoreConfig {
    pub fn from_env() -> Result<Self, StatsError> {
        let defaults = Self::default();
        Ok(Self {
            host: env::var("STATS_DB_HOST").unwrap_or(defaults.host),
            port: parse_var("STATS_DB_PORT", defaults.port)?,
            database: env::var("STATS_DB_NAME").unwrap_or(defaults.database),
            username: env::var("STATS_DB_USER").unwrap_or(defaults.username),
            password: env::var("STATS_DB_PASSWORD").unwrap_or(defaults.password),
            connect_timeout: Duration::from_secs(parse_var(
                "STATS_DB_CONNECT_TIMEOUT_SECS",
                defaults.connect_timeout.as_secs(),
            )?),
            write_mode: parse_var("STATS_WRITE_MODE", defaults.write_mode)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StatsConfig {
    pub primary: PrimaryStoreConfig,
    pub sqlite_path: String,
    /// Active identified players required before sessions are touched; 0 disables the gate
    pub min_players: usize,
    pub top_limit: u32,
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            primary: PrimaryStoreConfig::default(),
            sqlite_path: DEFAULT_SQLITE_PATH.to_string(),
            min_players: 0,
            top_limit: 10,
        }
    }
}

impl StatsConfig {
    pub fn from_env() -> Result<Self, StatsError> {
        let defaults = Self::default();
        let config = Self {
            primary: PrimaryStoreConfig::from_env()?,
            sqlite_path: env::var("STATS_SQLITE_PATH").unwrap_or(defaults.sqlite_path),
            min_players: parse_var("STATS_MIN_PLAYERS", defaults.min_players)?,
            top_limit: parse_var("STATS_TOP_LIMIT", defaults.top_limit)?,
        };
        Ok(config.normalized())
    }

    /// Replaces blank values that have a sensible default
    pub fn normalized(mut self) -> Self {
        if self.sqlite_path.trim().is_empty() {
            self.sqlite_path = DEFAULT_SQLITE_PATH.to_string();
        }
        self
    }
}

fn parse_var<T>(name: &str, default: T) -> Result<T, StatsError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| StatsError::Config(format!("Invalid {}: {}", name, e))),
        Err(_) => Ok(default),
    }
}
