//! Process settings from environment variables.

use crate::error::ConfigError;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

#[derive(Clone, Debug)]
pub struct Settings {
    pub database_url: String,
    pub port: u16,
    pub max_connections: u32,
    /// Total connect attempts at startup, at least 1.
    pub connect_retries: u32,
    pub retry_delay: Duration,
    /// JSON registry file; `None` uses the built-in registry.
    pub registry_path: Option<PathBuf>,
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL")
            .filter(|s| !s.trim().is_empty())
            .ok_or(ConfigError::MissingEnv("DATABASE_URL"))?;
        let port = parse_or(&lookup, "PORT", 8080u16)?;
        let max_connections = parse_or(&lookup, "DB_MAX_CONNECTIONS", 5u32)?;
        let connect_retries = parse_or(&lookup, "DB_CONNECT_RETRIES", 5u32)?.max(1);
        let retry_delay = Duration::from_secs(parse_or(&lookup, "DB_RETRY_DELAY_SECS", 2u64)?);
        let registry_path = lookup("REGISTRY_PATH")
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from);
        Ok(Settings {
            database_url,
            port,
            max_connections,
            connect_retries,
            retry_delay,
            registry_path,
        })
    }
}

fn parse_or<F, T>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(name) {
        None => Ok(default),
        Some(v) if v.trim().is_empty() => Ok(default),
        Some(v) => v.trim().parse().map_err(|_| ConfigError::InvalidEnv { name, value: v }),
    }
}
