use std::env;
use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;

use log::info;

use crate::error::ConfigError;

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: &str = "8089";
const DEFAULT_POOL_MAX_SIZE: &str = "10";
const DEFAULT_CONNECT_TIMEOUT_SECS: &str = "5";

/// Process configuration, read once at startup and passed down explicitly.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database: DatabaseConfig,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DatabaseConfig {
    pub url: String,
    pub pool_max_size: u32,
    pub connection_timeout: Duration,
}

impl AppConfig {
    /// Reads the configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    ///
    /// # Errors
    /// - `ConfigError::Missing` when `DATABASE_URL` is absent or blank.
    /// - `ConfigError::Invalid` when a value does not parse or is out of range.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let url = lookup("DATABASE_URL")
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .ok_or(ConfigError::Missing("DATABASE_URL"))?;

        let host = lookup("HOST")
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port: u16 = try_load(&lookup, "PORT", DEFAULT_PORT)?;
        let pool_max_size: u32 =
            try_load(&lookup, "DATABASE_POOL_MAX_SIZE", DEFAULT_POOL_MAX_SIZE)?;
        let connect_timeout_secs: u64 = try_load(
            &lookup,
            "DATABASE_CONNECT_TIMEOUT_SECS",
            DEFAULT_CONNECT_TIMEOUT_SECS,
        )?;

        ensure_positive("DATABASE_POOL_MAX_SIZE", u64::from(pool_max_size))?;
        ensure_positive("DATABASE_CONNECT_TIMEOUT_SECS", connect_timeout_secs)?;

        Ok(Self {
            host,
            port,
            database: DatabaseConfig {
                url,
                pool_max_size,
                connection_timeout: Duration::from_secs(connect_timeout_secs),
            },
        })
    }
}

fn try_load<T, F>(lookup: &F, key: &'static str, default: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
    F: Fn(&str) -> Option<String>,
{
    let raw = lookup(key).unwrap_or_else(|| {
        info!("{}", default_event(key, default));
        default.to_string()
    });
    raw.trim().parse().map_err(|err: T::Err| ConfigError::Invalid {
        key,
        value: raw.clone(),
        reason: err.to_string(),
    })
}

fn default_event(key: &str, default: &str) -> String {
    format!("event=config_default module=config status=ok key={key} default={default}")
}

fn ensure_positive(key: &'static str, value: u64) -> Result<(), ConfigError> {
    if value == 0 {
        return Err(ConfigError::Invalid {
            key,
            value: value.to_string(),
            reason: "must be at least 1".to_string(),
        });
    }
    Ok(())
}
