//! Configuration module for the Dragon Ball browser.
//!
//! All configuration is loaded from environment variables with sensible defaults.

use std::env;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

const DEFAULT_API_URL: &str = "https://dragonball-api.com/api";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {var}: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the remote Dragon Ball API
    pub api_base_url: String,
    /// Items requested per page
    pub page_limit: u32,
    /// Fixed timeout applied to every outbound request
    pub fetch_timeout: Duration,
    /// Fraction of the rendered list after which a load-more hint fetches
    pub prefetch_threshold: f32,
    /// Load the first page of characters and planets at startup
    pub preload: bool,
    /// Address to bind the local API to
    pub bind_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let api_base_url = env::var("DRAGONBALL_API_URL")
            .unwrap_or_else(|_| DEFAULT_API_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        let page_limit: u32 = parse_var("DRAGONBALL_PAGE_LIMIT", 20)?;
        if page_limit == 0 {
            return Err(ConfigError::Invalid {
                var: "DRAGONBALL_PAGE_LIMIT",
                value: page_limit.to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }

        let fetch_timeout = Duration::from_secs(parse_var("DRAGONBALL_FETCH_TIMEOUT_SECS", 15)?);

        let prefetch_threshold: f32 = parse_var("DRAGONBALL_PREFETCH_THRESHOLD", 0.5)?;
        if !(0.0..=1.0).contains(&prefetch_threshold) {
            return Err(ConfigError::Invalid {
                var: "DRAGONBALL_PREFETCH_THRESHOLD",
                value: prefetch_threshold.to_string(),
                reason: "must be between 0 and 1".to_string(),
            });
        }

        let preload = parse_var("DRAGONBALL_PRELOAD", true)?;

        let bind_addr = parse_var(
            "DRAGONBALL_BIND_ADDR",
            SocketAddr::from(([127, 0, 0, 1], 8080)),
        )?;

        let log_level = env::var("DRAGONBALL_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            api_base_url,
            page_limit,
            fetch_timeout,
            prefetch_threshold,
            preload,
            bind_addr,
            log_level,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_URL.to_string(),
            page_limit: 20,
            fetch_timeout: Duration::from_secs(15),
            prefetch_threshold: 0.5,
            preload: true,
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8080)),
            log_level: "info".to_string(),
        }
    }
}

fn parse_var<T>(var: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(var) {
        Ok(value) => value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            var,
            value,
            reason: e.to_string(),
        }),
        Err(_) => Ok(default),
    }
}
