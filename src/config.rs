use anyhow::{Context, Result};
use std::time::Duration;

pub const DEFAULT_TRANSLATE_API_URL: &str = "https://translate.googleapis.com/translate_a/single";

#[derive(Debug, Clone)]
pub struct Config {
    // Database
    pub database_url: Option<String>,
    pub database_max_connections: u32,

    // Translation provider
    pub translate_api_url: String,
    pub translate_timeout: Duration,

    // Server
    pub port: u16,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            // Database - unset means in-memory store
            database_url: std::env::var("DATABASE_URL")
                .ok()
                .filter(|v| !v.trim().is_empty()),
            database_max_connections: parse_var("DATABASE_MAX_CONNECTIONS", 5)?,

            // Translation provider
            translate_api_url: std::env::var("TRANSLATE_API_URL")
                .unwrap_or_else(|_| DEFAULT_TRANSLATE_API_URL.to_string()),
            translate_timeout: Duration::from_secs(parse_var("TRANSLATE_TIMEOUT_SECS", 10)?),

            // Server
            port: parse_var("PORT", 8080)?,
        })
    }
}

/// Read an optional numeric variable; `default` when unset, error when unparseable
fn parse_var<T>(name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(name) {
        Ok(value) => value
            .trim()
            .parse()
            .with_context(|| format!("{} must be a number, got {:?}", name, value)),
        Err(_) => Ok(default),
    }
}
