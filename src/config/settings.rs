//! Process settings from environment variables (after `dotenvy::dotenv()`).

use crate::error::ConfigError;
use std::net::SocketAddr;

pub const DEFAULT_SCHEMA: &str = "breakfast";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
pub const DEFAULT_MAX_BODY_BYTES: usize = 1024 * 1024;

#[derive(Clone, Debug)]
pub struct Settings {
    /// PostgreSQL URL. When unset, records live in memory for the life of the process.
    pub database_url: Option<String>,
    pub bind_addr: SocketAddr,
    /// Schema for the KV table. Must be a valid PostgreSQL identifier.
    pub schema: String,
    pub seed_data: bool,
    pub max_body_bytes: usize,
    pub db_max_connections: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            database_url: None,
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            schema: DEFAULT_SCHEMA.into(),
            seed_data: true,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            db_max_connections: 5,
        }
    }
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from any key lookup. `from_env` passes the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let bind = get("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.into());
        let bind_addr = bind.parse().map_err(|e| ConfigError::Invalid {
            key: "BIND_ADDR",
            reason: format!("{}: {}", bind, e),
        })?;

        let schema = get("BREAKFAST_SCHEMA").unwrap_or_else(|| DEFAULT_SCHEMA.into());
        if !is_identifier(&schema) {
            return Err(ConfigError::Invalid {
                key: "BREAKFAST_SCHEMA",
                reason: format!("'{}' is not a valid identifier", schema),
            });
        }

        let seed_data = match get("SEED_DATA") {
            None => true,
            Some(v) => parse_bool(&v).ok_or_else(|| ConfigError::Invalid {
                key: "SEED_DATA",
                reason: format!("expected true/false, got '{}'", v),
            })?,
        };

        let max_body_bytes = parse_number(get("MAX_BODY_BYTES"), "MAX_BODY_BYTES", DEFAULT_MAX_BODY_BYTES)?;
        let db_max_connections = parse_number(get("DB_MAX_CONNECTIONS"), "DB_MAX_CONNECTIONS", 5)?;

        Ok(Self {
            database_url: get("DATABASE_URL"),
            bind_addr,
            schema,
            seed_data,
            max_body_bytes,
            db_max_connections,
        })
    }
}

fn parse_bool(v: &str) -> Option<bool> {
    match v.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn parse_number<N: std::str::FromStr>(value: Option<String>, key: &'static str, default: N) -> Result<N, ConfigError> {
    match value {
        None => Ok(default),
        Some(v) => v.parse().map_err(|_| ConfigError::Invalid {
            key,
            reason: format!("expected a number, got '{}'", v),
        }),
    }
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
