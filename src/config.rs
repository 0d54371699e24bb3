//! Service configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `DATABASE_URL` - `PostgreSQL` connection string
//!
//! ## Optional
//! - `HOST` - Bind address (default: 0.0.0.0)
//! - `PORT` - Listen port (default: 8083)
//! - `DB_MAX_CONNECTIONS` - Pool size (default: 10)
//! - `NATS_URL` - Event bus for order lifecycle events
//! - `PRICE_DECIMAL_PLACES` - Scale of exposed prices (default: 2)
//! - `REQUIRE_EMAIL_CONFIRMATION` - New accounts start inactive (default: false)
//! - `RUN_MIGRATIONS` - Apply migrations at start-up (default: true)

use std::net::{IpAddr, SocketAddr};

use thiserror::Error;

const MAX_DECIMAL_PLACES: u32 = 10;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub host: IpAddr,
    pub port: u16,
    pub db_max_connections: u32,
    pub nats_url: Option<String>,
    pub price_decimal_places: u32,
    pub require_email_confirmation: bool,
    pub run_migrations: bool,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("database_url", &"[REDACTED]")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("db_max_connections", &self.db_max_connections)
            .field("nats_url", &self.nats_url)
            .field("price_decimal_places", &self.price_decimal_places)
            .field("require_email_confirmation", &self.require_email_confirmation)
            .field("run_migrations", &self.run_migrations)
            .finish()
    }
}

impl Config {
    /// Load configuration from the process environment.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a required variable is missing or a value
    /// does not parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let database_url = get("DATABASE_URL").ok_or_else(|| ConfigError::MissingEnvVar("DATABASE_URL".to_string()))?;
        let host = parse_or(get("HOST"), "HOST", IpAddr::from([0, 0, 0, 0]))?;
        let port = parse_or(get("PORT"), "PORT", 8083u16)?;
        let db_max_connections = parse_or(get("DB_MAX_CONNECTIONS"), "DB_MAX_CONNECTIONS", 10u32)?;
        let price_decimal_places = parse_or(get("PRICE_DECIMAL_PLACES"), "PRICE_DECIMAL_PLACES", 2u32)?;
        if price_decimal_places > MAX_DECIMAL_PLACES {
            return Err(ConfigError::InvalidEnvVar(
                "PRICE_DECIMAL_PLACES".to_string(),
                format!("must be at most {MAX_DECIMAL_PLACES}"),
            ));
        }
        let require_email_confirmation = parse_or(get("REQUIRE_EMAIL_CONFIRMATION"), "REQUIRE_EMAIL_CONFIRMATION", false)?;
        let run_migrations = parse_or(get("RUN_MIGRATIONS"), "RUN_MIGRATIONS", true)?;

        Ok(Self {
            database_url,
            host,
            port,
            db_max_connections,
            nats_url: get("NATS_URL"),
            price_decimal_places,
            require_email_confirmation,
            run_migrations,
        })
    }

    /// Returns the socket address for binding the server.
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

fn parse_or<T>(raw: Option<String>, key: &str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        Some(value) => value.trim().parse().map_err(|e: T::Err| ConfigError::InvalidEnvVar(key.to_string(), e.to_string())),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(pairs: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[("DATABASE_URL", "postgres://localhost/orders")]).unwrap();
        assert_eq!(config.socket_addr().to_string(), "0.0.0.0:8083");
        assert_eq!(config.db_max_connections, 10);
        assert_eq!(config.price_decimal_places, 2);
        assert!(!config.require_email_confirmation);
        assert!(config.run_migrations);
        assert!(config.nats_url.is_none());
    }

    #[test]
    fn test_missing_database_url() {
        assert_eq!(load(&[]).unwrap_err(), ConfigError::MissingEnvVar("DATABASE_URL".to_string()));
        assert!(load(&[("DATABASE_URL", "  ")]).is_err());
    }

    #[test]
    fn test_invalid_values() {
        let err = load(&[("DATABASE_URL", "postgres://x"), ("PORT", "eighty")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(ref key, _) if key == "PORT"));
        let err = load(&[("DATABASE_URL", "postgres://x"), ("PRICE_DECIMAL_PLACES", "11")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(ref key, _) if key == "PRICE_DECIMAL_PLACES"));
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("DATABASE_URL", "postgres://x"),
            ("HOST", "127.0.0.1"),
            ("PORT", "3000"),
            ("REQUIRE_EMAIL_CONFIRMATION", "true"),
            ("NATS_URL", "nats://localhost:4222"),
        ])
        .unwrap();
        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:3000");
        assert!(config.require_email_confirmation);
        assert_eq!(config.nats_url.as_deref(), Some("nats://localhost:4222"));
    }

    #[test]
    fn test_debug_redacts_database_url() {
        let config = load(&[("DATABASE_URL", "postgres://user:hunter2@db/orders")]).unwrap();
        assert!(!format!("{config:?}").contains("hunter2"));
    }
}
