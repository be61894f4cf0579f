//! Configuration Module
//!
//! Handles loading and managing server configuration from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::store::DbConfig;

/// Which durable store the server talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres,
    Memory,
}

impl FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(StoreBackend::Postgres),
            "memory" => Ok(StoreBackend::Memory),
            other => Err(format!("unknown store backend: {}", other)),
        }
    }
}

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Maximum number of entries the cache can hold
    pub cache_capacity: usize,
    /// HTTP server port
    pub server_port: u16,
    /// Stats reporter interval in seconds
    pub stats_interval: u64,
    /// Largest accepted write payload in bytes
    pub max_value_size: usize,
    /// Durable store backend
    pub store_backend: StoreBackend,
    /// PostgreSQL connection parameters
    pub db: DbConfig,
}

fn env_parse<T: FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.parse().ok())
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// Unparseable or zero values fall back to the default.
    ///
    /// # Environment Variables
    /// - `CACHE_CAPACITY` - Maximum cache entries (default: 1000)
    /// - `SERVER_PORT` - HTTP server port (default: 8080)
    /// - `STATS_INTERVAL` - Stats report frequency in seconds (default: 5)
    /// - `MAX_VALUE_SIZE` - Largest write payload in bytes (default: 1 MiB)
    /// - `STORE_BACKEND` - `postgres` or `memory` (default: postgres)
    /// - `DB_*` - see [`DbConfig::from_env`]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            cache_capacity: env_parse("CACHE_CAPACITY")
                .filter(|&n: &usize| n > 0)
                .unwrap_or(defaults.cache_capacity),
            server_port: env_parse("SERVER_PORT").unwrap_or(defaults.server_port),
            stats_interval: env_parse("STATS_INTERVAL")
                .filter(|&n: &u64| n > 0)
                .unwrap_or(defaults.stats_interval),
            max_value_size: env_parse("MAX_VALUE_SIZE")
                .filter(|&n: &usize| n > 0)
                .unwrap_or(defaults.max_value_size),
            store_backend: env_parse("STORE_BACKEND").unwrap_or(defaults.store_backend),
            db: DbConfig::from_env(),
        }
    }

    pub fn stats_period(&self) -> Duration {
        Duration::from_secs(self.stats_interval)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cache_capacity: 1000,
            server_port: 8080,
            stats_interval: 5,
            max_value_size: 1024 * 1024,
            store_backend: StoreBackend::Postgres,
            db: DbConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.cache_capacity, 1000);
        assert_eq!(config.server_port, 8080);
        assert_eq!(config.stats_interval, 5);
        assert_eq!(config.max_value_size, 1024 * 1024);
        assert_eq!(config.store_backend, StoreBackend::Postgres);
        assert_eq!(config.stats_period(), Duration::from_secs(5));
    }

    #[test]
    fn test_config_from_env_defaults() {
        // Clear any existing env vars to test defaults
        env::remove_var("CACHE_CAPACITY");
        env::remove_var("SERVER_PORT");
        env::remove_var("STATS_INTERVAL");
        env::remove_var("MAX_VALUE_SIZE");
        env::remove_var("STORE_BACKEND");

        let config = Config::from_env();
        assert_eq!(config.cache_capacity, 1000);
        assert_eq!(config.server_port, 8080);
        assert_eq!(config.stats_interval, 5);
        assert_eq!(config.store_backend, StoreBackend::Postgres);
    }

    #[test]
    fn test_store_backend_parse() {
        assert_eq!("memory".parse::<StoreBackend>(), Ok(StoreBackend::Memory));
        assert_eq!(" Postgres ".parse::<StoreBackend>(), Ok(StoreBackend::Postgres));
        assert!("sqlite".parse::<StoreBackend>().is_err());
    }
}
