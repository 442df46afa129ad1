//! Configuration management for the Hardware Inventory Platform
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (development.toml, production.toml)
//! 3. Environment variable overrides with INV_ prefix

use chrono::FixedOffset;
use config::{ConfigError, Environment, File};
use serde::Deserialize;

use crate::error::{AppError, AppResult};

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Server configuration
    pub server: ServerConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// JWT authentication configuration
    pub jwt: JwtConfig,

    /// Which store backs the services
    pub store: StoreConfig,

    /// Report bucketing and display
    pub reporting: ReportingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Server port
    pub port: u16,

    /// Server host
    pub host: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    #[serde(default)]
    pub url: String,

    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// Minimum number of connections in the pool
    pub min_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct JwtConfig {
    /// Secret key for verifying bearer tokens
    pub secret: String,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Postgres,
    Memory,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StoreConfig {
    pub backend: StoreBackend,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ReportingConfig {
    /// Offset of the store's local calendar from UTC, in minutes
    pub utc_offset_minutes: i32,

    /// ISO currency code shown alongside monetary values
    pub currency: String,
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment = std::env::var("INV_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = config::Config::builder()
            // Start with default values
            .set_default("environment", environment.clone())?
            .set_default("server.port", 3000)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 2)?
            .set_default("jwt.secret", "development-secret-key")?
            .set_default("store.backend", "postgres")?
            .set_default("reporting.utc_offset_minutes", 480)?
            .set_default("reporting.currency", "PHP")?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (INV_ prefix)
            .add_source(
                Environment::with_prefix("INV")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Local calendar offset used to bucket report days
    pub fn utc_offset(&self) -> AppResult<FixedOffset> {
        FixedOffset::east_opt(self.reporting.utc_offset_minutes * 60).ok_or_else(|| {
            AppError::Configuration(format!(
                "reporting.utc_offset_minutes out of range: {}",
                self.reporting.utc_offset_minutes
            ))
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            server: ServerConfig::default(),
            database: DatabaseConfig {
                url: String::new(),
                max_connections: 10,
                min_connections: 2,
            },
            jwt: JwtConfig {
                secret: "development-secret-key".to_string(),
            },
            store: StoreConfig {
                backend: StoreBackend::Memory,
            },
            reporting: ReportingConfig {
                utc_offset_minutes: 480,
                currency: "PHP".to_string(),
            },
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            host: "0.0.0.0".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_offset_is_manila_time() {
        let config = Config::default();
        assert_eq!(config.utc_offset().unwrap().local_minus_utc(), 8 * 3600);
    }

    #[test]
    fn out_of_range_offset_is_a_configuration_error() {
        let mut config = Config::default();
        config.reporting.utc_offset_minutes = 24 * 60;
        assert!(matches!(
            config.utc_offset(),
            Err(AppError::Configuration(_))
        ));
    }
}
