//! Configuration management for the Crop Yield Platform
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (development.toml, production.toml)
//! 3. Environment variable overrides with CYP_ prefix

use config::{builder::DefaultState, ConfigBuilder, ConfigError, Environment, File};
use serde::Deserialize;
use shared::engine::ConfidencePolicy;
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};
use std::{fmt, time::Duration};

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Server configuration
    pub server: ServerConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// Prediction engine configuration
    pub prediction: PredictionConfig,
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
    pub url: String,

    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// Minimum number of connections in the pool
    pub min_connections: u32,

    /// Seconds to wait for a pooled connection
    pub acquire_timeout_secs: u64,
}

impl DatabaseConfig {
    /// Pool that connects on first use
    ///
    /// An unreachable database shows up as a failed query, which the
    /// historical comparator recovers from, rather than a failed startup.
    pub fn lazy_pool(&self) -> Result<PgPool, sqlx::Error> {
        let options: PgConnectOptions = self.url.parse()?;
        Ok(PgPoolOptions::new()
            .max_connections(self.max_connections)
            .min_connections(self.min_connections)
            .acquire_timeout(Duration::from_secs(self.acquire_timeout_secs))
            .connect_lazy_with(options))
    }
}

/// Where historical comparisons come from
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HistoricalSourceMode {
    /// Query the `crops` table, simulating only when it fails
    Database,
    /// Run without a database and always simulate
    Synthetic,
}

impl fmt::Display for HistoricalSourceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HistoricalSourceMode::Database => f.write_str("database"),
            HistoricalSourceMode::Synthetic => f.write_str("synthetic"),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct PredictionConfig {
    pub historical_source: HistoricalSourceMode,

    /// Maximum similar records fetched per comparison
    pub history_limit: u32,

    /// Deadline for the historical query in milliseconds
    pub query_timeout_ms: u64,

    /// Cap on advisories per prediction
    pub max_recommendations: usize,

    /// Confidence bands; any band left out keeps its default
    #[serde(default)]
    pub confidence: ConfidencePolicy,
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment = std::env::var("CYP_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = Self::defaults(&environment)?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (CYP_ prefix)
            .add_source(
                Environment::with_prefix("CYP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Builder seeded with the built-in defaults for `environment`
    pub fn defaults(environment: &str) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        config::Config::builder()
            .set_default("environment", environment)?
            .set_default("server.port", 3000)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("database.url", "postgres://localhost/crop_yield")?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 2)?
            .set_default("database.acquire_timeout_secs", 30)?
            .set_default("prediction.historical_source", "database")?
            .set_default("prediction.history_limit", 10)?
            .set_default("prediction.query_timeout_ms", 2000)?
            .set_default("prediction.max_recommendations", 6)
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

impl Default for PredictionConfig {
    fn default() -> Self {
        Self {
            historical_source: HistoricalSourceMode::Database,
            history_limit: 10,
            query_timeout_ms: 2000,
            max_recommendations: shared::engine::DEFAULT_MAX_RECOMMENDATIONS,
            confidence: ConfidencePolicy::default(),
        }
    }
}
