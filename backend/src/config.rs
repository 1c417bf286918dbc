//! Configuration management for the replenishment server
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (development.toml, production.toml)
//! 3. Environment variable overrides with INV_ prefix

use config::{ConfigError, Environment, File};
use serde::Deserialize;

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

    /// Outbound mail configuration
    pub smtp: SmtpConfig,

    /// Notification dispatcher configuration
    pub notifications: NotificationConfig,
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
}

#[derive(Debug, Deserialize, Clone)]
pub struct JwtConfig {
    /// Secret key for validating JWT tokens issued by the auth layer
    pub secret: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SmtpConfig {
    /// SMTP relay host
    pub host: String,

    /// SMTP relay port
    pub port: u16,

    /// Sender address on outgoing notifications
    pub from: String,

    /// Base URL of the frontend, used in email bodies
    pub app_url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct NotificationConfig {
    /// Capacity of the bounded dispatch queue; events beyond it are dropped
    pub queue_capacity: usize,
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment = std::env::var("INV_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = config::Config::builder()
            // Start with default values
            .set_default("environment", environment.clone())?
            .set_default("server.port", 8000)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 2)?
            .set_default("smtp.host", "localhost")?
            .set_default("smtp.port", 25)?
            .set_default("smtp.from", "noreply@tonentreprise.com")?
            .set_default("smtp.app_url", "http://localhost:5173")?
            .set_default("notifications.queue_capacity", 64)?
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
}
