//! Configuration module for invoicing-service.

use crate::services::DbConfig;
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;

#[derive(Debug, Clone)]
pub struct InvoicingConfig {
    pub common: core_config::Config,
    pub service_name: String,
    pub log_level: String,
    pub otlp_endpoint: Option<String>,
    pub database: DatabaseConfig,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub run_migrations: bool,
}

impl DatabaseConfig {
    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(self.url.clone())
            .max_connections(self.max_connections)
            .min_connections(self.min_connections)
            .run_migrations(self.run_migrations)
    }
}

impl InvoicingConfig {
    pub fn from_env() -> Result<Self, AppError> {
        let common = core_config::Config::load()?;

        Ok(Self {
            common,
            service_name: env::var("SERVICE_NAME")
                .unwrap_or_else(|_| "invoicing-service".to_string()),
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            otlp_endpoint: env::var("OTLP_ENDPOINT").ok().filter(|s| !s.is_empty()),
            database: DatabaseConfig {
                url: env::var("DATABASE_URL")
                    .unwrap_or_else(|_| "sqlite://invoices.db".to_string()),
                max_connections: parse_or("DATABASE_MAX_CONNECTIONS", 5)?,
                min_connections: parse_or("DATABASE_MIN_CONNECTIONS", 1)?,
                run_migrations: parse_or("DATABASE_RUN_MIGRATIONS", true)?,
            },
        })
    }

    /// In-memory database on a random port, used by tests.
    pub fn in_memory() -> Self {
        Self {
            common: core_config::Config {
                port: 0,
                ..Default::default()
            },
            service_name: "invoicing-service-test".to_string(),
            log_level: "debug".to_string(),
            otlp_endpoint: None,
            database: DatabaseConfig {
                url: "sqlite::memory:".to_string(),
                max_connections: 1,
                min_connections: 1,
                run_migrations: true,
            },
        }
    }
}

fn parse_or<T: std::str::FromStr>(key: &str, default: T) -> Result<T, AppError> {
    match env::var(key) {
        Ok(raw) => raw
            .parse()
            .map_err(|_| AppError::ConfigError(anyhow::anyhow!("{} has an invalid value: {}", key, raw))),
        Err(_) => Ok(default),
    }
}
