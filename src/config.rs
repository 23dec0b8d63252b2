//! Configuration module
//!
//! Loads configuration from environment variables.

use std::env;

use crate::auth::token::DEFAULT_TOKEN_TTL_HOURS;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Database connection URL; the in-memory store is used when absent
    pub database_url: Option<String>,

    /// Maximum database connections in pool
    pub database_max_connections: u32,

    /// Server host
    pub host: String,

    /// Server port
    pub port: u16,

    /// Environment (development, production)
    pub environment: String,

    /// Shared secret used to sign tokens
    pub secret: String,

    /// Token lifetime in hours
    pub token_ttl_hours: i64,

    /// Admin account created at startup when both are set
    pub admin_email: Option<String>,
    pub admin_password: Option<String>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let database_url = lookup("DATABASE_URL").filter(|url| !url.is_empty());

        let database_max_connections = parse_or(&lookup, "DATABASE_MAX_CONNECTIONS", 10)?;

        let host = lookup("HOST").unwrap_or_else(|| "127.0.0.1".to_string());

        let port = parse_or(&lookup, "PORT", 3000)?;

        let environment = lookup("ENVIRONMENT").unwrap_or_else(|| "development".to_string());

        let secret = lookup("SECRET")
            .filter(|secret| !secret.is_empty())
            .ok_or(ConfigError::MissingEnv("SECRET"))?;

        let token_ttl_hours = parse_or(&lookup, "TOKEN_TTL_HOURS", DEFAULT_TOKEN_TTL_HOURS)?;
        if token_ttl_hours <= 0 {
            return Err(ConfigError::InvalidValue("TOKEN_TTL_HOURS"));
        }

        let admin_email = lookup("ADMIN_EMAIL").filter(|v| !v.is_empty());
        let admin_password = lookup("ADMIN_PASSWORD").filter(|v| !v.is_empty());

        Ok(Self {
            database_url,
            database_max_connections,
            host,
            port,
            environment,
            secret,
            token_ttl_hours,
            admin_email,
            admin_password,
        })
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// Admin credentials to seed, if fully configured
    pub fn admin_credentials(&self) -> Option<(&str, &str)> {
        Some((self.admin_email.as_deref()?, self.admin_password.as_deref()?))
    }
}

fn parse_or<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(key) {
        Some(value) => value.parse().map_err(|_| ConfigError::InvalidValue(key)),
        None => Ok(default),
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnv(&'static str),

    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(&'static str),
}
