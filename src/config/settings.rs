//! Application settings loaded from environment variables.

use std::env;

use super::constants::{
    DEFAULT_CORE_BUSINESS_DATABASE_URL, DEFAULT_ERRORS_REPORTING_DATABASE_URL,
    DEFAULT_MAX_CONNECTIONS, DEFAULT_MIN_CONNECTIONS,
};

/// Application configuration
#[derive(Clone)]
pub struct Config {
    pub core_business_database_url: String,
    pub errors_reporting_database_url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub sql_logging: bool,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("core_business_database_url", &"[REDACTED]")
            .field("errors_reporting_database_url", &"[REDACTED]")
            .field("max_connections", &self.max_connections)
            .field("min_connections", &self.min_connections)
            .field("sql_logging", &self.sql_logging)
            .finish()
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Each schema has its own URL variable; `DATABASE_URL` is the shared
    /// fallback for both.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            core_business_database_url: env::var("CORE_BUSINESS_DATABASE_URL")
                .or_else(|_| env::var("DATABASE_URL"))
                .unwrap_or_else(|_| DEFAULT_CORE_BUSINESS_DATABASE_URL.to_string()),
            errors_reporting_database_url: env::var("ERRORS_REPORTING_DATABASE_URL")
                .or_else(|_| env::var("DATABASE_URL"))
                .unwrap_or_else(|_| DEFAULT_ERRORS_REPORTING_DATABASE_URL.to_string()),
            max_connections: env::var("DATABASE_MAX_CONNECTIONS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_MAX_CONNECTIONS),
            min_connections: env::var("DATABASE_MIN_CONNECTIONS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_MIN_CONNECTIONS),
            sql_logging: env::var("DATABASE_SQL_LOGGING")
                .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
                .unwrap_or(false),
        }
    }

    /// Configuration pointing both schemas at one URL.
    pub fn single(database_url: impl Into<String>) -> Self {
        let url = database_url.into();
        Self {
            core_business_database_url: url.clone(),
            errors_reporting_database_url: url,
            max_connections: DEFAULT_MAX_CONNECTIONS,
            min_connections: DEFAULT_MIN_CONNECTIONS,
            sql_logging: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_urls() {
        let config = Config::single("postgres://user:secret@db/core");
        let rendered = format!("{:?}", config);

        assert!(!rendered.contains("secret"));
        assert!(rendered.contains("[REDACTED]"));
    }

    #[test]
    fn test_single_uses_defaults() {
        let config = Config::single("sqlite::memory:");

        assert_eq!(config.core_business_database_url, "sqlite::memory:");
        assert_eq!(config.errors_reporting_database_url, "sqlite::memory:");
        assert_eq!(config.max_connections, DEFAULT_MAX_CONNECTIONS);
        assert!(!config.sql_logging);
    }
}
