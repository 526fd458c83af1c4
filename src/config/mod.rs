//! Configuration module for the Bionary backend.
//!
//! All configuration is loaded from environment variables with sensible defaults.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Secret used to sign admin tokens (required in production)
    pub jwt_secret: Option<String>,
    /// Lifetime of an issued admin token, in hours
    pub token_ttl_hours: i64,
    /// Path to SQLite database file
    pub db_path: PathBuf,
    /// Address to bind the server to
    pub bind_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let jwt_secret = env::var("BIONARY_JWT_SECRET")
            .ok()
            .filter(|s| !s.is_empty());

        let token_ttl_hours = env::var("BIONARY_TOKEN_TTL_HOURS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(8);

        let db_path = env::var("BIONARY_DB_PATH")
            .unwrap_or_else(|_| "./data/bionary.sqlite".to_string())
            .into();

        let bind_addr = env::var("BIONARY_BIND_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:8080".to_string())
            .parse()
            .expect("Invalid BIONARY_BIND_ADDR format");

        let log_level = env::var("BIONARY_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Self {
            jwt_secret,
            token_ttl_hours,
            db_path,
            bind_addr,
            log_level,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        // Clear any existing env vars
        env::remove_var("BIONARY_JWT_SECRET");
        env::remove_var("BIONARY_TOKEN_TTL_HOURS");
        env::remove_var("BIONARY_DB_PATH");
        env::remove_var("BIONARY_BIND_ADDR");
        env::remove_var("BIONARY_LOG_LEVEL");

        let config = Config::from_env();

        assert!(config.jwt_secret.is_none());
        assert_eq!(config.token_ttl_hours, 8);
        assert_eq!(config.db_path, PathBuf::from("./data/bionary.sqlite"));
        assert_eq!(config.bind_addr.to_string(), "127.0.0.1:8080");
        assert_eq!(config.log_level, "info");
    }
}
