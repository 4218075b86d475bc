//! Configuration for the storefront backend.
//!
//! All configuration is loaded from environment variables with sensible defaults.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

use crate::errors::AppError;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Pre-shared key for the admin API
    pub admin_key: Option<String>,
    /// Path to the SQLite document store
    pub db_path: PathBuf,
    /// Path to the Tantivy catalog index directory
    pub index_path: PathBuf,
    /// Address to bind the server to
    pub bind_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Raw admin WhatsApp number, as configured
    pub admin_whatsapp: Option<String>,
    /// Seed the demo catalog into an empty store on startup
    pub seed_demo: bool,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        let admin_key = non_empty_var("GIFTS_ADMIN_KEY");

        let db_path = env::var("GIFTS_DB_PATH")
            .unwrap_or_else(|_| "./data/store.sqlite".to_string())
            .into();

        let index_path = env::var("GIFTS_INDEX_PATH")
            .unwrap_or_else(|_| "./data/catalog-index".to_string())
            .into();

        let raw_addr = env::var("GIFTS_BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:8080".to_string());
        let bind_addr = raw_addr.parse().map_err(|e| {
            AppError::Internal(format!("Invalid GIFTS_BIND_ADDR {:?}: {}", raw_addr, e))
        })?;

        let log_level = env::var("GIFTS_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let admin_whatsapp =
            non_empty_var("GIFTS_ADMIN_WHATSAPP").or_else(|| non_empty_var("GIFTS_ADMIN_PHONE"));

        let seed_demo = env::var("GIFTS_SEED_DEMO")
            .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        Ok(Self {
            admin_key,
            db_path,
            index_path,
            bind_addr,
            log_level,
            admin_whatsapp,
            seed_demo,
        })
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    const VARS: [&str; 8] = [
        "GIFTS_ADMIN_KEY",
        "GIFTS_DB_PATH",
        "GIFTS_INDEX_PATH",
        "GIFTS_BIND_ADDR",
        "GIFTS_LOG_LEVEL",
        "GIFTS_ADMIN_WHATSAPP",
        "GIFTS_ADMIN_PHONE",
        "GIFTS_SEED_DEMO",
    ];

    // Single test so the env mutations never race each other.
    #[test]
    fn test_config_from_env() {
        for var in VARS {
            env::remove_var(var);
        }

        let config = Config::from_env().unwrap();
        assert!(config.admin_key.is_none());
        assert_eq!(config.db_path, PathBuf::from("./data/store.sqlite"));
        assert_eq!(config.index_path, PathBuf::from("./data/catalog-index"));
        assert_eq!(config.bind_addr.to_string(), "127.0.0.1:8080");
        assert_eq!(config.log_level, "info");
        assert!(config.admin_whatsapp.is_none());
        assert!(!config.seed_demo);

        env::set_var("GIFTS_ADMIN_PHONE", "+57 300 000 0000");
        env::set_var("GIFTS_SEED_DEMO", "TRUE");
        let config = Config::from_env().unwrap();
        assert_eq!(config.admin_whatsapp.as_deref(), Some("+57 300 000 0000"));
        assert!(config.seed_demo);

        env::set_var("GIFTS_ADMIN_WHATSAPP", "573001112233");
        let config = Config::from_env().unwrap();
        assert_eq!(config.admin_whatsapp.as_deref(), Some("573001112233"));

        env::set_var("GIFTS_BIND_ADDR", "not-an-address");
        assert!(Config::from_env().is_err());

        for var in VARS {
            env::remove_var(var);
        }
    }
}
