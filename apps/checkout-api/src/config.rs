//! Checkout API configuration module.
//!
//! Configuration is loaded from environment variables with fallback to
//! defaults; anything invalid fails startup rather than mispricing later.

use serde::{Deserialize, Serialize};
use std::env;

/// Checkout API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// HTTP server port
    pub http_port: u16,

    /// SQLite path for the security incident store
    pub audit_database_path: String,

    /// Optional JSON file overriding the built-in price catalog
    pub catalog_path: Option<String>,

    /// Payment gateway secret key
    pub gateway_secret_key: String,

    /// Base URL the gateway redirects back to (success/cancel pages)
    pub base_url: String,
}

impl ApiConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        let config = ApiConfig {
            http_port: env::var("CHECKOUT_HTTP_PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("CHECKOUT_HTTP_PORT".to_string()))?,

            audit_database_path: env::var("CHECKOUT_AUDIT_DB_PATH")
                .unwrap_or_else(|_| "./data/crest-audit.db".to_string()),

            catalog_path: env::var("CHECKOUT_CATALOG_PATH").ok(),

            gateway_secret_key: env::var("STRIPE_SECRET_KEY").unwrap_or_else(|_| {
                // Test-mode key for development
                // In production, this MUST be set via environment variable
                "sk_test_crest_dev_key".to_string()
            }),

            base_url: env::var("CHECKOUT_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:3001".to_string()),
        };

        if config.base_url.is_empty() {
            return Err(ConfigError::MissingRequired("CHECKOUT_BASE_URL".to_string()));
        }

        Ok(config)
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),
}
