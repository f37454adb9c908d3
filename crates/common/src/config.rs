//! Environment-derived settings for the Quarry binaries.
//!
//! Connection strings here are demo defaults; production deployments should
//! inject them through the environment or a secret store.

use std::env;

#[derive(Debug, Clone)]
pub struct Settings {
    pub api_host: String,
    pub api_port: u16,

    // Example connection targets for the SQL connectors
    pub postgres_url: Option<String>,
    pub clickhouse_url: Option<String>,
}

impl Settings {
    pub fn from_env() -> Self {
        Self {
            api_host: env::var("QUARRY_API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            api_port: env::var("QUARRY_API_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8000),
            postgres_url: env::var("QUARRY_POSTGRES_URL").ok(),
            clickhouse_url: env::var("QUARRY_CLICKHOUSE_URL").ok(),
        }
    }
}
