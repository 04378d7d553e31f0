use std::time::Duration;

use serde::Deserialize;

use mazurka_pool::PoolOptions;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Server host (default: 127.0.0.1)
    pub host: String,

    /// Server port (default: 3001)
    pub port: u16,

    /// Database connection URL (default: postgres://postgres@localhost:5432/postgres)
    pub database_url: String,

    /// Upper bound on open database connections (default: 10)
    pub pool_max_connections: usize,

    /// How long an acquire may wait for a free connection, in milliseconds
    /// (default: 30000)
    pub pool_acquire_timeout_ms: u64,

    /// Environment: development, production, test
    pub environment: String,
}

impl Config {
    /// Load configuration from environment variables (with .env support).
    /// Missing or unparsable values fall back to the documented defaults.
    pub fn from_env() -> Self {
        // Load .env file if present (ignore errors if missing)
        let _ = dotenvy::dotenv();

        Config {
            host: std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "3001".to_string())
                .parse()
                .unwrap_or(3001),
            database_url: std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| "postgres://postgres@localhost:5432/postgres".to_string()),
            pool_max_connections: std::env::var("POOL_MAX_CONNECTIONS")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .unwrap_or(10),
            pool_acquire_timeout_ms: std::env::var("POOL_ACQUIRE_TIMEOUT_MS")
                .unwrap_or_else(|_| "30000".to_string())
                .parse()
                .unwrap_or(30_000),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
        }
    }

    /// Check if running in development mode.
    pub fn is_dev(&self) -> bool {
        self.environment == "development"
    }

    /// Get the full server address.
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_millis(self.pool_acquire_timeout_ms)
    }

    /// Pool knobs derived from this configuration.
    pub fn pool_options(&self) -> PoolOptions {
        PoolOptions::new()
            .with_max_connections(self.pool_max_connections)
            .with_acquire_timeout(self.acquire_timeout())
    }
}
