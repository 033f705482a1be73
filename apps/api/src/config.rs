//! API server configuration.
//!
//! Layered with the `config` crate, later sources overriding earlier ones:
//!
//! ```text
//! built-in defaults  →  config/stockroom.toml (optional)  →  STOCKROOM__* env vars
//! ```
//!
//! `STOCKROOM__HTTP__PORT=8080` overrides `[http] port`,
//! `STOCKROOM__DATABASE__PATH=/var/lib/stockroom.db` overrides `[database] path`.

use config::{builder::DefaultState, Config, ConfigBuilder, Environment, File};
use serde::Deserialize;
use std::time::Duration;
use stockroom_db::{DbConfig, RetryPolicy};

/// Config file looked up relative to the working directory, any supported extension.
pub const CONFIG_FILE: &str = "config/stockroom";

/// Prefix for environment overrides.
pub const ENV_PREFIX: &str = "STOCKROOM";

/// Top-level API configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub http: HttpConfig,
    pub database: DatabaseConfig,
    pub startup: StartupConfig,

    /// `tracing_subscriber::EnvFilter` directive used when `RUST_LOG` is unset.
    pub log_filter: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// SQLite file, created on first start.
    pub path: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout_secs: u64,
    pub busy_timeout_ms: u64,
}

/// How the server retries its first database connection.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct StartupConfig {
    pub connect_attempts: u32,
    pub initial_backoff_ms: u64,
    pub max_backoff_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        ApiConfig {
            http: HttpConfig::default(),
            database: DatabaseConfig::default(),
            startup: StartupConfig::default(),
            log_filter: "info,stockroom_api=debug,stockroom_db=info,tower_http=info".to_string(),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        HttpConfig {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        DatabaseConfig {
            path: "./data/stockroom.db".to_string(),
            max_connections: 5,
            min_connections: 1,
            connect_timeout_secs: 30,
            busy_timeout_ms: 5000,
        }
    }
}

impl Default for StartupConfig {
    fn default() -> Self {
        StartupConfig {
            connect_attempts: 5,
            initial_backoff_ms: 500,
            max_backoff_secs: 5,
        }
    }
}

impl ApiConfig {
    /// Loads defaults, then the optional config file, then the environment.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_builder(
            Config::builder()
                .add_source(File::with_name(CONFIG_FILE).required(false))
                .add_source(
                    Environment::with_prefix(ENV_PREFIX)
                        .separator("__")
                        .try_parsing(true),
                ),
        )
    }

    fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self, ConfigError> {
        let config: ApiConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.database.path.trim().is_empty() {
            return Err(ConfigError::MissingRequired("database.path".to_string()));
        }
        if self.database.max_connections == 0 {
            return Err(ConfigError::InvalidValue(
                "database.max_connections must be at least 1".to_string(),
            ));
        }
        if self.database.min_connections > self.database.max_connections {
            return Err(ConfigError::InvalidValue(
                "database.min_connections exceeds database.max_connections".to_string(),
            ));
        }
        if self.startup.connect_attempts == 0 {
            return Err(ConfigError::InvalidValue(
                "startup.connect_attempts must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// `host:port` for the TCP listener.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.http.host, self.http.port)
    }

    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(&self.database.path)
            .max_connections(self.database.max_connections)
            .min_connections(self.database.min_connections)
            .connect_timeout(Duration::from_secs(self.database.connect_timeout_secs))
            .busy_timeout(Duration::from_millis(self.database.busy_timeout_ms))
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.startup.connect_attempts,
            initial_backoff: Duration::from_millis(self.startup.initial_backoff_ms),
            max_backoff: Duration::from_secs(self.startup.max_backoff_secs),
        }
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Invalid configuration: {0}")]
    InvalidValue(String),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),
}
