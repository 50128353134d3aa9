use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;
use tracing::info;
use validator::{Validate, ValidationError};

/// Default values for configuration
const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_ENV: &str = "development";
const DEFAULT_PORT: u16 = 8080;
const CONFIG_DIR: &str = "config";
const DEFAULT_MIN_STOCK_LEVEL: i32 = 5;
const DEFAULT_TEMP_BARCODE_TTL_HOURS: i64 = 24;
const DEFAULT_EVENT_CHANNEL_CAPACITY: usize = 1024;

/// Application configuration structure with validation
#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Database connection URL (Postgres or SQLite)
    pub database_url: String,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Application environment
    #[serde(default = "default_environment")]
    #[validate(custom = "validate_environment")]
    pub environment: String,

    /// Logging level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Log in JSON format (structured logging)
    #[serde(default)]
    pub log_json: bool,

    /// Whether to run database migrations on startup
    #[serde(default)]
    pub auto_migrate: bool,

    /// CORS: comma-separated list of allowed origins (production)
    #[serde(default)]
    pub cors_allowed_origins: Option<String>,

    /// Allow permissive CORS fallback outside development
    #[serde(default)]
    pub cors_allow_any_origin: bool,

    /// CORS: allow credentials
    #[serde(default)]
    pub cors_allow_credentials: bool,

    /// DB pool: max connections
    #[serde(default = "default_db_max_connections")]
    pub db_max_connections: u32,

    /// DB pool: min connections
    #[serde(default = "default_db_min_connections")]
    pub db_min_connections: u32,

    /// DB timeouts (seconds)
    #[serde(default = "default_db_connect_timeout_secs")]
    pub db_connect_timeout_secs: u64,
    #[serde(default = "default_db_idle_timeout_secs")]
    pub db_idle_timeout_secs: u64,
    #[serde(default = "default_db_acquire_timeout_secs")]
    pub db_acquire_timeout_secs: u64,

    /// Event channel capacity for async event processing
    #[serde(default = "default_event_channel_capacity")]
    #[validate(custom = "validate_event_channel_capacity")]
    pub event_channel_capacity: usize,

    /// Minimum stock threshold applied to lazily created inventory rows
    #[serde(default = "default_min_stock_level")]
    #[validate(custom = "validate_min_stock_level")]
    pub default_min_stock_level: i32,

    /// Lifetime of minted temporary barcodes, in hours
    #[serde(default = "default_temp_barcode_ttl_hours")]
    pub temp_barcode_ttl_hours: i64,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    DEFAULT_PORT
}
fn default_environment() -> String {
    DEFAULT_ENV.to_string()
}
fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}
fn default_db_max_connections() -> u32 {
    10
}
fn default_db_min_connections() -> u32 {
    1
}
fn default_db_connect_timeout_secs() -> u64 {
    30
}
fn default_db_idle_timeout_secs() -> u64 {
    600
}
fn default_db_acquire_timeout_secs() -> u64 {
    8
}
fn default_event_channel_capacity() -> usize {
    DEFAULT_EVENT_CHANNEL_CAPACITY
}
fn default_min_stock_level() -> i32 {
    DEFAULT_MIN_STOCK_LEVEL
}
fn default_temp_barcode_ttl_hours() -> i64 {
    DEFAULT_TEMP_BARCODE_TTL_HOURS
}

fn validate_environment(value: &str) -> Result<(), ValidationError> {
    match value {
        "development" | "test" | "staging" | "production" => Ok(()),
        _ => Err(ValidationError::new("unknown_environment")),
    }
}

fn validate_event_channel_capacity(value: usize) -> Result<(), ValidationError> {
    if value == 0 {
        return Err(ValidationError::new("event_channel_capacity_zero"));
    }
    Ok(())
}

fn validate_min_stock_level(value: i32) -> Result<(), ValidationError> {
    if value < 0 {
        return Err(ValidationError::new("negative_min_stock_level"));
    }
    Ok(())
}

impl AppConfig {
    /// Constructor used by tests and embedding callers; file/env layering is
    /// bypassed and defaults fill the remaining fields.
    pub fn new(database_url: impl Into<String>, host: impl Into<String>, port: u16) -> Self {
        Self {
            database_url: database_url.into(),
            host: host.into(),
            port,
            environment: "test".to_string(),
            log_level: default_log_level(),
            log_json: false,
            auto_migrate: true,
            cors_allowed_origins: None,
            cors_allow_any_origin: false,
            cors_allow_credentials: false,
            db_max_connections: default_db_max_connections(),
            db_min_connections: default_db_min_connections(),
            db_connect_timeout_secs: default_db_connect_timeout_secs(),
            db_idle_timeout_secs: default_db_idle_timeout_secs(),
            db_acquire_timeout_secs: default_db_acquire_timeout_secs(),
            event_channel_capacity: default_event_channel_capacity(),
            default_min_stock_level: default_min_stock_level(),
            temp_barcode_ttl_hours: default_temp_barcode_ttl_hours(),
        }
    }

    pub fn log_level(&self) -> &str {
        &self.log_level
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development" || self.environment == "test"
    }

    /// Permissive CORS is only acceptable in development or when explicitly
    /// opted into.
    pub fn should_allow_permissive_cors(&self) -> bool {
        self.is_development() || self.cors_allow_any_origin
    }

    /// The address the server binds, from the configured host and port.
    pub fn socket_addr(&self) -> Result<std::net::SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }
}

/// Loads configuration from `config/default.toml`, an environment-specific
/// overlay, and `APP__*` environment variables (in increasing precedence).
pub fn load_config() -> Result<AppConfig, ConfigError> {
    let run_env = env::var("RUN_ENV").unwrap_or_else(|_| DEFAULT_ENV.to_string());

    let cfg = Config::builder()
        .add_source(File::with_name(&format!("{}/default", CONFIG_DIR)).required(false))
        .add_source(File::with_name(&format!("{}/{}", CONFIG_DIR, run_env)).required(false))
        .add_source(Environment::with_prefix("APP").separator("__"))
        .build()?;

    let app_config: AppConfig = cfg.try_deserialize()?;

    app_config
        .validate()
        .map_err(|e| ConfigError::Message(format!("invalid configuration: {}", e)))?;

    info!(environment = %app_config.environment, "Configuration loaded");
    Ok(app_config)
}

/// Initializes the global tracing subscriber. Called once at startup.
pub fn init_tracing(log_level: &str, json: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level.to_string()));

    if json {
        let _ = fmt().with_env_filter(filter).json().try_init();
    } else {
        let _ = fmt().with_env_filter(filter).try_init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructor_produces_valid_config() {
        let cfg = AppConfig::new("sqlite::memory:", "127.0.0.1", 18080);
        assert!(cfg.validate().is_ok());
        assert!(cfg.is_development());
        assert_eq!(cfg.default_min_stock_level, 5);
    }

    #[test]
    fn unknown_environment_fails_validation() {
        let mut cfg = AppConfig::new("sqlite::memory:", "127.0.0.1", 18080);
        cfg.environment = "prod-ish".to_string();
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn negative_min_stock_level_fails_validation() {
        let mut cfg = AppConfig::new("sqlite::memory:", "127.0.0.1", 18080);
        cfg.default_min_stock_level = -1;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn socket_addr_uses_configured_host_and_port() {
        let cfg = AppConfig::new("sqlite::memory:", "127.0.0.1", 18080);
        assert_eq!(cfg.socket_addr().unwrap().to_string(), "127.0.0.1:18080");

        let cfg = AppConfig::new("sqlite::memory:", "not a host", 18080);
        assert!(cfg.socket_addr().is_err());
    }

    #[test]
    fn permissive_cors_requires_dev_or_override() {
        let mut cfg = AppConfig::new("sqlite::memory:", "127.0.0.1", 18080);
        cfg.environment = "production".to_string();
        assert!(!cfg.should_allow_permissive_cors());
        cfg.cors_allow_any_origin = true;
        assert!(cfg.should_allow_permissive_cors());
    }
}
