use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

/// Prefix shared by every environment variable the service reads
pub const ENV_PREFIX: &str = "LUMINOUS";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading error: {message}")]
    LoadError { message: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub sessions: SessionConfig,
    pub lookup: LookupConfig,
    pub shipping: ShippingConfig,
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_timeout")]
    pub request_timeout_seconds: u64,
    #[serde(default = "default_max_request_size")]
    pub max_request_size: usize,
}

/// Where the inbox key-value store lives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    File,
    Memory,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    #[serde(default = "default_inbox_key")]
    pub inbox_key: String,
    #[serde(default = "default_storage_backend")]
    pub storage_backend: StorageBackend,
}

/// Limits on the in-memory visitor session table
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "default_max_sessions")]
    pub max_sessions: usize,
    #[serde(default = "default_session_idle_timeout")]
    pub session_idle_timeout_seconds: u64,
    #[serde(default = "default_session_sweep_interval")]
    pub session_sweep_interval_seconds: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LookupConfig {
    #[serde(default = "default_postal_lookup_base_url")]
    pub postal_lookup_base_url: String,
    #[serde(default = "default_postal_lookup_timeout")]
    pub postal_lookup_timeout_seconds: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ShippingConfig {
    #[serde(default = "default_origin_address")]
    pub origin_address: String,
    #[serde(default = "default_min_distance_km")]
    pub min_distance_km: f64,
    #[serde(default = "default_distance_span_km")]
    pub distance_span_km: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ObservabilityConfig {
    #[serde(default = "default_service_name")]
    pub service_name: String,
    #[serde(default = "default_service_version")]
    pub service_version: String,
    #[serde(default = "default_otlp_endpoint_option")]
    pub otlp_endpoint: Option<String>,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default = "default_enable_json_logging")]
    pub enable_json_logging: bool,
}

impl Config {
    pub fn from_environment() -> Result<Self, ConfigError> {
        info!("Loading configuration from environment");

        let config = Config {
            server: ServerConfig::from_env()?,
            storage: StorageConfig::from_env()?,
            sessions: SessionConfig::from_env()?,
            lookup: LookupConfig::from_env()?,
            shipping: ShippingConfig::from_env()?,
            observability: ObservabilityConfig::from_env()?,
        };

        config.validate()?;

        info!("Configuration loaded successfully");
        debug!("Configuration: {:?}", config);

        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::ValidationError {
                message: "Server port cannot be 0".to_string(),
            });
        }

        if self.server.request_timeout_seconds == 0 {
            return Err(ConfigError::ValidationError {
                message: "Request timeout cannot be 0".to_string(),
            });
        }

        if self.storage.inbox_key.trim().is_empty() {
            return Err(ConfigError::ValidationError {
                message: "Inbox key cannot be empty".to_string(),
            });
        }

        if self.sessions.max_sessions == 0
            || self.sessions.session_idle_timeout_seconds == 0
            || self.sessions.session_sweep_interval_seconds == 0
        {
            return Err(ConfigError::ValidationError {
                message: "Session limits and intervals must be greater than 0".to_string(),
            });
        }

        if let Err(e) = reqwest::Url::parse(&self.lookup.postal_lookup_base_url) {
            return Err(ConfigError::ValidationError {
                message: format!(
                    "Postal lookup base URL '{}' is invalid: {}",
                    self.lookup.postal_lookup_base_url, e
                ),
            });
        }

        if self.lookup.postal_lookup_timeout_seconds == 0 {
            return Err(ConfigError::ValidationError {
                message: "Postal lookup timeout cannot be 0".to_string(),
            });
        }

        // A request cut off mid-lookup would leave the session marked as searching
        if self.lookup.postal_lookup_timeout_seconds >= self.server.request_timeout_seconds {
            return Err(ConfigError::ValidationError {
                message: "Postal lookup timeout must be shorter than the request timeout"
                    .to_string(),
            });
        }

        if !(self.shipping.distance_span_km > 0.0) || self.shipping.min_distance_km < 0.0 {
            return Err(ConfigError::ValidationError {
                message: "Distance range must have a non-negative minimum and a positive span"
                    .to_string(),
            });
        }

        Ok(())
    }
}

/// Deserialize one section from the `LUMINOUS_*` environment
fn load_section<T: DeserializeOwned>(section: &str) -> Result<T, ConfigError> {
    let settings = config::Config::builder()
        .add_source(config::Environment::with_prefix(ENV_PREFIX))
        .build()
        .map_err(|e| ConfigError::LoadError {
            message: format!("Failed to load {} config: {}", section, e),
        })?;

    settings
        .try_deserialize()
        .map_err(|e| ConfigError::LoadError {
            message: format!("Failed to deserialize {} config: {}", section, e),
        })
}

impl ServerConfig {
    fn from_env() -> Result<Self, ConfigError> {
        load_section("server")
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }
}

impl StorageConfig {
    fn from_env() -> Result<Self, ConfigError> {
        load_section("storage")
    }
}

impl SessionConfig {
    fn from_env() -> Result<Self, ConfigError> {
        load_section("sessions")
    }

    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.session_idle_timeout_seconds)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.session_sweep_interval_seconds)
    }
}

impl LookupConfig {
    fn from_env() -> Result<Self, ConfigError> {
        load_section("lookup")
    }
}

impl ShippingConfig {
    fn from_env() -> Result<Self, ConfigError> {
        load_section("shipping")
    }
}

impl ObservabilityConfig {
    fn from_env() -> Result<Self, ConfigError> {
        load_section("observability")
    }
}

// Default value functions
pub(crate) fn default_host() -> String {
    "0.0.0.0".to_string()
}

pub(crate) fn default_port() -> u16 {
    8080
}

pub(crate) fn default_timeout() -> u64 {
    30
}

pub(crate) fn default_max_request_size() -> usize {
    1024 * 1024 // 1MB
}

pub(crate) fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}

pub(crate) fn default_inbox_key() -> String {
    "LUMINOUS_ADMIN_INBOX".to_string()
}

pub(crate) fn default_storage_backend() -> StorageBackend {
    StorageBackend::File
}

pub(crate) fn default_max_sessions() -> usize {
    10_000
}

pub(crate) fn default_session_idle_timeout() -> u64 {
    60 * 60
}

pub(crate) fn default_session_sweep_interval() -> u64 {
    60
}

pub(crate) fn default_postal_lookup_base_url() -> String {
    crate::services::postal_lookup::DEFAULT_POSTAL_LOOKUP_BASE_URL.to_string()
}

pub(crate) fn default_postal_lookup_timeout() -> u64 {
    10
}

pub(crate) fn default_origin_address() -> String {
    "Rua Rui Costa, 520, CEP 58046-085, João Pessoa - PB".to_string()
}

pub(crate) fn default_min_distance_km() -> f64 {
    0.5
}

pub(crate) fn default_distance_span_km() -> f64 {
    15.0
}

pub(crate) fn default_service_name() -> String {
    "luminous-storefront".to_string()
}

pub(crate) fn default_service_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

pub(crate) fn default_otlp_endpoint_option() -> Option<String> {
    std::env::var("LUMINOUS_OTLP_ENDPOINT").ok()
}

pub(crate) fn default_enable_json_logging() -> bool {
    std::env::var("LUMINOUS_ENABLE_JSON_LOGGING")
        .map(|v| v.to_lowercase() == "true")
        .unwrap_or(false)
}

pub(crate) fn default_log_level() -> String {
    "info".to_string()
}
