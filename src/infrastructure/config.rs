//! # Application Configuration
//!
//! Layered settings for the server binary.
//!
//! Sources, later ones overriding earlier ones:
//!
//! 1. Built-in defaults
//! 2. An optional TOML file (`remit-quote.toml` unless a path is given)
//! 3. Environment variables prefixed `REMIT__`, with `__` between nested
//!    keys, e.g. `REMIT__AGGREGATION__GLOBAL_TIMEOUT_MS=2500`
//!
//! A `.env` file is loaded into the process environment first, if present.
//!
//! # Examples
//!
//! ```
//! use remit_quote::infrastructure::config::AppConfig;
//!
//! let config = AppConfig::default();
//! assert!(config.validate().is_ok());
//! assert_eq!(config.rate_limit.max_requests, 15);
//! ```

use crate::infrastructure::proxy::pool::{
    DEFAULT_FAILURE_THRESHOLD, DEFAULT_MIN_SAMPLE_SIZE, DEFAULT_QUARANTINE,
};
use crate::infrastructure::proxy::probe::DEFAULT_HEALTH_CHECK_URL;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Default configuration file stem.
pub const DEFAULT_CONFIG_FILE: &str = "remit-quote";

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "REMIT";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A source could not be read or deserialized.
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    /// Values were read but are inconsistent.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// HTTP server settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Listen address.
    pub bind_addr: String,
    /// Allowed CORS origins; `*` allows any.
    pub cors_origins: Vec<String>,
    /// Interval of the background cleanup task.
    pub maintenance_interval_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8000".to_string(),
            cors_origins: vec!["*".to_string()],
            maintenance_interval_secs: 30,
        }
    }
}

/// Deadlines for one aggregation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregationSettings {
    /// Deadline for the whole fan-out.
    pub global_timeout_ms: u64,
    /// Deadline for a single provider call.
    pub per_provider_timeout_ms: u64,
}

impl Default for AggregationSettings {
    fn default() -> Self {
        Self {
            global_timeout_ms: 3000,
            per_provider_timeout_ms: 2000,
        }
    }
}

/// Per-caller admission limits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitSettings {
    /// Requests admitted per window.
    pub max_requests: usize,
    /// Window length in seconds.
    pub window_secs: u64,
}

impl Default for RateLimitSettings {
    fn default() -> Self {
        Self {
            max_requests: 15,
            window_secs: 60,
        }
    }
}

/// Response cache settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    /// Entry lifetime in seconds.
    pub ttl_secs: u64,
    /// Maximum number of entries.
    pub max_entries: usize,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            ttl_secs: 60,
            max_entries: 2048,
        }
    }
}

/// Proxy pool settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProxySettings {
    /// Read `HANPASS_PROXY_*` variables at startup.
    pub load_from_env: bool,
    /// Endpoint probed by health checks.
    pub health_check_url: String,
    /// Probe timeout in milliseconds.
    pub probe_timeout_ms: u64,
    /// Quarantine length in seconds.
    pub quarantine_secs: u64,
    /// Requests required before quarantine can trigger.
    pub min_sample_size: u64,
    /// Failure rate that must be exceeded to quarantine.
    pub failure_threshold: f64,
}

impl Default for ProxySettings {
    fn default() -> Self {
        Self {
            load_from_env: true,
            health_check_url: DEFAULT_HEALTH_CHECK_URL.to_string(),
            probe_timeout_ms: 10_000,
            quarantine_secs: DEFAULT_QUARANTINE.as_secs(),
            min_sample_size: DEFAULT_MIN_SAMPLE_SIZE,
            failure_threshold: DEFAULT_FAILURE_THRESHOLD,
        }
    }
}

/// Settings for one provider adapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderSettings {
    /// Whether the adapter is registered.
    pub enabled: bool,
    /// Endpoint override; the production URL when unset.
    pub base_url: Option<String>,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: None,
        }
    }
}

/// Settings for every built-in provider adapter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProvidersConfig {
    /// Hanpass.
    pub hanpass: ProviderSettings,
    /// E9Pay.
    pub e9pay: ProviderSettings,
    /// GME.
    pub gme: ProviderSettings,
    /// Cross.
    pub cross: ProviderSettings,
}

/// Log output settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Default filter directive when `RUST_LOG` is unset.
    pub level: String,
    /// Emit JSON lines instead of human-readable output.
    pub json: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// Complete application configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// HTTP server.
    pub server: ServerConfig,
    /// Aggregation deadlines.
    pub aggregation: AggregationSettings,
    /// Per-caller rate limit.
    pub rate_limit: RateLimitSettings,
    /// Response cache.
    pub cache: CacheSettings,
    /// Proxy pool.
    pub proxy: ProxySettings,
    /// Provider adapters.
    pub providers: ProvidersConfig,
    /// Logging.
    pub logging: LoggingSettings,
}

impl AppConfig {
    /// Loads `.env`, the optional config file and `REMIT__*` variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Load` if a source is malformed and
    /// `ConfigError::Invalid` if [`validate`](Self::validate) fails.
    pub fn load(path: Option<&Path>) -> ConfigResult<Self> {
        if let Err(e) = dotenvy::dotenv() {
            if !e.not_found() {
                tracing::warn!(error = %e, "failed to read .env file");
            }
        }

        let file = match path {
            Some(path) => config::File::from(path).required(true),
            None => config::File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };
        let settings = config::Config::builder()
            .add_source(file)
            .add_source(Self::environment(None))
            .build()?;
        Self::finish(settings)
    }

    /// Builds configuration from an inline TOML document and an explicit
    /// variable map instead of the process environment.
    ///
    /// # Errors
    ///
    /// Same as [`load`](Self::load).
    pub fn from_sources(toml: Option<&str>, env: HashMap<String, String>) -> ConfigResult<Self> {
        let mut builder = config::Config::builder();
        if let Some(toml) = toml {
            builder = builder.add_source(config::File::from_str(toml, config::FileFormat::Toml));
        }
        let settings = builder
            .add_source(Self::environment(Some(env)))
            .build()?;
        Self::finish(settings)
    }

    fn environment(source: Option<HashMap<String, String>>) -> config::Environment {
        config::Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("__")
            .separator("__")
            .try_parsing(true)
            .list_separator(",")
            .with_list_parse_key("server.cors_origins")
            .source(source)
    }

    fn finish(settings: config::Config) -> ConfigResult<Self> {
        let config: Self = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Checks cross-field constraints.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` naming the first offending setting.
    pub fn validate(&self) -> ConfigResult<()> {
        let invalid = |msg: &str| Err(ConfigError::Invalid(msg.to_string()));

        if self.server.bind_addr.parse::<SocketAddr>().is_err() {
            return Err(ConfigError::Invalid(format!(
                "server.bind_addr '{}' is not a socket address",
                self.server.bind_addr
            )));
        }
        if self.aggregation.per_provider_timeout_ms == 0 {
            return invalid("aggregation.per_provider_timeout_ms must be positive");
        }
        if self.aggregation.per_provider_timeout_ms >= self.aggregation.global_timeout_ms {
            return invalid(
                "aggregation.per_provider_timeout_ms must be shorter than global_timeout_ms",
            );
        }
        if self.rate_limit.max_requests == 0 || self.rate_limit.window_secs == 0 {
            return invalid("rate_limit.max_requests and window_secs must be positive");
        }
        if self.cache.max_entries == 0 || self.cache.ttl_secs == 0 {
            return invalid("cache.max_entries and ttl_secs must be positive");
        }
        if !(0.0..=1.0).contains(&self.proxy.failure_threshold) {
            return invalid("proxy.failure_threshold must be within [0, 1]");
        }
        Ok(())
    }

    /// Returns the listen address.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if the address does not parse.
    pub fn bind_addr(&self) -> ConfigResult<SocketAddr> {
        self.server
            .bind_addr
            .parse()
            .map_err(|e| ConfigError::Invalid(format!("server.bind_addr: {}", e)))
    }
}

impl AggregationSettings {
    /// Returns the global deadline.
    #[must_use]
    pub fn global_timeout(&self) -> Duration {
        Duration::from_millis(self.global_timeout_ms)
    }

    /// Returns the per-provider deadline.
    #[must_use]
    pub fn per_provider_timeout(&self) -> Duration {
        Duration::from_millis(self.per_provider_timeout_ms)
    }
}
