//! Configuration infrastructure
//!
//! Settings are layered with the `config` crate: built-in defaults, then an
//! optional file, then `DISCOUNT_SYNC__*` environment variables
//! (e.g. `DISCOUNT_SYNC__REMOTE__BASE_URL`).

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

const ENV_PREFIX: &str = "DISCOUNT_SYNC";
const APP_DIR_NAME: &str = "discount-sync";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration: {source}")]
    Load {
        #[from]
        source: config::ConfigError,
    },

    #[error("Configuration validation failed: {message}")]
    Validation { message: String },
}

/// Complete application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    pub remote: RemoteConfig,
    pub polling: PollingConfig,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
}

/// Remote service settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    /// Base URL the `/poll/long`, `/poll/short` and `/insert` paths are joined to
    pub base_url: String,

    /// Transport-level timeout in seconds; 0 leaves requests unbounded
    pub request_timeout_seconds: u64,

    pub user_agent: String,
}

/// Scheduling settings for both polling channels
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PollingConfig {
    /// Delay before the long poll is retried after a failure
    pub long_poll_retry_delay_ms: u64,

    /// Period of the short-poll tick
    pub short_poll_interval_ms: u64,

    /// Delay of the one-shot retry scheduled after a failed short poll
    pub short_poll_retry_delay_ms: u64,

    /// Skip a short poll while another one is still in flight
    pub short_poll_single_flight: bool,

    /// Whether polling starts active
    pub start_active: bool,
}

/// Key-value persistence settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory holding the store file; defaults to the user's local data directory
    pub data_dir: Option<PathBuf>,

    pub file_name: String,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: "error", "warn", "info", "debug", "trace"
    pub level: String,

    /// Write JSON lines to the log file instead of plain text
    pub json_format: bool,

    pub console_output: bool,

    pub file_output: bool,

    /// Log directory; defaults to `logs/` under the data directory
    pub log_dir: Option<PathBuf>,

    pub file_name: String,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            request_timeout_seconds: 0,
            user_agent: format!("discount-sync/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            long_poll_retry_delay_ms: 2000,
            short_poll_interval_ms: 1000,
            short_poll_retry_delay_ms: 500,
            short_poll_single_flight: false,
            start_active: true,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            file_name: "discount_sync_store.json".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
            console_output: true,
            file_output: false,
            log_dir: None,
            file_name: "discount-sync.log".to_string(),
        }
    }
}

impl PollingConfig {
    pub const fn long_poll_retry_delay(&self) -> Duration {
        Duration::from_millis(self.long_poll_retry_delay_ms)
    }

    pub const fn short_poll_interval(&self) -> Duration {
        Duration::from_millis(self.short_poll_interval_ms)
    }

    pub const fn short_poll_retry_delay(&self) -> Duration {
        Duration::from_millis(self.short_poll_retry_delay_ms)
    }
}

impl RemoteConfig {
    pub const fn request_timeout(&self) -> Option<Duration> {
        if self.request_timeout_seconds == 0 {
            None
        } else {
            Some(Duration::from_secs(self.request_timeout_seconds))
        }
    }
}

impl StorageConfig {
    pub fn resolve_data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(default_data_dir)
    }

    pub fn store_path(&self) -> PathBuf {
        self.resolve_data_dir().join(&self.file_name)
    }
}

/// `<local data dir>/discount-sync`, or `./discount-sync` when the platform has none
pub fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR_NAME)
}

impl SyncConfig {
    /// Load defaults, the optional file and the environment, then validate.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder =
            config::Config::builder().add_source(config::Config::try_from(&Self::default())?);

        if let Some(path) = path {
            info!("Loading configuration from {:?}", path);
            builder = builder.add_source(config::File::from(path).required(true));
        }

        let settings = builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: Self = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.polling.short_poll_interval_ms == 0 {
            return Err(ConfigError::Validation {
                message: "polling.short_poll_interval_ms must be greater than 0".to_string(),
            });
        }

        if let Err(e) = url::Url::parse(&self.remote.base_url) {
            return Err(ConfigError::Validation {
                message: format!("remote.base_url '{}' is not a valid URL: {}", self.remote.base_url, e),
            });
        }

        if self.storage.file_name.trim().is_empty() {
            return Err(ConfigError::Validation {
                message: "storage.file_name must not be empty".to_string(),
            });
        }

        Ok(())
    }
}
