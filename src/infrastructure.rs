//! Infrastructure layer for configuration, logging, persistence and the remote service
//!
//! The application layer only depends on the [`DiscountApi`] and
//! [`KeyValueStore`] traits; the concrete adapters live here.

pub mod config;
pub mod http_client;
pub mod key_value_store;
pub mod logging;
pub mod remote_api;
pub mod snapshot_repository;
pub mod sync_error;

pub use config::{ConfigError, LoggingConfig, PollingConfig, RemoteConfig, StorageConfig, SyncConfig};
pub use http_client::{HttpClientConfig, HttpDiscountApi};
pub use key_value_store::{FileKeyValueStore, KeyValueStore, MemoryKeyValueStore};
pub use logging::{get_log_directory, init_logging, init_logging_with_config};
pub use remote_api::DiscountApi;
pub use snapshot_repository::{COUNTER_KEY, PRODUCTS_KEY, SnapshotRepository};
pub use sync_error::{RemoteError, StorageError};
