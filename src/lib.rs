//! Discount Sync - dual-channel polling client for discounted product feeds
//!
//! A long-poll channel accumulates a running discount counter while a
//! short-poll channel merges newly seen products into a deduplicated list.
//! Both are gated by a single pause/resume flag and stopped by one
//! shutdown hook.

pub mod application;
pub mod domain;
pub mod infrastructure;

pub use application::{SyncEngine, SyncEvent, SyncStatus};
pub use domain::{Product, ProductForm};
pub use infrastructure::SyncConfig;
