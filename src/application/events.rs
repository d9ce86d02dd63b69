//! Events published by the sync engine for presentation layers

use serde::Serialize;

/// Capacity of the engine's broadcast channel; slow receivers see `Lagged`.
pub const EVENT_BUFFER_SIZE: usize = 256;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SyncEvent {
    CounterIncreased { added: u64, total: u64 },
    ProductsMerged { codes: Vec<String>, total: usize },
    ProductInserted { code: String, total: usize },
    LongPollFailed { message: String },
    ShortPollFailed { message: String, retry_scheduled: bool },
    ShortPollRejected { message: String },
    PollingPaused,
    PollingResumed,
    ShutDown,
}

/// Point-in-time view of the engine for display
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncStatus {
    pub active: bool,
    pub long_poll_loading: bool,
    pub short_poll_loading: bool,
    pub discount_count: u64,
    pub product_count: usize,
}
