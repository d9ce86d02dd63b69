//! Application layer module
//!
//! The polling channels, their controller, the insertion gateway and the
//! engine that ties them to the shared state.

pub mod events;
pub mod insertion_gateway;
pub mod long_poll;
pub mod polling_controller;
pub mod shared_state;
pub mod short_poll;
pub mod sync_engine;

pub use events::{SyncEvent, SyncStatus};
pub use insertion_gateway::{InsertionError, InsertionGateway};
pub use polling_controller::PollingController;
pub use shared_state::{InsertOutcome, SharedState};
pub use sync_engine::SyncEngine;
