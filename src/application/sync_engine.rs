//! Sync engine: wires the shared state, both polling channels and the
//! insertion gateway behind one handle
//!
//! ```no_run
//! # use std::sync::Arc;
//! # use discount_sync::application::SyncEngine;
//! # use discount_sync::infrastructure::{HttpDiscountApi, MemoryKeyValueStore, SyncConfig};
//! # async fn demo() -> anyhow::Result<()> {
//! let config = SyncConfig::default();
//! let api = Arc::new(HttpDiscountApi::from_remote_config(&config.remote)?);
//! let engine = SyncEngine::start(&config.polling, api, Arc::new(MemoryKeyValueStore::new())).await;
//! engine.pause();
//! engine.resume();
//! engine.shutdown().await;
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::info;

use super::events::{EVENT_BUFFER_SIZE, SyncEvent, SyncStatus};
use super::insertion_gateway::{InsertionError, InsertionGateway};
use super::long_poll::LongPollChannel;
use super::polling_controller::PollingController;
use super::shared_state::SharedState;
use super::short_poll::{ShortPollChannel, ShortPollSettings};
use crate::domain::{Product, ProductForm};
use crate::infrastructure::{DiscountApi, KeyValueStore, PollingConfig, SnapshotRepository};

pub struct SyncEngine {
    controller: PollingController,
    state: Arc<SharedState>,
    gateway: InsertionGateway,
}

impl SyncEngine {
    /// Restore persisted state and start both polling channels.
    pub async fn start(
        config: &PollingConfig,
        api: Arc<dyn DiscountApi>,
        store: Arc<dyn KeyValueStore>,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_BUFFER_SIZE);
        let state = Arc::new(SharedState::restore(SnapshotRepository::new(store), events).await);
        let controller = PollingController::new(config.start_active);

        let long_poll = LongPollChannel::new(
            Arc::clone(&api),
            Arc::clone(&state),
            controller.subscribe(),
            controller.cancellation_token(),
            config.long_poll_retry_delay(),
        );
        controller.spawn(long_poll.run());

        let short_poll = ShortPollChannel::new(
            Arc::clone(&api),
            Arc::clone(&state),
            controller.subscribe(),
            controller.cancellation_token(),
            controller.tracker(),
            ShortPollSettings {
                interval: config.short_poll_interval(),
                retry_delay: config.short_poll_retry_delay(),
                single_flight: config.short_poll_single_flight,
            },
        );
        controller.spawn(short_poll.run());

        let gateway = InsertionGateway::new(api, Arc::clone(&state));
        info!("🚀 Sync engine started (active={})", controller.is_active());

        Self {
            controller,
            state,
            gateway,
        }
    }

    pub fn pause(&self) {
        if self.controller.pause() {
            self.state.emit(SyncEvent::PollingPaused);
        }
    }

    pub fn resume(&self) {
        if self.controller.resume() {
            self.state.emit(SyncEvent::PollingResumed);
        }
    }

    pub fn is_active(&self) -> bool {
        self.controller.is_active()
    }

    pub async fn insert(&self, form: &mut ProductForm) -> Result<Product, InsertionError> {
        self.gateway.submit(form).await
    }

    pub async fn products(&self) -> Vec<Product> {
        self.state.products().await
    }

    pub async fn discount_count(&self) -> u64 {
        self.state.discount_count().await
    }

    pub async fn status(&self) -> SyncStatus {
        SyncStatus {
            active: self.controller.is_active(),
            long_poll_loading: self.state.long_poll_loading(),
            short_poll_loading: self.state.short_poll_loading(),
            discount_count: self.state.discount_count().await,
            product_count: self.state.product_count().await,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SyncEvent> {
        self.state.subscribe()
    }

    /// End the session: drop the persisted product list, then stop every
    /// channel and pending timer. The persisted counter is kept. Insertions
    /// still in flight are rejected with [`InsertionError::ShutDown`].
    pub async fn shutdown(&self) {
        if !self.state.close().await {
            return;
        }

        self.controller.shutdown().await;
        self.state.emit(SyncEvent::ShutDown);
        info!("👋 Sync engine shut down");
    }
}
