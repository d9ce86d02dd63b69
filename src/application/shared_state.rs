//! State shared by the polling channels and the insertion gateway
//!
//! Every mutation is a read-modify-write performed while holding the
//! relevant lock, so concurrent merges and increments never overwrite each
//! other. Persistence failures are logged; they never undo a mutation.

use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::{Mutex, broadcast};
use tracing::{debug, info, warn};

use super::events::SyncEvent;
use crate::domain::{DiscountCounter, Product, ProductStore};
use crate::infrastructure::SnapshotRepository;

/// Result of applying an inserted product to the store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Prepended,
    /// The code was already listed; the existing entry is kept
    AlreadyPresent,
    /// The session was closed; nothing was stored
    Closed,
}

pub struct SharedState {
    products: Mutex<ProductStore>,
    closed: AtomicBool,
    counter: Mutex<DiscountCounter>,
    long_poll_loading: AtomicBool,
    short_poll_loading: AtomicBool,
    snapshots: SnapshotRepository,
    events: broadcast::Sender<SyncEvent>,
}

impl SharedState {
    /// Build the state from the persisted snapshot.
    pub async fn restore(snapshots: SnapshotRepository, events: broadcast::Sender<SyncEvent>) -> Self {
        let counter = snapshots.load_counter().await;
        let products = ProductStore::from_products(snapshots.load_products().await);
        info!(
            "Restored state: counter={}, products={}",
            counter.value(),
            products.len()
        );

        Self {
            products: Mutex::new(products),
            closed: AtomicBool::new(false),
            counter: Mutex::new(counter),
            long_poll_loading: AtomicBool::new(true),
            short_poll_loading: AtomicBool::new(true),
            snapshots,
            events,
        }
    }

    pub fn snapshots(&self) -> &SnapshotRepository {
        &self.snapshots
    }

    pub fn emit(&self, event: SyncEvent) {
        // No receivers is fine: nobody is watching.
        let _ = self.events.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SyncEvent> {
        self.events.subscribe()
    }

    /// Add a positive count to the counter and persist the new total.
    pub async fn add_discounts(&self, count: u64) -> DiscountCounter {
        let mut counter = self.counter.lock().await;
        if count == 0 {
            return *counter;
        }

        let next = counter.add(count);
        *counter = next;
        if let Err(e) = self.snapshots.save_counter(next).await {
            warn!("Failed to persist discount counter {}: {}", next.value(), e);
        }
        drop(counter);

        info!("Discounted products: +{} (total {})", count, next.value());
        self.emit(SyncEvent::CounterIncreased {
            added: count,
            total: next.value(),
        });
        next
    }

    /// Merge a short-poll response, appending products not seen yet.
    ///
    /// Filtering uses the store as it is when the response arrives; the
    /// append re-checks codes against the store at apply time.
    pub async fn merge_polled(&self, incoming: Vec<Product>) -> Vec<Product> {
        let received = incoming.len();
        let candidates = self.products.lock().await.filter_unseen(incoming);
        if candidates.is_empty() {
            debug!("Short poll returned {} products, none new", received);
            return candidates;
        }

        let (added, total) = {
            let mut store = self.products.lock().await;
            let added = store.append_new(candidates);
            (added, store.len())
        };

        if !added.is_empty() {
            let codes: Vec<String> = added.iter().map(|p| p.code.clone()).collect();
            info!("Merged {} new products: {:?}", added.len(), codes);
            self.emit(SyncEvent::ProductsMerged { codes, total });
        }
        added
    }

    /// Prepend an inserted product and persist the full collection.
    ///
    /// Does nothing once [`close`](Self::close) has run, so a late insertion
    /// cannot bring the persisted list back.
    pub async fn insert_product(&self, product: Product) -> InsertOutcome {
        let code = product.code.clone();
        let mut store = self.products.lock().await;
        if self.is_closed() {
            warn!("Product {} arrived after shutdown; not stored", code);
            return InsertOutcome::Closed;
        }

        let prepended = store.prepend(product);
        if !prepended {
            warn!("Product {} already present; keeping the existing entry", code);
        }
        if let Err(e) = self.snapshots.save_products(store.products()).await {
            warn!("Failed to persist product list: {}", e);
        }
        let total = store.len();
        drop(store);

        if prepended {
            self.emit(SyncEvent::ProductInserted { code, total });
            InsertOutcome::Prepended
        } else {
            InsertOutcome::AlreadyPresent
        }
    }

    /// Close the session and remove the persisted product list.
    ///
    /// Runs under the products lock, ordered against `insert_product`.
    /// Returns `false` if the state was already closed.
    pub async fn close(&self) -> bool {
        let _store = self.products.lock().await;
        if self.closed.swap(true, Ordering::SeqCst) {
            return false;
        }
        if let Err(e) = self.snapshots.clear_products().await {
            warn!("Failed to clear persisted products on shutdown: {}", e);
        }
        true
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    pub async fn products(&self) -> Vec<Product> {
        self.products.lock().await.products().to_vec()
    }

    pub async fn product_count(&self) -> usize {
        self.products.lock().await.len()
    }

    pub async fn discount_count(&self) -> u64 {
        self.counter.lock().await.value()
    }

    pub fn set_long_poll_loading(&self, loading: bool) {
        self.long_poll_loading.store(loading, Ordering::SeqCst);
    }

    pub fn long_poll_loading(&self) -> bool {
        self.long_poll_loading.load(Ordering::SeqCst)
    }

    pub fn set_short_poll_loading(&self, loading: bool) {
        self.short_poll_loading.store(loading, Ordering::SeqCst);
    }

    pub fn short_poll_loading(&self) -> bool {
        self.short_poll_loading.load(Ordering::SeqCst)
    }
}
