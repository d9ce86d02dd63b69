//! Short-poll channel feeding the product store
//!
//! A periodic tick runs for the whole engine lifetime and is a no-op while
//! paused. A tick is skipped while the previous tick's request is still
//! pending. A failed request additionally schedules one retry after a short
//! delay; the retry does not replace the tick, so a tick and a retry can be
//! in flight at the same time, never more. `single_flight` turns that
//! overlap off.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, error, info, warn};

use super::events::SyncEvent;
use super::shared_state::SharedState;
use crate::infrastructure::DiscountApi;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShortPollSettings {
    pub interval: Duration,
    pub retry_delay: Duration,
    pub single_flight: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PollOrigin {
    Tick,
    Retry,
}

/// Result of one fetch-and-merge pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// Paused, shut down, or skipped by single-flight
    Skipped,
    Merged { added: usize },
    /// Response arrived but was not an array of products
    Rejected,
    /// Network-level failure
    Failed,
}

pub struct ShortPollChannel {
    api: Arc<dyn DiscountApi>,
    state: Arc<SharedState>,
    active: watch::Receiver<bool>,
    cancellation_token: CancellationToken,
    tracker: TaskTracker,
    settings: ShortPollSettings,
    in_flight: AtomicUsize,
    tick_pending: AtomicBool,
    retry_pending: AtomicBool,
}

struct InFlightGuard<'a>(&'a AtomicUsize);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl ShortPollChannel {
    pub fn new(
        api: Arc<dyn DiscountApi>,
        state: Arc<SharedState>,
        active: watch::Receiver<bool>,
        cancellation_token: CancellationToken,
        tracker: TaskTracker,
        settings: ShortPollSettings,
    ) -> Arc<Self> {
        Arc::new(Self {
            api,
            state,
            active,
            cancellation_token,
            tracker,
            settings,
            in_flight: AtomicUsize::new(0),
            tick_pending: AtomicBool::new(false),
            retry_pending: AtomicBool::new(false),
        })
    }

    pub async fn run(self: Arc<Self>) {
        info!("⏱️ Short-poll channel started (every {:?})", self.settings.interval);

        // The first tick completes immediately.
        let mut ticker = tokio::time::interval(self.settings.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                biased;
                () = self.cancellation_token.cancelled() => break,
                _ = ticker.tick() => {
                    // At most one tick request at a time; a pending retry may overlap it.
                    if self.tick_pending.swap(true, Ordering::SeqCst) {
                        debug!("Short poll tick skipped: previous tick still in flight");
                        continue;
                    }
                    let channel = Arc::clone(&self);
                    self.tracker.spawn(async move {
                        channel.fetch_and_merge(PollOrigin::Tick).await;
                        channel.tick_pending.store(false, Ordering::SeqCst);
                    });
                }
            }
        }

        info!("🏁 Short-poll channel stopped");
    }

    /// One fetch-and-merge pass, shared by the tick and the retry.
    async fn fetch_and_merge(self: &Arc<Self>, origin: PollOrigin) -> PollOutcome {
        if self.cancellation_token.is_cancelled() || !*self.active.borrow() {
            return PollOutcome::Skipped;
        }
        if self.settings.single_flight {
            if self
                .in_flight
                .compare_exchange(0, 1, Ordering::SeqCst, Ordering::SeqCst)
                .is_err()
            {
                debug!("Short poll ({:?}) skipped: request already in flight", origin);
                return PollOutcome::Skipped;
            }
        } else {
            self.in_flight.fetch_add(1, Ordering::SeqCst);
        }
        let _guard = InFlightGuard(&self.in_flight);

        debug!("Short poll ({:?}): requesting", origin);
        let result = tokio::select! {
            biased;
            () = self.cancellation_token.cancelled() => return PollOutcome::Skipped,
            result = self.api.short_poll() => result,
        };

        match result {
            Ok(products) => {
                let added = self.state.merge_polled(products).await.len();
                self.state.set_short_poll_loading(false);
                PollOutcome::Merged { added }
            }
            Err(e) if e.is_transient() => {
                // Only a tick schedules a retry; a failed retry waits for the next tick.
                let retry_scheduled = origin == PollOrigin::Tick && self.schedule_retry();
                warn!("Short poll ({:?}) failed: {}", origin, e);
                self.state.emit(SyncEvent::ShortPollFailed {
                    message: e.to_string(),
                    retry_scheduled,
                });
                PollOutcome::Failed
            }
            Err(e) => {
                error!("Short poll response discarded: {}", e);
                self.state.set_short_poll_loading(false);
                self.state.emit(SyncEvent::ShortPollRejected {
                    message: e.to_string(),
                });
                PollOutcome::Rejected
            }
        }
    }

    /// Schedule the one-shot retry unless one is already pending.
    fn schedule_retry(self: &Arc<Self>) -> bool {
        if self.retry_pending.swap(true, Ordering::SeqCst) {
            debug!("Short poll retry already pending");
            return false;
        }

        let channel = Arc::clone(self);
        let delay = self.settings.retry_delay;
        debug!("Short poll retry scheduled in {:?}", delay);
        self.tracker.spawn(async move {
            tokio::select! {
                () = channel.cancellation_token.cancelled() => {}
                () = tokio::time::sleep(delay) => {
                    channel.fetch_and_merge(PollOrigin::Retry).await;
                }
            }
            channel.retry_pending.store(false, Ordering::SeqCst);
        });
        true
    }
}
