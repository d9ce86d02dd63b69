//! Long-poll channel feeding the discount counter
//!
//! One request at a time: the next request is issued only after the previous
//! one resolved. Success reschedules immediately, failure after the retry
//! delay. While paused the loop parks on the active flag and issues nothing.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::events::SyncEvent;
use super::polling_controller::wait_until_active;
use super::shared_state::SharedState;
use crate::infrastructure::DiscountApi;

pub struct LongPollChannel {
    api: Arc<dyn DiscountApi>,
    state: Arc<SharedState>,
    active: watch::Receiver<bool>,
    cancellation_token: CancellationToken,
    retry_delay: Duration,
}

impl LongPollChannel {
    pub fn new(
        api: Arc<dyn DiscountApi>,
        state: Arc<SharedState>,
        active: watch::Receiver<bool>,
        cancellation_token: CancellationToken,
        retry_delay: Duration,
    ) -> Self {
        Self {
            api,
            state,
            active,
            cancellation_token,
            retry_delay,
        }
    }

    pub async fn run(mut self) {
        info!("🔁 Long-poll channel started");

        loop {
            if !wait_until_active(&mut self.active, &self.cancellation_token).await {
                break;
            }

            debug!("Long poll: requesting");
            // Pausing does not abort the request; only shutdown does.
            let result = tokio::select! {
                () = self.cancellation_token.cancelled() => break,
                result = self.api.long_poll() => result,
            };

            match result {
                Ok(count) => {
                    debug!("Long poll: {} discounted products", count);
                    if count > 0 {
                        self.state.add_discounts(count).await;
                    }
                    self.state.set_long_poll_loading(false);
                    // Zero-delay reschedule; yield so the loop stays cooperative.
                    tokio::task::yield_now().await;
                }
                Err(e) => {
                    warn!("Long poll failed, retrying in {:?}: {}", self.retry_delay, e);
                    self.state.set_long_poll_loading(true);
                    self.state.emit(SyncEvent::LongPollFailed {
                        message: e.to_string(),
                    });

                    tokio::select! {
                        () = self.cancellation_token.cancelled() => break,
                        () = tokio::time::sleep(self.retry_delay) => {}
                    }
                }
            }
        }

        info!("🏁 Long-poll channel stopped");
    }
}
