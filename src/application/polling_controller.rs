//! Pause/resume flag and task lifecycle for the polling channels
//!
//! The active flag is a `watch` channel: channels read it at each scheduling
//! decision and the long-poll loop parks on it while paused. Teardown cancels
//! a shared `CancellationToken` and waits for every tracked task, including
//! pending short-poll retries.

use std::future::Future;

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::info;

pub struct PollingController {
    active_tx: watch::Sender<bool>,
    cancellation_token: CancellationToken,
    tracker: TaskTracker,
}

impl PollingController {
    pub fn new(start_active: bool) -> Self {
        let (active_tx, _) = watch::channel(start_active);
        Self {
            active_tx,
            cancellation_token: CancellationToken::new(),
            tracker: TaskTracker::new(),
        }
    }

    /// Stop scheduling new requests. Returns `true` if the state changed.
    pub fn pause(&self) -> bool {
        let changed = self.active_tx.send_replace(false);
        if changed {
            info!("⏸️ Polling paused");
        }
        changed
    }

    /// Allow requests again. Returns `true` if the state changed.
    pub fn resume(&self) -> bool {
        let changed = !self.active_tx.send_replace(true);
        if changed {
            info!("▶️ Polling resumed");
        }
        changed
    }

    pub fn is_active(&self) -> bool {
        *self.active_tx.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.active_tx.subscribe()
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancellation_token.clone()
    }

    pub fn tracker(&self) -> TaskTracker {
        self.tracker.clone()
    }

    pub fn spawn<F>(&self, future: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.tracker.spawn(future);
    }

    pub fn is_shut_down(&self) -> bool {
        self.cancellation_token.is_cancelled()
    }

    /// Cancel every pending timer and wait for all channel tasks to finish.
    pub async fn shutdown(&self) {
        self.cancellation_token.cancel();
        self.tracker.close();
        self.tracker.wait().await;
        info!("🛑 Polling channels stopped");
    }
}

/// Wait until the flag is active. Returns `false` if cancelled first.
pub async fn wait_until_active(
    active: &mut watch::Receiver<bool>,
    cancellation_token: &CancellationToken,
) -> bool {
    loop {
        if cancellation_token.is_cancelled() {
            return false;
        }
        if *active.borrow_and_update() {
            return true;
        }
        tokio::select! {
            () = cancellation_token.cancelled() => return false,
            changed = active.changed() => {
                if changed.is_err() {
                    return false;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_pause_resume_toggle() {
        let controller = PollingController::new(true);
        assert!(controller.is_active());
        assert!(controller.pause());
        assert!(!controller.pause());
        assert!(!controller.is_active());
        assert!(controller.resume());
        assert!(controller.is_active());
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_until_active_unblocks_on_resume() {
        let controller = PollingController::new(false);
        let mut rx = controller.subscribe();
        let token = controller.cancellation_token();

        let waiter = tokio::spawn(async move { wait_until_active(&mut rx, &token).await });
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!waiter.is_finished());

        controller.resume();
        assert!(waiter.await.unwrap());
    }

    #[tokio::test]
    async fn test_shutdown_cancels_waiters_and_tasks() {
        let controller = PollingController::new(false);
        let mut rx = controller.subscribe();
        let token = controller.cancellation_token();
        controller.spawn(async move {
            assert!(!wait_until_active(&mut rx, &token).await);
        });

        controller.shutdown().await;
        assert!(controller.is_shut_down());
        assert!(controller.tracker().is_empty());
    }
}
