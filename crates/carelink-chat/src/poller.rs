// SPDX-FileCopyrightText: 2026 Carelink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Cancellable periodic background task.

use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// A background loop that runs an async closure on a fixed period.
///
/// The first tick fires immediately. Cancellation is prompt: a tick in
/// flight when [`cancel`](PeriodicTask::cancel) is called is dropped rather
/// than awaited to completion.
#[derive(Debug)]
pub struct PeriodicTask {
    name: &'static str,
    token: CancellationToken,
    handle: JoinHandle<()>,
}

impl PeriodicTask {
    pub fn spawn<F, Fut>(name: &'static str, period: Duration, mut tick: F) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let token = CancellationToken::new();
        let loop_token = token.clone();
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = loop_token.cancelled() => break,
                    _ = interval.tick() => {
                        tokio::select! {
                            _ = loop_token.cancelled() => break,
                            _ = tick() => {}
                        }
                    }
                }
            }
            debug!(task = name, "periodic task stopped");
        });

        Self {
            name,
            token,
            handle,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Cancels the loop and waits for it to stop.
    pub async fn cancel(self) {
        self.token.cancel();
        if let Err(err) = self.handle.await
            && !err.is_cancelled()
        {
            warn!(task = self.name, error = %err, "periodic task join failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::Arc;
    use tokio::sync::Notify;

    #[tokio::test(start_paused = true)]
    async fn first_tick_fires_immediately() {
        let count = Arc::new(AtomicU64::new(0));
        let task = PeriodicTask::spawn("test", Duration::from_secs(4), {
            let count = count.clone();
            move || {
                let count = count.clone();
                async move {
                    count.fetch_add(1, Ordering::SeqCst);
                }
            }
        });

        tokio::time::sleep(Duration::from_millis(1)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);
        task.cancel().await;
    }

    #[tokio::test(start_paused = true)]
    async fn ticks_repeat_on_the_period() {
        let count = Arc::new(AtomicU64::new(0));
        let task = PeriodicTask::spawn("test", Duration::from_secs(4), {
            let count = count.clone();
            move || {
                let count = count.clone();
                async move {
                    count.fetch_add(1, Ordering::SeqCst);
                }
            }
        });

        tokio::time::sleep(Duration::from_secs(9)).await;
        assert_eq!(count.load(Ordering::SeqCst), 3);
        task.cancel().await;
    }

    #[tokio::test(start_paused = true)]
    async fn no_ticks_after_cancel() {
        let count = Arc::new(AtomicU64::new(0));
        let task = PeriodicTask::spawn("test", Duration::from_secs(4), {
            let count = count.clone();
            move || {
                let count = count.clone();
                async move {
                    count.fetch_add(1, Ordering::SeqCst);
                }
            }
        });

        tokio::time::sleep(Duration::from_millis(1)).await;
        task.cancel().await;
        let before = count.load(Ordering::SeqCst);
        tokio::time::sleep(Duration::from_secs(20)).await;
        assert_eq!(count.load(Ordering::SeqCst), before);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_drops_a_blocked_tick() {
        let gate = Arc::new(Notify::new());
        let task = PeriodicTask::spawn("test", Duration::from_secs(4), {
            let gate = gate.clone();
            move || {
                let gate = gate.clone();
                async move {
                    gate.notified().await;
                }
            }
        });

        tokio::time::sleep(Duration::from_millis(1)).await;
        assert!(!task.is_cancelled());
        // The tick is parked on the gate; cancel must still return.
        task.cancel().await;
    }
}
