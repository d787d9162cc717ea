//! Typing heartbeat: pings the "composing" indicator periodically while a reply is open.
//!
//! The timer is a scoped resource. [`TypingHeartbeat::stop`] cancels it, and dropping the guard cancels it on
//! every other exit path (early return, `?`, panic unwinding). Cancellation happens once.

use std::future::Future;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::debug;

/// Guard for the background typing task.
#[derive(Debug)]
pub struct TypingHeartbeat {
    handle: Option<JoinHandle<()>>,
}

impl TypingHeartbeat {
    /// Spawns the timer. `tick` runs every `period` (first run after one period); its outcome is ignored.
    pub fn start<F, Fut>(period: Duration, mut tick: F) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let period = period.max(Duration::from_millis(1));
        let handle = tokio::spawn(async move {
            let mut interval = interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                tick().await;
            }
        });
        Self {
            handle: Some(handle),
        }
    }

    /// Cancels the timer.
    pub fn stop(mut self) {
        self.cancel();
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    fn cancel(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            debug!("Typing heartbeat stopped");
        }
    }
}

impl Drop for TypingHeartbeat {
    fn drop(&mut self) {
        self.cancel();
    }
}
