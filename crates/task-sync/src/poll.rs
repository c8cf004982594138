//! Poll Loop
//!
//! Periodically replaces the cached task list with the server's.
//!
//! [`PollHandle::start`] spawns the loop on the tokio runtime and returns the
//! handle that owns it. The first refresh happens one full interval after
//! start (the owner does the initial load), refreshes never overlap, and once
//! [`PollHandle::stop`] has been called no further refresh runs. A refresh
//! that is still waiting on the network at that point is abandoned before it
//! can write to the store.

use std::sync::Arc;
use std::time::Duration;

use log::{debug, info, warn};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::backend::TaskBackend;
use crate::store::TaskStore;

const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// Owner of a running poll loop
///
/// Dropping the handle stops the loop.
pub struct PollHandle {
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl PollHandle {
    /// Start refreshing `store` every `interval`.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start<B>(store: Arc<TaskStore<B>>, interval: Duration) -> Self
    where
        B: TaskBackend + 'static,
    {
        let interval = if interval < MIN_INTERVAL {
            warn!("Poll interval {interval:?} too small, using {MIN_INTERVAL:?}");
            MIN_INTERVAL
        } else {
            interval
        };

        let cancel = CancellationToken::new();
        let task = tokio::spawn(run(store, interval, cancel.clone()));
        info!("Task polling started (every {interval:?})");

        Self { cancel, task: Some(task) }
    }

    /// Stop the loop. Safe to call any number of times.
    pub fn stop(&self) {
        if !self.cancel.is_cancelled() {
            info!("Task polling stopped");
        }
        self.cancel.cancel();
    }

    pub fn is_stopped(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Stop the loop and wait for its task to finish
    pub async fn shutdown(mut self) {
        self.stop();
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

async fn run<B>(store: Arc<TaskStore<B>>, period: Duration, cancel: CancellationToken)
where
    B: TaskBackend + 'static,
{
    let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
    // A slow refresh pushes the schedule back instead of bunching ticks
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {}
        }
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            result = store.refresh() => {
                if result.is_err() {
                    debug!("Poll refresh failed; retrying next tick");
                }
            }
        }
    }
}
