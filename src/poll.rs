//! Browser Poll Timer
//!
//! The page's refresh loop. Runs on the browser event loop with gloo timers;
//! the handle is stopped from the owning component's cleanup.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use leptos::task::spawn_local;

use crate::context::SyncStore;

/// Stop flag shared with the running loop
#[derive(Clone)]
pub struct PollTimer {
    stopped: Arc<AtomicBool>,
}

impl PollTimer {
    /// Stop polling. Idempotent.
    pub fn stop(&self) {
        if !self.stopped.swap(true, Ordering::SeqCst) {
            log::info!("Task polling stopped");
        }
    }
}

/// Refresh `store` every `interval` until the returned timer is stopped
pub fn start(store: Arc<SyncStore>, interval: Duration) -> PollTimer {
    let stopped = Arc::new(AtomicBool::new(false));
    let flag = stopped.clone();

    spawn_local(async move {
        loop {
            gloo_timers::future::sleep(interval).await;
            if flag.load(Ordering::SeqCst) {
                break;
            }
            let _ = store.refresh().await;
        }
    });
    log::info!("Task polling started (every {interval:?})");

    PollTimer { stopped }
}
