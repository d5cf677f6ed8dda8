//! Cancellable periodic task.

use std::ops::ControlFlow;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::trace;

/// Handle to a task started with [`spawn_periodic`].
///
/// Dropping the handle cancels the task.
#[derive(Debug)]
pub struct TickHandle {
    cancelled: Arc<AtomicBool>,
    task: JoinHandle<()>,
}

impl TickHandle {
    /// Stop the task. Safe to call any number of times.
    pub fn cancel(&self) {
        if !self.cancelled.swap(true, Ordering::SeqCst) {
            trace!("periodic task cancelled");
        }
        self.task.abort();
    }

    /// `false` once cancelled or once the callback returned `Break`.
    pub fn is_active(&self) -> bool {
        !self.cancelled.load(Ordering::SeqCst) && !self.task.is_finished()
    }
}

impl Drop for TickHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Run `on_tick` every `period` on the current tokio runtime.
///
/// The first call happens one full period after spawning. Missed ticks are
/// delayed rather than burst. The callback stops the task by returning
/// `ControlFlow::Break`. Must be called from within a tokio runtime.
pub fn spawn_periodic<F>(period: Duration, mut on_tick: F) -> TickHandle
where
    F: FnMut() -> ControlFlow<()> + Send + 'static,
{
    let period = period.max(Duration::from_millis(1));
    let cancelled = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&cancelled);

    let task = tokio::spawn(async move {
        let mut interval = time::interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            if flag.load(Ordering::SeqCst) {
                break;
            }
            if on_tick().is_break() {
                flag.store(true, Ordering::SeqCst);
                break;
            }
        }
    });

    TickHandle { cancelled, task }
}
