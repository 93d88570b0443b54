//! Cancellable periodic tasks on the tokio runtime.

use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{trace, warn};

/// Returned by a tick callback to keep or end the task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickFlow {
    Continue,
    Stop,
}

/// Handle to a periodic task. Dropping it aborts the task.
///
/// Abort takes effect at the task's next await point, so owners must still
/// check, under their own lock, that a tick belongs to the current arming.
#[derive(Debug)]
pub struct Ticker {
    handle: JoinHandle<()>,
    alive: Weak<()>,
}

/// Tells whether a ticker's task still exists, without keeping it alive.
///
/// The task holds the only strong reference to the token, so it reads as
/// gone once the task has finished or its abort has been processed.
#[derive(Debug, Clone)]
pub struct TaskLiveness(Weak<()>);

impl TaskLiveness {
    pub fn is_alive(&self) -> bool {
        self.0.strong_count() > 0
    }
}

impl Ticker {
    /// Runs `on_tick` every `period`, first one period from now.
    ///
    /// Returns `None` when called outside a tokio runtime.
    pub fn spawn<F>(name: &'static str, period: Duration, mut on_tick: F) -> Option<Self>
    where
        F: FnMut() -> TickFlow + Send + 'static,
    {
        let runtime = match Handle::try_current() {
            Ok(handle) => handle,
            Err(_) => {
                warn!(name, "no tokio runtime, periodic task not started");
                return None;
            }
        };
        let period = period.max(Duration::from_millis(1));
        let token = Arc::new(());
        let alive = Arc::downgrade(&token);
        let handle = runtime.spawn(async move {
            let _token = token;
            let mut interval = time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                if on_tick() == TickFlow::Stop {
                    trace!(name, "periodic task finished");
                    break;
                }
            }
        });
        Some(Self { handle, alive })
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    pub fn liveness(&self) -> TaskLiveness {
        TaskLiveness(self.alive.clone())
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
