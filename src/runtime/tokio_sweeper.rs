//! Tokio runtime sweeper.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::core::{BookingService, LockRegistry};
use crate::runtime::sweeper::{sweep_once, SweepReport};

/// Runs the expiry sweep as a task on a tokio runtime.
#[derive(Clone)]
pub struct TokioSweeper {
    handle: tokio::runtime::Handle,
}

impl TokioSweeper {
    /// Sweeper spawning onto the given runtime.
    #[must_use]
    pub const fn new(handle: tokio::runtime::Handle) -> Self {
        Self { handle }
    }

    /// Sweeper spawning onto the runtime of the calling task.
    ///
    /// # Panics
    ///
    /// When called outside a tokio runtime.
    #[must_use]
    pub fn current() -> Self {
        Self::new(tokio::runtime::Handle::current())
    }

    /// Sweep every `interval` until the returned handle is aborted.
    /// The first pass runs one full interval after spawning.
    pub fn spawn(
        &self,
        locks: Arc<LockRegistry>,
        bookings: Arc<BookingService>,
        interval: Duration,
    ) -> JoinHandle<()> {
        self.handle.spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let report = sweep_once(&locks, &bookings);
                if report != SweepReport::default() {
                    tracing::info!(
                        expired_bookings = report.expired_bookings,
                        purged_locks = report.purged_locks,
                        "sweep complete"
                    );
                }
            }
        })
    }
}
