//! Optional background sweep of expired holds and lapsed bookings.
//!
//! Expiry is already evaluated lazily on every read, so sweeping never changes
//! what callers observe. A pass drops expired lock entries and empty show maps,
//! and only scans bookings still `Created`. Booking records themselves are
//! kept for lookup by id.

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{bounded, RecvTimeoutError, Sender};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::core::{BookingService, LockRegistry};

/// Outcome of one sweep pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepReport {
    /// `Created` bookings moved to `Expired`.
    pub expired_bookings: usize,
    /// Expired lock entries removed.
    pub purged_locks: usize,
}

/// Expire lapsed bookings, then drop expired lock entries.
pub fn sweep_once(locks: &LockRegistry, bookings: &BookingService) -> SweepReport {
    let expired_bookings = bookings.expire_lapsed_bookings();
    let purged_locks = locks.purge_expired();
    SweepReport {
        expired_bookings,
        purged_locks,
    }
}

/// Sweeper running on a dedicated OS thread.
///
/// Dropping the worker stops the thread and joins it.
pub struct SweepWorker {
    stop_tx: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl SweepWorker {
    /// Start sweeping every `interval`.
    ///
    /// # Errors
    ///
    /// The thread could not be spawned.
    pub fn spawn(
        locks: Arc<LockRegistry>,
        bookings: Arc<BookingService>,
        interval: Duration,
    ) -> std::io::Result<Self> {
        let (stop_tx, stop_rx) = bounded::<()>(1);
        let handle = thread::Builder::new()
            .name("boxoffice-sweeper".into())
            .spawn(move || {
                debug!(?interval, "sweeper started");
                loop {
                    match stop_rx.recv_timeout(interval) {
                        Err(RecvTimeoutError::Timeout) => {
                            let report = sweep_once(&locks, &bookings);
                            if report != SweepReport::default() {
                                info!(
                                    expired_bookings = report.expired_bookings,
                                    purged_locks = report.purged_locks,
                                    "sweep complete"
                                );
                            }
                        }
                        Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                    }
                }
                debug!("sweeper stopped");
            })?;
        Ok(Self {
            stop_tx: Some(stop_tx),
            handle: Some(handle),
        })
    }

    /// Stop the thread and wait for it to exit.
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        if let Some(tx) = self.stop_tx.take() {
            let _ = tx.try_send(());
        }
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("sweeper thread panicked");
            }
        }
    }
}

impl Drop for SweepWorker {
    fn drop(&mut self) {
        self.stop();
    }
}
