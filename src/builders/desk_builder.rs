//! Builders to construct a reservation desk from configuration.

use std::sync::Arc;

use anyhow::Context;

use crate::config::ReservationConfig;
use crate::core::{
    AppResult, AuditSink, BookingService, Catalog, InMemoryAuditSink, LockRegistry,
    ReservationError, ReservationResult,
};
use crate::runtime::{ReservationDesk, SweepWorker};
use crate::util::clock::{Clock, SystemClock};

/// Step-wise construction of a [`ReservationDesk`].
pub struct DeskBuilder {
    config: ReservationConfig,
    clock: Arc<dyn Clock>,
    audit: Option<Arc<dyn AuditSink>>,
}

impl DeskBuilder {
    /// Start from a configuration, the system clock and no audit sink.
    #[must_use]
    pub fn new(config: ReservationConfig) -> Self {
        Self {
            config,
            clock: Arc::new(SystemClock),
            audit: None,
        }
    }

    /// Read time from `clock` for holds and bookings.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Send audit events to `audit` instead of the configured buffer.
    #[must_use]
    pub fn with_audit(mut self, audit: Arc<dyn AuditSink>) -> Self {
        self.audit = Some(audit);
        self
    }

    /// Validate the configuration and wire the desk.
    ///
    /// # Errors
    ///
    /// [`ReservationError::InvalidConfig`] when validation fails.
    pub fn build<K: Catalog>(self, catalog: Arc<K>) -> ReservationResult<ReservationDesk<K>> {
        self.config
            .validate()
            .map_err(ReservationError::InvalidConfig)?;

        let locks = Arc::new(LockRegistry::with_clock(
            self.config.lock_timeout(),
            Arc::clone(&self.clock),
        ));
        let mut service = BookingService::new(locks, self.clock);

        let audit_log = match (self.audit, self.config.audit_buffer) {
            (Some(sink), _) => {
                service = service.with_audit(sink);
                None
            }
            (None, 0) => None,
            (None, capacity) => {
                let log = Arc::new(InMemoryAuditSink::new(capacity));
                service = service.with_audit(Arc::clone(&log) as Arc<dyn AuditSink>);
                Some(log)
            }
        };

        tracing::debug!(
            lock_timeout_secs = self.config.lock_timeout_secs,
            audit_buffer = self.config.audit_buffer,
            "reservation desk built"
        );
        let desk = ReservationDesk::new(catalog, Arc::new(service));
        Ok(match audit_log {
            Some(log) => desk.with_audit_log(log),
            None => desk,
        })
    }
}

/// Build a desk from configuration with the system clock.
///
/// # Errors
///
/// [`ReservationError::InvalidConfig`] when validation fails.
pub fn build_desk<K: Catalog>(
    cfg: &ReservationConfig,
    catalog: Arc<K>,
) -> ReservationResult<ReservationDesk<K>> {
    DeskBuilder::new(cfg.clone()).build(catalog)
}

/// Start the thread sweeper if the configuration enables one.
///
/// # Errors
///
/// The sweeper thread could not be spawned.
pub fn start_sweeper<K>(
    cfg: &ReservationConfig,
    desk: &ReservationDesk<K>,
) -> AppResult<Option<SweepWorker>> {
    let Some(interval) = cfg.sweep_interval() else {
        return Ok(None);
    };
    let worker = SweepWorker::spawn(
        Arc::clone(desk.locks()),
        Arc::clone(desk.bookings()),
        interval,
    )
    .context("failed to spawn sweeper thread")?;
    Ok(Some(worker))
}
