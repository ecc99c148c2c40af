//! Audit sink implementations.
//!
//! The booking service reports every hold, conflict and status change to an
//! optional [`AuditSink`]. An in-memory ring buffer and a tracing-backed sink
//! are provided.

use std::collections::VecDeque;
use std::fmt;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::model::{BookingId, SeatId, ShowId, UserId};
use crate::util::clock::now_ms;

/// What happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    /// Seats were locked and a booking created.
    Locked,
    /// A booking request lost to an existing hold or sale.
    Conflict,
    /// Booking confirmed.
    Confirmed,
    /// Booking expired.
    Expired,
    /// Booking cancelled.
    Cancelled,
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Locked => "locked",
            Self::Conflict => "conflict",
            Self::Confirmed => "confirmed",
            Self::Expired => "expired",
            Self::Cancelled => "cancelled",
        })
    }
}

/// Audit event structure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEvent {
    /// Event identifier.
    pub event_id: String,
    /// Booking concerned, absent for rejected requests.
    pub booking: Option<BookingId>,
    /// Show.
    pub show: ShowId,
    /// Acting user.
    pub user: UserId,
    /// Seats involved.
    pub seats: Vec<SeatId>,
    /// Action taken.
    pub action: AuditAction,
    /// Timestamp milliseconds.
    pub created_at_ms: u128,
}

/// Audit sink abstraction.
pub trait AuditSink: Send + Sync {
    /// Record an audit event.
    fn record(&self, event: AuditEvent);
}

/// In-memory audit sink for testing and dev. Keeps the newest `max_events`.
pub struct InMemoryAuditSink {
    events: Mutex<VecDeque<AuditEvent>>,
    max_events: usize,
}

impl InMemoryAuditSink {
    /// Create a new in-memory sink with a bounded buffer.
    #[must_use]
    pub fn new(max_events: usize) -> Self {
        Self {
            events: Mutex::new(VecDeque::with_capacity(max_events)),
            max_events,
        }
    }

    /// Retrieve a snapshot of stored events.
    #[must_use]
    pub fn events(&self) -> Vec<AuditEvent> {
        self.events.lock().iter().cloned().collect()
    }
}

impl AuditSink for InMemoryAuditSink {
    fn record(&self, event: AuditEvent) {
        if self.max_events == 0 {
            return;
        }
        let mut events = self.events.lock();
        if events.len() >= self.max_events {
            events.pop_front();
        }
        events.push_back(event);
    }
}

/// Sink that emits each event as a `tracing` record.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingAuditSink;

impl AuditSink for TracingAuditSink {
    fn record(&self, event: AuditEvent) {
        tracing::info!(
            target: "boxoffice::audit",
            event_id = %event.event_id,
            booking = ?event.booking,
            show = %event.show,
            user = %event.user,
            seats = ?event.seats,
            action = %event.action,
            "audit"
        );
    }
}

/// Helper to build an audit event stamped with the current time.
#[must_use]
pub fn build_audit_event(
    booking: Option<BookingId>,
    show: ShowId,
    user: &UserId,
    seats: &[SeatId],
    action: AuditAction,
) -> AuditEvent {
    AuditEvent {
        event_id: Uuid::new_v4().to_string(),
        booking,
        show,
        user: user.clone(),
        seats: seats.to_vec(),
        action,
        created_at_ms: now_ms(),
    }
}
