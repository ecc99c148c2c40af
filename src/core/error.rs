//! Error types for reservation operations.

use std::fmt;

use thiserror::Error;

use crate::core::booking::BookingStatus;
use crate::core::model::{BookingId, SeatId, ShowId};

/// Kind of entity a lookup failed for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    /// A show.
    Show,
    /// A seat.
    Seat,
    /// A screen.
    Screen,
    /// A booking.
    Booking,
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Show => "show",
            Self::Seat => "seat",
            Self::Screen => "screen",
            Self::Booking => "booking",
        })
    }
}

/// Errors produced by the lock registry and booking service.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReservationError {
    /// One or more seats hold a live lock owned by another user.
    #[error("seats {} already locked for show {show}", join_seats(.seats))]
    SeatAlreadyLocked {
        /// Show the request targeted.
        show: ShowId,
        /// Conflicting seats, sorted.
        seats: Vec<SeatId>,
    },
    /// One or more seats belong to a confirmed booking.
    #[error("seats {} already booked for show {show}", join_seats(.seats))]
    SeatAlreadyBooked {
        /// Show the request targeted.
        show: ShowId,
        /// Seats already sold, sorted.
        seats: Vec<SeatId>,
    },
    /// Confirm, expire or cancel attempted outside `Created`.
    #[error("booking {booking} cannot move from {from} to {to}")]
    InvalidStateTransition {
        /// Booking concerned.
        booking: BookingId,
        /// Status observed.
        from: BookingStatus,
        /// Status requested.
        to: BookingStatus,
    },
    /// Referenced id is unknown.
    #[error("{entity} {id} not found")]
    NotFound {
        /// What was looked up.
        entity: Entity,
        /// The id as rendered by its `Display`.
        id: String,
    },
    /// A lock or booking request named no seats.
    #[error("seat selection is empty")]
    EmptySeatSelection,
    /// Configuration failed validation.
    #[error("invalid config: {0}")]
    InvalidConfig(String),
}

impl ReservationError {
    /// Shorthand for a [`ReservationError::NotFound`].
    #[must_use]
    pub fn not_found(entity: Entity, id: impl fmt::Display) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Whether retrying with another seat selection can succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::SeatAlreadyLocked { .. } | Self::SeatAlreadyBooked { .. }
        )
    }
}

fn join_seats(seats: &[SeatId]) -> String {
    seats
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

/// Result of a reservation operation.
pub type ReservationResult<T> = Result<T, ReservationError>;

/// Application-facing result using anyhow for higher-level contexts.
pub type AppResult<T> = Result<T, anyhow::Error>;
