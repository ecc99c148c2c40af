//! Booking record and its one-way status machine.
//!
//! ```text
//! Created ──► Confirmed
//!    │
//!    ├──────► Expired
//!    │
//!    └──────► Cancelled
//! ```
//!
//! Every transition starts from `Created` and is applied with a single
//! compare-and-set on the status word, so of two racing transitions on the
//! same booking exactly one wins.

use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};

use serde::{Deserialize, Serialize};

use crate::core::error::{ReservationError, ReservationResult};
use crate::core::model::{BookingId, SeatId, ShowId, UserId};

/// Lifecycle status of a booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    /// Seats are held, awaiting payment.
    Created,
    /// Paid; seats are sold for good.
    Confirmed,
    /// Hold abandoned.
    Expired,
    /// Withdrawn by the customer.
    Cancelled,
}

impl BookingStatus {
    const fn as_u8(self) -> u8 {
        match self {
            Self::Created => 0,
            Self::Confirmed => 1,
            Self::Expired => 2,
            Self::Cancelled => 3,
        }
    }

    const fn from_u8(raw: u8) -> Self {
        match raw {
            0 => Self::Created,
            1 => Self::Confirmed,
            2 => Self::Expired,
            _ => Self::Cancelled,
        }
    }

    /// No transition leaves a terminal status.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        !matches!(self, Self::Created)
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Created => "CREATED",
            Self::Confirmed => "CONFIRMED",
            Self::Expired => "EXPIRED",
            Self::Cancelled => "CANCELLED",
        })
    }
}

/// A reservation of a seat set for one show by one user.
#[derive(Debug)]
pub struct Booking {
    id: BookingId,
    show: ShowId,
    user: UserId,
    seats: Vec<SeatId>,
    created_at_ms: u128,
    status: AtomicU8,
}

impl Booking {
    /// Build a booking in `Created`. Only the booking service calls this,
    /// after every seat has been locked for `user`.
    pub(crate) fn new(show: ShowId, user: UserId, seats: Vec<SeatId>, created_at_ms: u128) -> Self {
        Self {
            id: BookingId::new(),
            show,
            user,
            seats,
            created_at_ms,
            status: AtomicU8::new(BookingStatus::Created.as_u8()),
        }
    }

    /// Booking id.
    #[must_use]
    pub const fn id(&self) -> BookingId {
        self.id
    }

    /// Show the seats are for.
    #[must_use]
    pub const fn show(&self) -> ShowId {
        self.show
    }

    /// Owner.
    #[must_use]
    pub const fn user(&self) -> &UserId {
        &self.user
    }

    /// Booked seats, sorted and unique.
    #[must_use]
    pub fn seats(&self) -> &[SeatId] {
        &self.seats
    }

    /// Creation time in milliseconds since epoch.
    #[must_use]
    pub const fn created_at_ms(&self) -> u128 {
        self.created_at_ms
    }

    /// Current status.
    #[must_use]
    pub fn status(&self) -> BookingStatus {
        BookingStatus::from_u8(self.status.load(Ordering::Acquire))
    }

    /// Whether the booking reached `Confirmed`.
    #[must_use]
    pub fn is_confirmed(&self) -> bool {
        self.status() == BookingStatus::Confirmed
    }

    /// `Created` → `Confirmed`.
    ///
    /// # Errors
    ///
    /// [`ReservationError::InvalidStateTransition`] if the booking already
    /// left `Created`.
    pub fn confirm(&self) -> ReservationResult<()> {
        self.transition(BookingStatus::Confirmed)
    }

    /// `Created` → `Expired`.
    ///
    /// # Errors
    ///
    /// [`ReservationError::InvalidStateTransition`] if the booking already
    /// left `Created`.
    pub fn expire(&self) -> ReservationResult<()> {
        self.transition(BookingStatus::Expired)
    }

    /// `Created` → `Cancelled`.
    ///
    /// # Errors
    ///
    /// [`ReservationError::InvalidStateTransition`] if the booking already
    /// left `Created`.
    pub fn cancel(&self) -> ReservationResult<()> {
        self.transition(BookingStatus::Cancelled)
    }

    fn transition(&self, to: BookingStatus) -> ReservationResult<()> {
        self.status
            .compare_exchange(
                BookingStatus::Created.as_u8(),
                to.as_u8(),
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .map(|_| ())
            .map_err(|actual| ReservationError::InvalidStateTransition {
                booking: self.id,
                from: BookingStatus::from_u8(actual),
                to,
            })
    }

    /// Serializable copy of the current state.
    #[must_use]
    pub fn snapshot(&self) -> BookingSnapshot {
        BookingSnapshot {
            id: self.id,
            show: self.show,
            user: self.user.clone(),
            seats: self.seats.clone(),
            status: self.status(),
            created_at_ms: self.created_at_ms,
        }
    }
}

/// Point-in-time view of a [`Booking`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingSnapshot {
    /// Booking id.
    pub id: BookingId,
    /// Show.
    pub show: ShowId,
    /// Owner.
    pub user: UserId,
    /// Booked seats.
    pub seats: Vec<SeatId>,
    /// Status when the snapshot was taken.
    pub status: BookingStatus,
    /// Creation time in milliseconds since epoch.
    pub created_at_ms: u128,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::sync::{Arc, Barrier};
    use std::thread;

    fn booking() -> Booking {
        Booking::new(ShowId(1), UserId::new("u"), vec![SeatId(1), SeatId(2)], 0)
    }

    #[test]
    fn test_new_booking_is_created() {
        let b = booking();
        assert_eq!(b.status(), BookingStatus::Created);
        assert!(!b.status().is_terminal());
    }

    #[test]
    fn test_confirm_is_terminal() {
        let b = booking();
        b.confirm().unwrap();
        assert!(b.is_confirmed());

        let err = b.expire().unwrap_err();
        assert_eq!(
            err,
            ReservationError::InvalidStateTransition {
                booking: b.id(),
                from: BookingStatus::Confirmed,
                to: BookingStatus::Expired,
            }
        );
        assert!(b.confirm().is_err());
        assert!(b.cancel().is_err());
        assert_eq!(b.status(), BookingStatus::Confirmed);
    }

    #[test]
    fn test_expired_cannot_be_confirmed() {
        let b = booking();
        b.expire().unwrap();
        assert!(matches!(
            b.confirm(),
            Err(ReservationError::InvalidStateTransition {
                from: BookingStatus::Expired,
                ..
            })
        ));
    }

    #[test]
    fn test_racing_transitions_have_one_winner() {
        let b = Arc::new(booking());
        let barrier = Arc::new(Barrier::new(8));
        let wins = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let b = Arc::clone(&b);
                let barrier = Arc::clone(&barrier);
                let wins = Arc::clone(&wins);
                thread::spawn(move || {
                    barrier.wait();
                    let res = if i % 2 == 0 { b.confirm() } else { b.expire() };
                    if res.is_ok() {
                        wins.fetch_add(1, Ordering::SeqCst);
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        assert_eq!(wins.load(Ordering::SeqCst), 1);
        assert!(b.status().is_terminal());
    }
}
