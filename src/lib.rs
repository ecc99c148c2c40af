//! # Boxoffice
//!
//! Seat reservation for show ticketing under concurrency.
//!
//! Several customers may try to hold the same seats for the same show at the
//! same moment. This crate guarantees that:
//!
//! - a multi-seat hold is granted for every requested seat or for none,
//! - an unconfirmed hold lapses on its own once its timeout passes,
//! - a confirmed booking keeps its seats off the market for good, whatever
//!   happens to the hold that preceded it.
//!
//! ## Components
//!
//! - **`LockRegistry`**: per-show critical sections over seat → `SeatLock`
//!   maps; all-or-nothing `lock_seats`, owner-only `unlock_seats`, lazy expiry.
//! - **`Booking`**: `Created → Confirmed | Expired | Cancelled`, applied with a
//!   compare-and-set so racing transitions have exactly one winner.
//! - **`BookingService`**: creates bookings from holds, confirms, expires and
//!   cancels them, and never lets two confirmed bookings share a seat.
//! - **`AvailabilityQuery`**: screen seats − live holds − sold seats,
//!   recomputed on every call.
//! - **`ReservationDesk`**: the above wired together behind an id-based API.
//!
//! ```rust
//! use std::sync::Arc;
//! use boxoffice::builders::build_desk;
//! use boxoffice::config::ReservationConfig;
//! use boxoffice::core::{MovieId, SeatCategory, User};
//! use boxoffice::infra::InMemoryCatalog;
//!
//! let catalog = Arc::new(InMemoryCatalog::new());
//! let screen = catalog.create_screen("Screen 1");
//! let seats: Vec<_> = (0..4)
//!     .map(|_| catalog.create_seat(screen, 1, SeatCategory::Gold, 300).unwrap())
//!     .collect();
//! let show = catalog.create_show(MovieId(1), screen, 0, 9_000).unwrap();
//!
//! let desk = build_desk(&ReservationConfig::default(), catalog).unwrap();
//! let jane = User::with_email("Jane", "jane@example.com");
//!
//! let booking = desk.create_booking(&jane, show, &seats[..2]).unwrap();
//! desk.confirm_booking(booking).unwrap();
//! assert_eq!(desk.available_seats(show).unwrap(), seats[2..].to_vec());
//! ```
//!
//! Seat-lock conflicts come back as a typed
//! [`ReservationError::SeatAlreadyLocked`](core::ReservationError::SeatAlreadyLocked)
//! listing the contested seats; the caller decides whether to retry.

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Reservation core: seat locks, bookings, availability.
pub mod core;
/// Configuration models for hold timeouts, sweeping and auditing.
pub mod config;
/// Builders to construct reservation components from configuration.
pub mod builders;
/// Infrastructure adapters for catalog backends.
pub mod infra;
/// Runtime adapters: id-based desk and expiry sweepers.
pub mod runtime;
/// Shared utilities.
pub mod util;

pub use crate::core::{
    Booking, BookingId, BookingService, BookingStatus, LockRegistry, ReservationError,
    ReservationResult, SeatId, SeatLock, SeatLockProvider, ShowId, UserId,
};
pub use crate::runtime::ReservationDesk;
