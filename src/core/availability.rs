//! Free-seat query: every seat of the show's screen, minus live holds, minus
//! seats sold by confirmed bookings. Both sources are read fresh on each call.

use std::collections::HashSet;
use std::sync::Arc;

use crate::core::booking_service::BookingService;
use crate::core::catalog::Catalog;
use crate::core::error::ReservationResult;
use crate::core::lock_registry::{LockRegistry, SeatLockProvider};
use crate::core::model::{Seat, ShowId};

/// Combines catalog, lock state and booking state into availability.
pub struct AvailabilityQuery<K, L = LockRegistry> {
    catalog: Arc<K>,
    bookings: Arc<BookingService<L>>,
}

impl<K: Catalog, L: SeatLockProvider> AvailabilityQuery<K, L> {
    /// Build a query over the given catalog and booking service.
    #[must_use]
    pub const fn new(catalog: Arc<K>, bookings: Arc<BookingService<L>>) -> Self {
        Self { catalog, bookings }
    }

    /// Seats neither held nor sold, in screen order.
    ///
    /// # Errors
    ///
    /// [`crate::core::ReservationError::NotFound`] for an unknown show.
    pub fn available_seats(&self, show: ShowId) -> ReservationResult<Vec<Seat>> {
        let universe = self.catalog.seats_for_show(show)?;
        let mut taken: HashSet<_> = self
            .bookings
            .lock_provider()
            .locked_seats(show)
            .into_iter()
            .collect();
        taken.extend(self.bookings.confirmed_seats(show));

        Ok(universe
            .into_iter()
            .filter(|seat| !taken.contains(&seat.id))
            .collect())
    }
}
