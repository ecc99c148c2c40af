//! Read-only lookup of shows and their seat universe.

use crate::core::error::{Entity, ReservationError, ReservationResult};
use crate::core::model::{Seat, SeatId, Show, ShowId};

/// Abstraction for catalog backends that own shows, screens and seats.
pub trait Catalog: Send + Sync {
    /// Look up a show.
    ///
    /// # Errors
    ///
    /// [`ReservationError::NotFound`] for an unknown show.
    fn show(&self, id: ShowId) -> ReservationResult<Show>;

    /// Every seat on the screen the show runs on.
    ///
    /// # Errors
    ///
    /// [`ReservationError::NotFound`] for an unknown show or a
    /// show whose screen is unknown.
    fn seats_for_show(&self, id: ShowId) -> ReservationResult<Vec<Seat>>;

    /// Resolve seat ids against the show's screen, preserving order.
    ///
    /// # Errors
    ///
    /// [`ReservationError::NotFound`] naming the first seat that
    /// is not on the show's screen.
    fn resolve_seats(&self, id: ShowId, seats: &[SeatId]) -> ReservationResult<Vec<Seat>> {
        let universe = self.seats_for_show(id)?;
        seats
            .iter()
            .map(|seat_id| {
                universe
                    .iter()
                    .find(|seat| seat.id == *seat_id)
                    .cloned()
                    .ok_or_else(|| ReservationError::not_found(Entity::Seat, seat_id))
            })
            .collect()
    }
}
