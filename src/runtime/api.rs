//! Id-based reservation surface and its request/response models.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::core::{
    AvailabilityQuery, BookingId, BookingService, BookingSnapshot, BookingStatus, Catalog,
    InMemoryAuditSink, LockRegistry, ReservationResult, SeatId, SeatLockProvider, ShowId, User,
    UserId,
};

/// Booking request payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingRequest {
    /// Who is booking.
    pub user: User,
    /// Target show.
    pub show: ShowId,
    /// Requested seats.
    pub seats: Vec<SeatId>,
}

/// Booking response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingReceipt {
    /// New booking id.
    pub booking: BookingId,
    /// Show.
    pub show: ShowId,
    /// Seats held, sorted.
    pub seats: Vec<SeatId>,
    /// Status at creation (`created`).
    pub status: BookingStatus,
    /// When the holds lapse unless confirmed, ms since epoch.
    pub hold_expires_at_ms: u128,
}

/// Availability response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityResponse {
    /// Show.
    pub show: ShowId,
    /// Free seats in screen order.
    pub seats: Vec<SeatId>,
}

/// Health response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Health {
    /// Healthy flag.
    pub ok: bool,
}

/// Catalog, lock registry, booking service and availability wired together
/// and addressed by id.
pub struct ReservationDesk<K> {
    catalog: Arc<K>,
    locks: Arc<LockRegistry>,
    bookings: Arc<BookingService>,
    availability: AvailabilityQuery<K>,
    audit_log: Option<Arc<InMemoryAuditSink>>,
}

impl<K> ReservationDesk<K> {
    /// Catalog.
    #[must_use]
    pub const fn catalog(&self) -> &Arc<K> {
        &self.catalog
    }

    /// Lock registry.
    #[must_use]
    pub const fn locks(&self) -> &Arc<LockRegistry> {
        &self.locks
    }

    /// Booking service.
    #[must_use]
    pub const fn bookings(&self) -> &Arc<BookingService> {
        &self.bookings
    }

    /// Expose an in-memory audit log the booking service writes to.
    #[must_use]
    pub fn with_audit_log(mut self, log: Arc<InMemoryAuditSink>) -> Self {
        self.audit_log = Some(log);
        self
    }

    /// In-memory audit log, when one is configured.
    #[must_use]
    pub const fn audit_log(&self) -> Option<&Arc<InMemoryAuditSink>> {
        self.audit_log.as_ref()
    }
}

impl<K: Catalog> ReservationDesk<K> {
    /// Wire a desk from its parts. The lock registry is the one `bookings` uses.
    #[must_use]
    pub fn new(catalog: Arc<K>, bookings: Arc<BookingService>) -> Self {
        let locks = Arc::clone(bookings.lock_provider());
        let availability = AvailabilityQuery::new(Arc::clone(&catalog), Arc::clone(&bookings));
        Self {
            catalog,
            locks,
            bookings,
            availability,
            audit_log: None,
        }
    }

    /// Hold `seats` of `show` for `user` and open a booking.
    ///
    /// # Errors
    ///
    /// [`crate::core::ReservationError::NotFound`] for an unknown show or a
    /// seat not on the show's screen, otherwise as [`BookingService::create_booking`].
    pub fn create_booking(
        &self,
        user: &User,
        show: ShowId,
        seats: &[SeatId],
    ) -> ReservationResult<BookingId> {
        let seats: Vec<SeatId> = self
            .catalog
            .resolve_seats(show, seats)?
            .into_iter()
            .map(|seat| seat.id)
            .collect();
        self.bookings
            .create_booking(&user.id, show, &seats)
            .map(|booking| booking.id())
    }

    /// See [`BookingService::confirm_booking`].
    ///
    /// # Errors
    ///
    /// As [`BookingService::confirm_booking`].
    pub fn confirm_booking(&self, id: BookingId) -> ReservationResult<()> {
        self.bookings.confirm_booking(id)
    }

    /// See [`BookingService::expire_booking`].
    ///
    /// # Errors
    ///
    /// As [`BookingService::expire_booking`].
    pub fn expire_booking(&self, id: BookingId) -> ReservationResult<()> {
        self.bookings.expire_booking(id)
    }

    /// See [`BookingService::cancel_booking`].
    ///
    /// # Errors
    ///
    /// As [`BookingService::cancel_booking`].
    pub fn cancel_booking(&self, id: BookingId) -> ReservationResult<()> {
        self.bookings.cancel_booking(id)
    }

    /// Free seat ids of a show.
    ///
    /// # Errors
    ///
    /// [`crate::core::ReservationError::NotFound`] for an unknown show.
    pub fn available_seats(&self, show: ShowId) -> ReservationResult<Vec<SeatId>> {
        Ok(self
            .availability
            .available_seats(show)?
            .into_iter()
            .map(|seat| seat.id)
            .collect())
    }

    /// Release `user`'s holds on `seats`.
    ///
    /// # Errors
    ///
    /// [`crate::core::ReservationError::NotFound`] for an unknown show.
    pub fn unlock_seats(
        &self,
        show: ShowId,
        seats: &[SeatId],
        user: &UserId,
    ) -> ReservationResult<()> {
        self.catalog.show(show)?;
        self.bookings.unlock_seats(show, seats, user);
        Ok(())
    }

    /// Whether `user` currently holds `seat`.
    #[must_use]
    pub fn validate_lock(&self, show: ShowId, seat: SeatId, user: &UserId) -> bool {
        self.locks.validate_lock(show, seat, user)
    }

    /// Current state of a booking.
    ///
    /// # Errors
    ///
    /// [`crate::core::ReservationError::NotFound`] for an unknown id.
    pub fn booking(&self, id: BookingId) -> ReservationResult<BookingSnapshot> {
        self.bookings.get_booking(id).map(|b| b.snapshot())
    }

    /// Availability as a response payload.
    ///
    /// # Errors
    ///
    /// [`crate::core::ReservationError::NotFound`] for an unknown show.
    pub fn availability(&self, show: ShowId) -> ReservationResult<AvailabilityResponse> {
        Ok(AvailabilityResponse {
            show,
            seats: self.available_seats(show)?,
        })
    }
}

/// Handle a booking request end to end.
///
/// # Errors
///
/// As [`ReservationDesk::create_booking`].
pub fn submit_booking<K: Catalog>(
    desk: &ReservationDesk<K>,
    req: &BookingRequest,
) -> ReservationResult<BookingReceipt> {
    let id = desk.create_booking(&req.user, req.show, &req.seats)?;
    let booking = desk.bookings().get_booking(id)?;
    let hold_expires_at_ms = booking.created_at_ms() + desk.locks().lock_timeout().as_millis();
    Ok(BookingReceipt {
        booking: id,
        show: booking.show(),
        seats: booking.seats().to_vec(),
        status: booking.status(),
        hold_expires_at_ms,
    })
}

/// Return a health payload.
#[must_use]
pub const fn health() -> Health {
    Health { ok: true }
}
