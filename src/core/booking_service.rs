//! Booking orchestration on top of a [`SeatLockProvider`].
//!
//! Bookings are indexed twice: by id for lookups, and per show together with
//! the set of seats sold by confirmed bookings. The per-show entry sits behind
//! its own mutex; creation and confirmation run inside it so two bookings can
//! never both be confirmed over the same seat, even once their holds lapse.
//!
//! Lock order is always per-show booking mutex, then the lock provider.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock, RwLockWriteGuard};
use tracing::{debug, info, warn};

use crate::core::audit::{build_audit_event, AuditAction, AuditSink};
use crate::core::booking::{Booking, BookingStatus};
use crate::core::error::{Entity, ReservationError, ReservationResult};
use crate::core::lock_registry::{LockRegistry, SeatLockProvider};
use crate::core::model::{BookingId, SeatId, ShowId, UserId};
use crate::util::clock::Clock;

#[derive(Default)]
struct ShowBookings {
    /// Every booking of the show, oldest first.
    bookings: Vec<Arc<Booking>>,
    /// Bookings still `Created`; terminal ones are pruned on each transition.
    pending: Vec<Arc<Booking>>,
    sold: HashSet<SeatId>,
}

impl ShowBookings {
    fn prune_pending(&mut self) {
        self.pending
            .retain(|booking| booking.status() == BookingStatus::Created);
    }

    fn sold_among(&self, seats: &[SeatId]) -> Vec<SeatId> {
        seats
            .iter()
            .copied()
            .filter(|seat| self.sold.contains(seat))
            .collect()
    }
}

/// Creates bookings from seat holds and drives their status transitions.
pub struct BookingService<L = LockRegistry> {
    locks: Arc<L>,
    clock: Arc<dyn Clock>,
    by_id: RwLock<HashMap<BookingId, Arc<Booking>>>,
    shows: RwLock<HashMap<ShowId, Mutex<ShowBookings>>>,
    audit: Option<Arc<dyn AuditSink>>,
}

impl<L: SeatLockProvider> BookingService<L> {
    /// Create a service over a lock provider.
    #[must_use]
    pub fn new(locks: Arc<L>, clock: Arc<dyn Clock>) -> Self {
        Self {
            locks,
            clock,
            by_id: RwLock::new(HashMap::new()),
            shows: RwLock::new(HashMap::new()),
            audit: None,
        }
    }

    /// Attach an audit sink.
    #[must_use]
    pub fn with_audit(mut self, audit: Arc<dyn AuditSink>) -> Self {
        self.audit = Some(audit);
        self
    }

    /// The lock provider bookings are made against.
    #[must_use]
    pub fn lock_provider(&self) -> &Arc<L> {
        &self.locks
    }

    /// Lock `seats` for `user` and record a booking in `Created`.
    ///
    /// # Errors
    ///
    /// - [`ReservationError::EmptySeatSelection`] when `seats` is empty.
    /// - [`ReservationError::SeatAlreadyBooked`] when a seat is sold.
    /// - [`ReservationError::SeatAlreadyLocked`] when another user holds a seat.
    ///
    /// No booking is created and no lock is left behind on error.
    pub fn create_booking(
        &self,
        user: &UserId,
        show: ShowId,
        seats: &[SeatId],
    ) -> ReservationResult<Arc<Booking>> {
        let requested: Vec<SeatId> = seats
            .iter()
            .copied()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        if requested.is_empty() {
            return Err(ReservationError::EmptySeatSelection);
        }

        self.with_show(show, |entry| {
            let sold = entry.sold_among(&requested);
            if !sold.is_empty() {
                info!(%show, %user, ?sold, "booking rejected: seats sold");
                self.record(None, show, user, &sold, AuditAction::Conflict);
                return Err(ReservationError::SeatAlreadyBooked { show, seats: sold });
            }

            if let Err(err) = self.locks.lock_seats(show, &requested, user) {
                if let ReservationError::SeatAlreadyLocked { seats, .. } = &err {
                    self.record(None, show, user, seats, AuditAction::Conflict);
                }
                return Err(err);
            }

            let booking = Arc::new(Booking::new(
                show,
                user.clone(),
                requested.clone(),
                self.clock.now_ms(),
            ));
            entry.bookings.push(Arc::clone(&booking));
            entry.pending.push(Arc::clone(&booking));
            self.by_id.write().insert(booking.id(), Arc::clone(&booking));

            info!(booking = %booking.id(), %show, %user, seats = ?requested, "booking created");
            self.record(Some(booking.id()), show, user, &requested, AuditAction::Locked);
            Ok(booking)
        })
    }

    /// `Created` → `Confirmed`. Independent of whether the holds are still live.
    ///
    /// # Errors
    ///
    /// - [`ReservationError::NotFound`] for an unknown booking.
    /// - [`ReservationError::InvalidStateTransition`] outside `Created`.
    /// - [`ReservationError::SeatAlreadyBooked`] when another confirmed booking
    ///   already owns one of the seats; the booking stays `Created`.
    pub fn confirm_booking(&self, id: BookingId) -> ReservationResult<()> {
        let booking = self.get_booking(id)?;
        let show = booking.show();

        self.with_show(show, |entry| {
            let status = booking.status();
            if status != BookingStatus::Created {
                return Err(ReservationError::InvalidStateTransition {
                    booking: id,
                    from: status,
                    to: BookingStatus::Confirmed,
                });
            }
            let sold = entry.sold_among(booking.seats());
            if !sold.is_empty() {
                warn!(booking = %id, %show, ?sold, "confirmation rejected: seats sold");
                return Err(ReservationError::SeatAlreadyBooked { show, seats: sold });
            }

            booking.confirm()?;
            entry.sold.extend(booking.seats().iter().copied());
            entry.prune_pending();
            info!(booking = %id, %show, "booking confirmed");
            self.record(Some(id), show, booking.user(), booking.seats(), AuditAction::Confirmed);
            Ok(())
        })
    }

    /// `Created` → `Expired`, releasing the booking's holds.
    ///
    /// # Errors
    ///
    /// - [`ReservationError::NotFound`] for an unknown booking.
    /// - [`ReservationError::InvalidStateTransition`] outside `Created`.
    pub fn expire_booking(&self, id: BookingId) -> ReservationResult<()> {
        let booking = self.get_booking(id)?;
        booking.expire()?;
        self.after_release(&booking, AuditAction::Expired);
        Ok(())
    }

    /// `Created` → `Cancelled`, releasing the booking's holds.
    ///
    /// # Errors
    ///
    /// - [`ReservationError::NotFound`] for an unknown booking.
    /// - [`ReservationError::InvalidStateTransition`] outside `Created`.
    pub fn cancel_booking(&self, id: BookingId) -> ReservationResult<()> {
        let booking = self.get_booking(id)?;
        booking.cancel()?;
        self.after_release(&booking, AuditAction::Cancelled);
        Ok(())
    }

    /// Expire every `Created` booking that no longer holds all its seats.
    /// Returns how many were expired.
    pub fn expire_lapsed_bookings(&self) -> usize {
        let lapsed: Vec<Arc<Booking>> = {
            let shows = self.shows.read();
            shows
                .values()
                .flat_map(|entry| {
                    entry
                        .lock()
                        .pending
                        .iter()
                        .filter(|b| b.status() == BookingStatus::Created)
                        .cloned()
                        .collect::<Vec<_>>()
                })
                .filter(|b| {
                    !b.seats()
                        .iter()
                        .all(|seat| self.locks.validate_lock(b.show(), *seat, b.user()))
                })
                .collect()
        };

        let mut expired = 0;
        for booking in lapsed {
            // A concurrent confirm or cancel may have won in the meantime.
            if booking.expire().is_ok() {
                self.after_release(&booking, AuditAction::Expired);
                expired += 1;
            }
        }
        if expired > 0 {
            debug!(expired, "expired lapsed bookings");
        }
        expired
    }

    /// Release `user`'s holds on `seats`. Other users' holds are untouched.
    pub fn unlock_seats(&self, show: ShowId, seats: &[SeatId], user: &UserId) {
        self.locks.unlock_seats(show, seats, user);
    }

    /// Look up a booking.
    ///
    /// # Errors
    ///
    /// [`ReservationError::NotFound`] for an unknown id.
    pub fn get_booking(&self, id: BookingId) -> ReservationResult<Arc<Booking>> {
        self.by_id
            .read()
            .get(&id)
            .cloned()
            .ok_or_else(|| ReservationError::not_found(Entity::Booking, id))
    }

    /// All bookings ever made for a show, oldest first.
    #[must_use]
    pub fn bookings_for_show(&self, show: ShowId) -> Vec<Arc<Booking>> {
        self.shows
            .read()
            .get(&show)
            .map(|entry| entry.lock().bookings.clone())
            .unwrap_or_default()
    }

    /// Seats sold by confirmed bookings of a show, sorted.
    #[must_use]
    pub fn confirmed_seats(&self, show: ShowId) -> Vec<SeatId> {
        let mut seats: Vec<SeatId> = self
            .shows
            .read()
            .get(&show)
            .map(|entry| entry.lock().sold.iter().copied().collect())
            .unwrap_or_default();
        seats.sort_unstable();
        seats
    }

    /// Number of `Created` bookings tracked for a show.
    #[must_use]
    pub fn pending_count(&self, show: ShowId) -> usize {
        self.shows.read().get(&show).map_or(0, |entry| {
            entry
                .lock()
                .pending
                .iter()
                .filter(|b| b.status() == BookingStatus::Created)
                .count()
        })
    }

    /// Release the holds of a booking that just left `Created`, keeping seats
    /// the same user still needs for another pending booking of the show.
    fn after_release(&self, booking: &Booking, action: AuditAction) {
        let show = booking.show();
        self.with_show(show, |entry| {
            entry.prune_pending();
            let still_needed: HashSet<SeatId> = entry
                .pending
                .iter()
                .filter(|other| {
                    other.id() != booking.id()
                        && other.user() == booking.user()
                        && other.status() == BookingStatus::Created
                })
                .flat_map(|other| other.seats().iter().copied())
                .collect();
            let release: Vec<SeatId> = booking
                .seats()
                .iter()
                .copied()
                .filter(|seat| !still_needed.contains(seat))
                .collect();
            if !release.is_empty() {
                self.locks.unlock_seats(show, &release, booking.user());
            }
        });
        info!(booking = %booking.id(), %show, status = %booking.status(), "booking closed");
        self.record(Some(booking.id()), show, booking.user(), booking.seats(), action);
    }

    /// Run `f` under the show's mutex. The outer write guard is only taken
    /// to insert a missing entry and is downgraded before `f` runs.
    fn with_show<R>(&self, show: ShowId, f: impl FnOnce(&mut ShowBookings) -> R) -> R {
        let mut shows = self.shows.read();
        loop {
            if let Some(entry) = shows.get(&show) {
                let mut entry = entry.lock();
                return f(&mut entry);
            }
            drop(shows);
            let mut created = self.shows.write();
            created.entry(show).or_default();
            shows = RwLockWriteGuard::downgrade(created);
        }
    }

    fn record(
        &self,
        booking: Option<BookingId>,
        show: ShowId,
        user: &UserId,
        seats: &[SeatId],
        action: AuditAction,
    ) {
        if let Some(audit) = &self.audit {
            audit.record(build_audit_event(booking, show, user, seats, action));
        }
    }
}
