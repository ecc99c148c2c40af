//! Seat holds and the registry that grants them all-or-nothing.
//!
//! The registry keeps one map of seat → [`SeatLock`] per show, each behind its
//! own `parking_lot::Mutex`. A multi-seat request checks and writes every seat
//! inside that one critical section, so requests against the same show are
//! linearizable while requests against different shows never contend.
//!
//! Expiry is lazy: a lock past its timeout is treated as absent whenever it is
//! read, and is only physically removed when overwritten, unlocked, or swept
//! by [`LockRegistry::purge_expired`].

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::{Mutex, RwLock, RwLockWriteGuard};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::core::error::{ReservationError, ReservationResult};
use crate::core::model::{SeatId, ShowId, UserId};
use crate::util::clock::{Clock, SystemClock};

/// A timed claim on one seat of one show by one user.
///
/// Never mutated; renewing a hold replaces the entry with a new lock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatLock {
    /// Seat held.
    pub seat: SeatId,
    /// Show the hold applies to.
    pub show: ShowId,
    /// User holding the seat.
    pub holder: UserId,
    /// How long the hold lasts.
    pub timeout: Duration,
    /// When the hold was taken, in milliseconds since epoch.
    pub created_at_ms: u128,
}

impl SeatLock {
    /// Instant at which the lock stops counting.
    #[must_use]
    pub const fn expires_at_ms(&self) -> u128 {
        self.created_at_ms + self.timeout.as_millis()
    }

    /// `now >= created_at + timeout`.
    #[must_use]
    pub const fn is_expired_at(&self, now_ms: u128) -> bool {
        now_ms >= self.expires_at_ms()
    }

    /// Live and owned by `user`.
    #[must_use]
    pub fn is_held_by_at(&self, user: &UserId, now_ms: u128) -> bool {
        !self.is_expired_at(now_ms) && &self.holder == user
    }
}

/// Operations a seat-lock backend provides to the booking service.
pub trait SeatLockProvider: Send + Sync {
    /// Lock every seat for `user`, or none of them.
    ///
    /// # Errors
    ///
    /// [`ReservationError::SeatAlreadyLocked`] listing every seat held live by
    /// another user; nothing is written in that case.
    /// [`ReservationError::EmptySeatSelection`] if `seats` is empty.
    fn lock_seats(&self, show: ShowId, seats: &[SeatId], user: &UserId) -> ReservationResult<()>;

    /// Release the seats `user` holds. Seats held by anyone else, or not held
    /// at all, are left untouched.
    fn unlock_seats(&self, show: ShowId, seats: &[SeatId], user: &UserId);

    /// Whether `user` holds a live lock on `seat`.
    fn validate_lock(&self, show: ShowId, seat: SeatId, user: &UserId) -> bool;

    /// Seats with a live lock, sorted.
    fn locked_seats(&self, show: ShowId) -> Vec<SeatId>;
}

type ShowLocks = HashMap<SeatId, SeatLock>;

/// In-process [`SeatLockProvider`] with per-show critical sections.
pub struct LockRegistry {
    lock_timeout: Duration,
    /// Per-show lock maps, created on first use.
    shows: RwLock<HashMap<ShowId, Mutex<ShowLocks>>>,
    clock: Arc<dyn Clock>,
}

impl LockRegistry {
    /// Registry using the system clock.
    #[must_use]
    pub fn new(lock_timeout: Duration) -> Self {
        Self::with_clock(lock_timeout, Arc::new(SystemClock))
    }

    /// Registry reading time from `clock`.
    #[must_use]
    pub fn with_clock(lock_timeout: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            lock_timeout,
            shows: RwLock::new(HashMap::new()),
            clock,
        }
    }

    /// Timeout applied to every new lock.
    #[must_use]
    pub const fn lock_timeout(&self) -> Duration {
        self.lock_timeout
    }

    /// Clock used for expiry checks.
    #[must_use]
    pub fn clock(&self) -> Arc<dyn Clock> {
        Arc::clone(&self.clock)
    }

    /// The live lock on `seat`, if any.
    #[must_use]
    pub fn active_lock(&self, show: ShowId, seat: SeatId) -> Option<SeatLock> {
        let shows = self.shows.read();
        let locks = shows.get(&show)?.lock();
        let now = self.clock.now_ms();
        locks
            .get(&seat)
            .filter(|lock| !lock.is_expired_at(now))
            .cloned()
    }

    /// Number of stored entries for a show, expired ones included.
    #[must_use]
    pub fn stored_entries(&self, show: ShowId) -> usize {
        self.shows
            .read()
            .get(&show)
            .map_or(0, |locks| locks.lock().len())
    }

    /// Drop expired entries everywhere, and shows left with none.
    /// Returns how many locks were removed.
    pub fn purge_expired(&self) -> usize {
        let mut shows = self.shows.write();
        let now = self.clock.now_ms();
        let mut removed = 0;
        shows.retain(|_, locks| {
            let locks = locks.get_mut();
            let before = locks.len();
            locks.retain(|_, lock| !lock.is_expired_at(now));
            removed += before - locks.len();
            !locks.is_empty()
        });
        if removed > 0 {
            debug!(removed, "purged expired seat locks");
        }
        removed
    }

    /// Run `f` on the show's map under its mutex, creating the map if needed.
    ///
    /// The read guard on `shows` stays held for the duration of `f`, so
    /// [`Self::purge_expired`] cannot detach a map while it is in use.
    /// A missing map is inserted under the write guard, which is then
    /// downgraded, so `f` never runs while other shows are shut out.
    fn with_show<R>(&self, show: ShowId, f: impl FnOnce(&mut ShowLocks) -> R) -> R {
        let mut shows = self.shows.read();
        loop {
            if let Some(locks) = shows.get(&show) {
                let mut locks = locks.lock();
                return f(&mut locks);
            }
            drop(shows);
            let mut created = self.shows.write();
            created.entry(show).or_default();
            shows = RwLockWriteGuard::downgrade(created);
        }
    }
}

impl SeatLockProvider for LockRegistry {
    fn lock_seats(&self, show: ShowId, seats: &[SeatId], user: &UserId) -> ReservationResult<()> {
        let requested: BTreeSet<SeatId> = seats.iter().copied().collect();
        if requested.is_empty() {
            return Err(ReservationError::EmptySeatSelection);
        }

        self.with_show(show, |locks| {
            let now = self.clock.now_ms();
            let conflicts: Vec<SeatId> = requested
                .iter()
                .copied()
                .filter(|seat| {
                    locks
                        .get(seat)
                        .is_some_and(|lock| !lock.is_expired_at(now) && &lock.holder != user)
                })
                .collect();

            if !conflicts.is_empty() {
                info!(%show, %user, ?conflicts, "seat lock conflict");
                return Err(ReservationError::SeatAlreadyLocked {
                    show,
                    seats: conflicts,
                });
            }

            for seat in &requested {
                locks.insert(
                    *seat,
                    SeatLock {
                        seat: *seat,
                        show,
                        holder: user.clone(),
                        timeout: self.lock_timeout,
                        created_at_ms: now,
                    },
                );
            }
            debug!(%show, %user, count = requested.len(), "seats locked");
            Ok(())
        })
    }

    fn unlock_seats(&self, show: ShowId, seats: &[SeatId], user: &UserId) {
        let shows = self.shows.read();
        let Some(locks) = shows.get(&show) else {
            return;
        };
        let mut locks = locks.lock();
        let mut released = 0_usize;
        for seat in seats {
            if locks.get(seat).is_some_and(|lock| &lock.holder == user) {
                locks.remove(seat);
                released += 1;
            }
        }
        debug!(%show, %user, released, "seats unlocked");
    }

    fn validate_lock(&self, show: ShowId, seat: SeatId, user: &UserId) -> bool {
        let shows = self.shows.read();
        let Some(locks) = shows.get(&show) else {
            return false;
        };
        let now = self.clock.now_ms();
        let held = locks
            .lock()
            .get(&seat)
            .is_some_and(|lock| lock.is_held_by_at(user, now));
        held
    }

    fn locked_seats(&self, show: ShowId) -> Vec<SeatId> {
        let shows = self.shows.read();
        let Some(locks) = shows.get(&show) else {
            return Vec::new();
        };
        let now = self.clock.now_ms();
        let mut seats: Vec<SeatId> = locks
            .lock()
            .values()
            .filter(|lock| !lock.is_expired_at(now))
            .map(|lock| lock.seat)
            .collect();
        seats.sort_unstable();
        seats
    }
}
