//! Shows never wait on each other.
//!
//! These tests verify:
//! 1. A slow first lock on a new show leaves lock, validate and snapshot
//!    calls on an existing show unblocked
//! 2. A slow first booking on a new show leaves booking, confirmation and
//!    availability inputs of an existing show unblocked
//!
//! The slow path is produced by a clock that sleeps whenever it is read from
//! one designated thread, which parks that thread inside its show's critical
//! section.

use boxoffice::core::{BookingService, LockRegistry, SeatId, SeatLockProvider, ShowId, UserId};
use boxoffice::util::{Clock, ManualClock};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

const STALLED_THREAD: &str = "stalled-show";
const PAUSE: Duration = Duration::from_millis(600);
const PROMPT: Duration = Duration::from_millis(200);

/// Clock that sleeps for `PAUSE` on every read made by `STALLED_THREAD`.
struct StallingClock {
    inner: ManualClock,
    stalled: AtomicBool,
}

impl StallingClock {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            inner: ManualClock::new(1_700_000_000_000),
            stalled: AtomicBool::new(false),
        })
    }

    fn wait_until_stalled(&self) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while !self.stalled.load(Ordering::Acquire) {
            assert!(Instant::now() < deadline, "stalled thread never read the clock");
            thread::sleep(Duration::from_millis(1));
        }
    }
}

impl Clock for StallingClock {
    fn now_ms(&self) -> u128 {
        if thread::current().name() == Some(STALLED_THREAD) {
            self.stalled.store(true, Ordering::Release);
            thread::sleep(PAUSE);
        }
        self.inner.now_ms()
    }
}

fn spawn_stalled<T: Send + 'static>(f: impl FnOnce() -> T + Send + 'static) -> JoinHandle<T> {
    thread::Builder::new()
        .name(STALLED_THREAD.into())
        .spawn(f)
        .unwrap()
}

#[test]
fn test_first_lock_on_new_show_does_not_block_existing_show() {
    let clock = StallingClock::new();
    let registry = Arc::new(LockRegistry::with_clock(
        Duration::from_secs(600),
        clock.clone(),
    ));
    let user = UserId::new("a");
    registry.lock_seats(ShowId(1), &[SeatId(1)], &user).unwrap();

    let slow = {
        let registry = Arc::clone(&registry);
        spawn_stalled(move || registry.lock_seats(ShowId(2), &[SeatId(1)], &UserId::new("b")))
    };
    clock.wait_until_stalled();

    let started = Instant::now();
    registry.lock_seats(ShowId(1), &[SeatId(2)], &user).unwrap();
    assert!(registry.validate_lock(ShowId(1), SeatId(1), &user));
    assert_eq!(registry.locked_seats(ShowId(1)), vec![SeatId(1), SeatId(2)]);
    let waited = started.elapsed();

    slow.join().unwrap().unwrap();
    assert!(waited < PROMPT, "show 1 waited {waited:?} behind show 2");
    assert_eq!(registry.locked_seats(ShowId(2)), vec![SeatId(1)]);
}

#[test]
fn test_first_booking_on_new_show_does_not_block_existing_show() {
    let clock = StallingClock::new();
    let locks = Arc::new(LockRegistry::with_clock(
        Duration::from_secs(600),
        clock.clone(),
    ));
    let service = Arc::new(BookingService::new(locks, clock.clone()));
    let user = UserId::new("a");
    let pending = service
        .create_booking(&user, ShowId(1), &[SeatId(1)])
        .unwrap();

    let slow = {
        let service = Arc::clone(&service);
        spawn_stalled(move || {
            service
                .create_booking(&UserId::new("b"), ShowId(2), &[SeatId(1)])
                .map(|booking| booking.id())
        })
    };
    clock.wait_until_stalled();

    let started = Instant::now();
    service.confirm_booking(pending.id()).unwrap();
    service
        .create_booking(&user, ShowId(1), &[SeatId(2)])
        .unwrap();
    assert_eq!(service.confirmed_seats(ShowId(1)), vec![SeatId(1)]);
    assert_eq!(
        service.lock_provider().locked_seats(ShowId(1)),
        vec![SeatId(1), SeatId(2)]
    );
    let waited = started.elapsed();

    let other = slow.join().unwrap().unwrap();
    assert!(waited < PROMPT, "show 1 waited {waited:?} behind show 2");
    assert!(service.get_booking(other).is_ok());
    assert_eq!(service.pending_count(ShowId(2)), 1);
}
