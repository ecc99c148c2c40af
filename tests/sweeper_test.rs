//! Background expiry sweeps on a thread and on tokio.

use boxoffice::builders::{start_sweeper, DeskBuilder};
use boxoffice::config::ReservationConfig;
use boxoffice::core::{BookingService, BookingStatus, LockRegistry, SeatId, ShowId, UserId};
use boxoffice::infra::InMemoryCatalog;
use boxoffice::runtime::{sweep_once, SweepReport, SweepWorker};
use boxoffice::util::ManualClock;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

const SHOW: ShowId = ShowId(1);

fn parts(clock: &ManualClock) -> (Arc<LockRegistry>, Arc<BookingService>) {
    let clock = Arc::new(clock.clone());
    let locks = Arc::new(LockRegistry::with_clock(Duration::from_secs(60), clock.clone()));
    let bookings = Arc::new(BookingService::new(Arc::clone(&locks), clock));
    (locks, bookings)
}

/// Poll `cond` every few milliseconds for up to two seconds.
fn eventually(cond: impl Fn() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_secs(2);
    while Instant::now() < deadline {
        if cond() {
            return true;
        }
        thread::sleep(Duration::from_millis(5));
    }
    cond()
}

#[test]
fn test_sweep_once_reports_work() {
    let clock = ManualClock::new(10_000);
    let (locks, bookings) = parts(&clock);
    let user = UserId::new("u");

    let lapsed = bookings.create_booking(&user, SHOW, &[SeatId(1)]).unwrap();
    let kept = bookings.create_booking(&user, SHOW, &[SeatId(2)]).unwrap();
    bookings.confirm_booking(kept.id()).unwrap();
    assert_eq!(sweep_once(&locks, &bookings), SweepReport::default());

    clock.advance(Duration::from_secs(60));
    let report = sweep_once(&locks, &bookings);

    assert_eq!(report.expired_bookings, 1);
    // the booking release drops one entry, the confirmed hold is purged
    assert_eq!(report.purged_locks, 1);
    assert_eq!(lapsed.status(), BookingStatus::Expired);
    assert_eq!(kept.status(), BookingStatus::Confirmed);
    assert_eq!(locks.stored_entries(SHOW), 0);
}

#[test]
fn test_thread_sweeper_expires_lapsed_bookings() {
    let clock = ManualClock::new(10_000);
    let (locks, bookings) = parts(&clock);
    let booking = bookings
        .create_booking(&UserId::new("u"), SHOW, &[SeatId(1), SeatId(2)])
        .unwrap();

    let worker = SweepWorker::spawn(
        Arc::clone(&locks),
        Arc::clone(&bookings),
        Duration::from_millis(10),
    )
    .unwrap();

    thread::sleep(Duration::from_millis(50));
    assert_eq!(booking.status(), BookingStatus::Created);

    clock.advance(Duration::from_secs(61));
    assert!(eventually(|| booking.status() == BookingStatus::Expired));
    assert!(eventually(|| locks.stored_entries(SHOW) == 0));

    worker.shutdown();
}

#[test]
fn test_start_sweeper_follows_config() {
    let disabled = ReservationConfig::default();
    let desk = DeskBuilder::new(disabled.clone())
        .build(Arc::new(InMemoryCatalog::new()))
        .unwrap();
    assert!(start_sweeper(&disabled, &desk).unwrap().is_none());

    let enabled = ReservationConfig {
        sweep_interval_secs: Some(1),
        ..ReservationConfig::default()
    };
    let worker = start_sweeper(&enabled, &desk).unwrap();
    assert!(worker.is_some());
    drop(worker);
}

#[cfg(feature = "tokio-runtime")]
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_tokio_sweeper_expires_lapsed_bookings() {
    use boxoffice::runtime::TokioSweeper;

    let clock = ManualClock::new(10_000);
    let (locks, bookings) = parts(&clock);
    let booking = bookings
        .create_booking(&UserId::new("u"), SHOW, &[SeatId(5)])
        .unwrap();

    let task = TokioSweeper::current().spawn(
        Arc::clone(&locks),
        Arc::clone(&bookings),
        Duration::from_millis(10),
    );
    clock.advance(Duration::from_secs(60));

    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    while booking.status() != BookingStatus::Expired && tokio::time::Instant::now() < deadline {
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    assert_eq!(booking.status(), BookingStatus::Expired);

    task.abort();
    assert!(task.await.unwrap_err().is_cancelled());
}
