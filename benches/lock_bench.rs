//! Benchmarks for seat holds and the booking lifecycle.
//!
//! Benchmarks cover:
//! - Multi-seat lock/unlock on one show
//! - Conflicting lock attempts
//! - Contended locking across threads and shows
//! - Book → confirm and availability queries

#![allow(missing_docs)]

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::hint::black_box;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use boxoffice::builders::build_desk;
use boxoffice::config::ReservationConfig;
use boxoffice::core::{
    BookingService, LockRegistry, MovieId, SeatCategory, SeatId, SeatLockProvider, ShowId, User,
    UserId,
};
use boxoffice::infra::InMemoryCatalog;
use boxoffice::util::SystemClock;

const TIMEOUT: Duration = Duration::from_secs(600);

// ============================================================================
// Lock registry
// ============================================================================

fn bench_lock_unlock(c: &mut Criterion) {
    let mut group = c.benchmark_group("lock_registry/lock_unlock");
    for size in [1_u64, 4, 16] {
        let registry = LockRegistry::new(TIMEOUT);
        let user = UserId::new("bench");
        let seats: Vec<SeatId> = (0..size).map(SeatId).collect();
        group.throughput(Throughput::Elements(size));
        group.bench_with_input(BenchmarkId::from_parameter(size), &seats, |b, seats| {
            b.iter(|| {
                registry
                    .lock_seats(ShowId(1), black_box(seats), &user)
                    .unwrap();
                registry.unlock_seats(ShowId(1), seats, &user);
            });
        });
    }
    group.finish();
}

fn bench_conflict(c: &mut Criterion) {
    let registry = LockRegistry::new(TIMEOUT);
    let seats: Vec<SeatId> = (0..8).map(SeatId).collect();
    registry
        .lock_seats(ShowId(1), &seats, &UserId::new("holder"))
        .unwrap();
    let rival = UserId::new("rival");

    c.bench_function("lock_registry/conflict", |b| {
        b.iter(|| {
            black_box(registry.lock_seats(ShowId(1), black_box(&seats[4..]), &rival)).unwrap_err();
        });
    });
}

fn bench_contended(c: &mut Criterion) {
    let mut group = c.benchmark_group("lock_registry/contended");
    for shows in [1_u64, 4] {
        group.bench_with_input(BenchmarkId::new("shows", shows), &shows, |b, &shows| {
            b.iter(|| {
                let registry = Arc::new(LockRegistry::new(TIMEOUT));
                let handles: Vec<_> = (0..4_u64)
                    .map(|t| {
                        let registry = Arc::clone(&registry);
                        thread::spawn(move || {
                            let user = UserId::new(format!("user-{t}"));
                            let show = ShowId(t % shows);
                            for i in 0..250 {
                                let _ = registry.lock_seats(show, &[SeatId(i % 64)], &user);
                            }
                        })
                    })
                    .collect();
                for h in handles {
                    h.join().unwrap();
                }
            });
        });
    }
    group.finish();
}

// ============================================================================
// Booking lifecycle
// ============================================================================

fn bench_book_and_confirm(c: &mut Criterion) {
    let locks = Arc::new(LockRegistry::new(TIMEOUT));
    let service = BookingService::new(locks, Arc::new(SystemClock));
    let user = UserId::new("bench");
    let mut show = 0_u64;

    c.bench_function("booking/create_confirm", |b| {
        b.iter(|| {
            show += 1;
            let booking = service
                .create_booking(&user, ShowId(show), &[SeatId(1), SeatId(2)])
                .unwrap();
            service.confirm_booking(black_box(booking.id())).unwrap();
        });
    });
}

fn bench_available_seats(c: &mut Criterion) {
    let catalog = Arc::new(InMemoryCatalog::new());
    let screen = catalog.create_screen("bench");
    let seats: Vec<SeatId> = (0..200)
        .map(|_| {
            catalog
                .create_seat(screen, 1, SeatCategory::Silver, 100)
                .unwrap()
        })
        .collect();
    let show = catalog.create_show(MovieId(1), screen, 0, 7_200).unwrap();
    let desk = build_desk(&ReservationConfig::default(), catalog).unwrap();
    let user = User::with_email("bench", "bench@example.com");
    for chunk in seats.chunks(10).step_by(2) {
        desk.create_booking(&user, show, chunk).unwrap();
    }

    c.bench_function("availability/200_seats", |b| {
        b.iter(|| black_box(desk.available_seats(show).unwrap()));
    });
}

criterion_group!(
    benches,
    bench_lock_unlock,
    bench_conflict,
    bench_contended,
    bench_book_and_confirm,
    bench_available_seats
);
criterion_main!(benches);
