//! Reservation core: value objects, seat locks, bookings and availability.

pub mod audit;
pub mod availability;
pub mod booking;
pub mod booking_service;
pub mod catalog;
pub mod error;
pub mod lock_registry;
pub mod model;

pub use audit::{
    build_audit_event, AuditAction, AuditEvent, AuditSink, InMemoryAuditSink, TracingAuditSink,
};
pub use availability::AvailabilityQuery;
pub use booking::{Booking, BookingSnapshot, BookingStatus};
pub use booking_service::BookingService;
pub use catalog::Catalog;
pub use error::{AppResult, Entity, ReservationError, ReservationResult};
pub use lock_registry::{LockRegistry, SeatLock, SeatLockProvider};
pub use model::{
    BookingId, MovieId, Screen, ScreenId, Seat, SeatCategory, SeatId, Show, ShowId, User, UserId,
};
