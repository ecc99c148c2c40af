//! Runtime adapters: the id-based reservation desk and expiry sweepers.

pub mod api;
pub mod sweeper;
#[cfg(feature = "tokio-runtime")]
pub mod tokio_sweeper;

pub use api::{
    health, submit_booking, AvailabilityResponse, BookingReceipt, BookingRequest, Health,
    ReservationDesk,
};
pub use sweeper::{sweep_once, SweepReport, SweepWorker};
#[cfg(feature = "tokio-runtime")]
pub use tokio_sweeper::TokioSweeper;
