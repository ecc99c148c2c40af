//! Configuration models for seat holds, sweeping and auditing.

pub mod reservation;

pub use reservation::ReservationConfig;
