//! Builders to construct reservation components from configuration.

pub mod desk_builder;

pub use desk_builder::{build_desk, start_sweeper, DeskBuilder};
