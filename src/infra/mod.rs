//! Infrastructure adapters for catalog storage.

pub mod catalog;

pub use catalog::InMemoryCatalog;
