//! Core domain logic for the price history database.
//!
//! This crate owns the storage-agnostic pieces: the [`store::PriceStore`]
//! trait the storage backend implements, settings loading, symbol
//! universes, the update cutoff calculation, and the update service that
//! drives a full synchronization run.

pub mod errors;
pub mod reports;
pub mod settings;
pub mod store;
pub mod sync;
pub mod universe;
pub mod utils;

pub use errors::{DatabaseError, Error, Result};
