//! SQLite persistence for the price store, built on Diesel.
//!
//! The schema lives in embedded migrations; [`db::init`] prepares the
//! database file, [`db::create_pool`] builds the r2d2 pool, and
//! [`SqlitePriceStore`] implements the `securitydb_core` store trait on
//! top of it.

pub mod db;
pub mod errors;
pub mod schema;
pub mod securities;

pub use db::{create_pool, get_connection, init, run_migrations, DbConnection, DbPool};
pub use securities::SqlitePriceStore;
