//! SQLite backend for the angkot trip ledger.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated
//! thread without blocking the async runtime. Each `TripStore` operation
//! executes inside one rusqlite transaction on that thread, which also
//! serialises concurrent writers.

mod error;
mod schema;
mod store;

pub use store::{SqliteStore, StoreOptions};
