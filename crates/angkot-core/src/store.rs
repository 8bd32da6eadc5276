//! The `TripStore` trait.
//!
//! Implemented by storage backends (e.g. `angkot-store-sqlite`). The
//! dispatcher depends on this abstraction, not on any concrete backend.
//!
//! Every method executes inside its own atomic transaction: either the
//! whole operation is visible afterwards or none of it is. Implementations
//! must be safe for concurrent callers; two racing `record_leg` calls for
//! the same (driver, kind, day) must leave exactly one leg. Backends map
//! their own failures into the [`Error`](crate::Error) taxonomy so the
//! dispatcher can pick one fixed message per kind.

use std::future::Future;

use chrono::NaiveDate;

use crate::{
  error::Result,
  roster::{Driver, Passenger},
  trip::{DriverDay, LegKind, RecordedLeg},
};

/// Abstraction over the trip ledger's storage backend.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait TripStore: Send + Sync {
  // ── Roster ────────────────────────────────────────────────────────────

  /// Register a new driver. Names are unique; registering a name twice
  /// fails with `DuplicateDriver`.
  fn register_driver<'a>(
    &'a self,
    name: &'a str,
  ) -> impl Future<Output = Result<Driver>> + Send + 'a;

  fn driver_exists<'a>(
    &'a self,
    name: &'a str,
  ) -> impl Future<Output = Result<bool>> + Send + 'a;

  /// Register a passenger. Duplicate names are tolerated here; passenger
  /// identity on trips is free text anyway.
  fn register_passenger<'a>(
    &'a self,
    name: &'a str,
  ) -> impl Future<Output = Result<Passenger>> + Send + 'a;

  /// All drivers, newest first.
  fn list_drivers(&self)
  -> impl Future<Output = Result<Vec<Driver>>> + Send + '_;

  /// All passengers, newest first.
  fn list_passengers(
    &self,
  ) -> impl Future<Output = Result<Vec<Passenger>>> + Send + '_;

  /// Count of departure + return boardings recorded today under this
  /// passenger name, across all drivers.
  fn trip_count_today<'a>(
    &'a self,
    passenger_name: &'a str,
  ) -> impl Future<Output = Result<u32>> + Send + 'a;

  // ── Ledger ────────────────────────────────────────────────────────────

  /// Record (or re-record) one leg for a driver today.
  ///
  /// Upserts the leg for (driver, kind, today): an existing leg keeps its
  /// id but has its line items replaced by `passenger_names`, each priced
  /// by the fare policy against the passenger's trip count at that point
  /// in the transaction. Duplicate names in one call are each charged as
  /// an independent boarding.
  fn record_leg<'a>(
    &'a self,
    kind: LegKind,
    driver_name: &'a str,
    passenger_names: &'a [String],
  ) -> impl Future<Output = Result<RecordedLeg>> + Send + 'a;

  // ── Reports ───────────────────────────────────────────────────────────

  /// Every driver with at least one leg on `date`, line items in
  /// insertion order. Empty when nothing was recorded that day.
  fn legs_for_date(
    &self,
    date: NaiveDate,
  ) -> impl Future<Output = Result<Vec<DriverDay>>> + Send + '_;

  /// The store's current business day. Day boundaries are the store's to
  /// define (it applies the configured UTC offset), so callers asking for
  /// "today" or "yesterday" must start from this date.
  fn today(&self) -> NaiveDate;
}
