//! Error types for `angkot-core`.

use chrono::NaiveDate;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("driver not registered: {0}")]
  UnknownDriver(String),

  #[error("driver already registered: {0}")]
  DuplicateDriver(String),

  #[error("malformed input: {0}")]
  MalformedInput(String),

  /// The store could not begin or commit a transaction within its timeout.
  /// Retrying is the caller's decision, never the ledger's.
  #[error("store unavailable")]
  StoreUnavailable,

  #[error("no trips recorded on {0}")]
  NoDataForDate(NaiveDate),

  #[error("unrecognised report date: {0:?}")]
  InvalidDateFormat(String),

  #[error(
    "fare policy misconfigured: round trip {round_trip} must not undercut \
     single trip {single_trip}"
  )]
  InvalidFarePolicy { single_trip: i64, round_trip: i64 },

  /// Any other backend failure. Surfaced to users as a generic
  /// saving/reading message; the detail stays in the logs.
  #[error("storage error: {0}")]
  Storage(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
