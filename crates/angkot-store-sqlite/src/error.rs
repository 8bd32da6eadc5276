//! Mapping from SQLite failures into the core error taxonomy.
//!
//! The ledger never retries internally; a writer that times out on the
//! database lock surfaces `StoreUnavailable` and leaves retry policy to
//! the dispatcher's caller. Anything unrecognised becomes
//! `Error::Storage` with the detail kept for the logs.

use angkot_core::Error;

/// Map a `tokio_rusqlite` failure to the core taxonomy.
pub(crate) fn map_db_error(err: tokio_rusqlite::Error) -> Error {
  if let tokio_rusqlite::Error::Rusqlite(ref inner) = err
    && is_busy(inner)
  {
    return Error::StoreUnavailable;
  }
  Error::Storage(err.to_string())
}

/// Lock-acquisition timeout: the transaction could not begin or commit.
pub(crate) fn is_busy(err: &rusqlite::Error) -> bool {
  matches!(
    err,
    rusqlite::Error::SqliteFailure(e, _)
      if e.code == rusqlite::ErrorCode::DatabaseBusy
        || e.code == rusqlite::ErrorCode::DatabaseLocked
  )
}

/// Unique-index violation, e.g. registering an existing driver name.
pub(crate) fn is_unique_violation(err: &rusqlite::Error) -> bool {
  matches!(
    err,
    rusqlite::Error::SqliteFailure(e, _)
      if e.code == rusqlite::ErrorCode::ConstraintViolation
  )
}
