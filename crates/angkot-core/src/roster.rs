//! Drivers and passengers — the registered roster.
//!
//! Driver names are unique and immutable once registered. Passenger rows
//! exist for listing only; trip line items carry free-text names and are
//! deliberately not foreign-keyed to this roster.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Driver {
  pub id:         i64,
  pub name:       String,
  pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Passenger {
  pub id:         i64,
  pub name:       String,
  pub created_at: DateTime<Utc>,
}
