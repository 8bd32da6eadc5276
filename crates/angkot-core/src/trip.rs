//! Trip legs and their line items.
//!
//! A leg is one recorded departure or return for one driver on one
//! calendar day; there is at most one per (driver, kind, day). Its line
//! items — one per boarding — are wholly owned by the leg and replaced
//! en masse when the leg is re-recorded.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Which half of the day's round trip a leg records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LegKind {
  Departure,
  Return,
}

/// One passenger's fare entry within a leg. The name is free text; ad hoc
/// riders need not be registered passengers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordedLine {
  pub passenger: String,
  pub fare:      i64,
}

/// The persisted outcome of recording one leg.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordedLeg {
  pub id:     i64,
  pub kind:   LegKind,
  pub driver: String,
  pub date:   NaiveDate,
  pub lines:  Vec<RecordedLine>,
}

impl RecordedLeg {
  /// Sum of all line-item fares on this leg.
  pub fn total(&self) -> i64 {
    self.lines.iter().map(|line| line.fare).sum()
  }
}

/// One driver's recorded legs for a report date.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriverDay {
  pub driver:     String,
  pub departures: Vec<RecordedLine>,
  pub returns:    Vec<RecordedLine>,
}

impl DriverDay {
  pub fn subtotal(&self) -> i64 {
    self
      .departures
      .iter()
      .chain(self.returns.iter())
      .map(|line| line.fare)
      .sum()
  }
}
