//! Fare policy — how much one boarding costs.
//!
//! A passenger's first leg of the day is charged the single-trip price.
//! Every later leg that day is charged the remainder of the round-trip
//! price, so a passenger who rides out and back pays exactly
//! `round_trip` in total.

use crate::error::{Error, Result};

/// Default single-trip price in rupiah.
pub const DEFAULT_SINGLE_TRIP: i64 = 10_000;
/// Default round-trip price in rupiah.
pub const DEFAULT_ROUND_TRIP: i64 = 18_000;

/// Validated pricing pair. Construct once at startup; misconfiguration is
/// a fatal configuration error, not a runtime one.
#[derive(Debug, Clone, Copy)]
pub struct FarePolicy {
  single_trip: i64,
  round_trip:  i64,
}

impl FarePolicy {
  pub fn new(single_trip: i64, round_trip: i64) -> Result<Self> {
    if single_trip <= 0 || round_trip < single_trip {
      return Err(Error::InvalidFarePolicy { single_trip, round_trip });
    }
    Ok(Self { single_trip, round_trip })
  }

  /// Price for the next boarding of a passenger who has already made
  /// `trips_already_today` boardings today. Pure, no side effects.
  pub fn fare(&self, trips_already_today: u32) -> i64 {
    if trips_already_today == 0 {
      self.single_trip
    } else {
      self.round_trip - self.single_trip
    }
  }

  pub fn single_trip(&self) -> i64 { self.single_trip }

  pub fn round_trip(&self) -> i64 { self.round_trip }
}

impl Default for FarePolicy {
  fn default() -> Self {
    Self {
      single_trip: DEFAULT_SINGLE_TRIP,
      round_trip:  DEFAULT_ROUND_TRIP,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn first_trip_pays_single_price() {
    let policy = FarePolicy::default();
    assert_eq!(policy.fare(0), DEFAULT_SINGLE_TRIP);
  }

  #[test]
  fn later_trips_pay_the_round_trip_remainder() {
    let policy = FarePolicy::default();
    for n in 1..5 {
      assert_eq!(policy.fare(n), DEFAULT_ROUND_TRIP - DEFAULT_SINGLE_TRIP);
    }
  }

  #[test]
  fn round_trip_below_single_is_rejected() {
    let err = FarePolicy::new(10_000, 9_000).unwrap_err();
    assert!(matches!(err, Error::InvalidFarePolicy { .. }));
  }

  #[test]
  fn non_positive_single_price_is_rejected() {
    assert!(FarePolicy::new(0, 18_000).is_err());
    assert!(FarePolicy::new(-1, 18_000).is_err());
  }

  #[test]
  fn round_trip_equal_to_single_means_free_second_leg() {
    let policy = FarePolicy::new(10_000, 10_000).unwrap();
    assert_eq!(policy.fare(1), 0);
  }
}
