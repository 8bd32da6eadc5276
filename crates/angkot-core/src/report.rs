//! Daily report building: date parsing and plain-text rendering.
//!
//! Reports are aggregated per driver — departures, returns, subtotal —
//! with a grand total across all drivers. All user-facing text is
//! Indonesian, matching the chat surface.

use chrono::{Days, NaiveDate};

use crate::{
  error::{Error, Result},
  trip::DriverDay,
};

/// Report dates come from chat as `DD-MM-YYYY`.
pub const DATE_FORMAT: &str = "%d-%m-%Y";

/// Sentinel accepted in place of a date: yesterday relative to `today`.
pub const YESTERDAY: &str = "kemarin";

/// Parse a report-date argument. Accepts [`YESTERDAY`] or a `DD-MM-YYYY`
/// date; anything else is `InvalidDateFormat`.
pub fn parse_report_date(text: &str, today: NaiveDate) -> Result<NaiveDate> {
  let text = text.trim();
  if text.eq_ignore_ascii_case(YESTERDAY) {
    return today
      .checked_sub_days(Days::new(1))
      .ok_or_else(|| Error::InvalidDateFormat(text.to_string()));
  }
  NaiveDate::parse_from_str(text, DATE_FORMAT)
    .map_err(|_| Error::InvalidDateFormat(text.to_string()))
}

/// Format rupiah with dot thousand separators: `18000` → `Rp18.000`.
pub fn format_rupiah(amount: i64) -> String {
  let negative = amount < 0;
  let digits = amount.unsigned_abs().to_string();
  let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
  let offset = digits.len() % 3;
  for (i, ch) in digits.chars().enumerate() {
    if i > 0 && (i + 3 - offset) % 3 == 0 {
      grouped.push('.');
    }
    grouped.push(ch);
  }
  if negative {
    format!("-Rp{grouped}")
  } else {
    format!("Rp{grouped}")
  }
}

/// Render the report for `date`. Fails with `NoDataForDate` when no leg
/// exists that day; the dispatcher surfaces that as a plain message, not
/// a hard failure.
pub fn build_report(date: NaiveDate, days: &[DriverDay]) -> Result<String> {
  if days.is_empty() {
    return Err(Error::NoDataForDate(date));
  }

  let mut out = format!("Laporan {}\n", date.format(DATE_FORMAT));
  let mut grand_total = 0;

  for day in days {
    out.push('\n');
    out.push_str(&day.driver);
    out.push('\n');
    if !day.departures.is_empty() {
      out.push_str("Antar:\n");
      for line in &day.departures {
        out.push_str(&format!(
          "- {}: {}\n",
          line.passenger,
          format_rupiah(line.fare)
        ));
      }
    }
    if !day.returns.is_empty() {
      out.push_str("Jemput:\n");
      for line in &day.returns {
        out.push_str(&format!(
          "- {}: {}\n",
          line.passenger,
          format_rupiah(line.fare)
        ));
      }
    }
    let subtotal = day.subtotal();
    grand_total += subtotal;
    out.push_str(&format!("Subtotal: {}\n", format_rupiah(subtotal)));
  }

  out.push_str(&format!("\nTotal: {}", format_rupiah(grand_total)));
  Ok(out)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::trip::RecordedLine;

  fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
  }

  // ── Date parsing ──────────────────────────────────────────────────────

  #[test]
  fn parses_explicit_date() {
    let parsed = parse_report_date("05-01-2025", date("2025-02-01")).unwrap();
    assert_eq!(parsed, date("2025-01-05"));
  }

  #[test]
  fn kemarin_is_yesterday_relative_to_today() {
    let parsed = parse_report_date("kemarin", date("2025-03-01")).unwrap();
    assert_eq!(parsed, date("2025-02-28"));
  }

  #[test]
  fn garbage_is_invalid_date_format() {
    for bad in ["besok", "2025-01-05", "1-2", "05/01/2025", ""] {
      let err = parse_report_date(bad, date("2025-02-01")).unwrap_err();
      assert!(matches!(err, Error::InvalidDateFormat(_)), "input {bad:?}");
    }
  }

  // ── Rupiah formatting ─────────────────────────────────────────────────

  #[test]
  fn rupiah_grouping() {
    assert_eq!(format_rupiah(0), "Rp0");
    assert_eq!(format_rupiah(800), "Rp800");
    assert_eq!(format_rupiah(8_000), "Rp8.000");
    assert_eq!(format_rupiah(10_000), "Rp10.000");
    assert_eq!(format_rupiah(1_234_567), "Rp1.234.567");
  }

  // ── Report rendering ──────────────────────────────────────────────────

  fn line(name: &str, fare: i64) -> RecordedLine {
    RecordedLine { passenger: name.to_string(), fare }
  }

  #[test]
  fn empty_day_is_no_data() {
    let err = build_report(date("2025-01-05"), &[]).unwrap_err();
    assert!(matches!(err, Error::NoDataForDate(_)));
  }

  #[test]
  fn report_lists_drivers_and_totals() {
    let days = vec![
      DriverDay {
        driver:     "Pak Ahmad".to_string(),
        departures: vec![line("Santri Ali", 10_000), line("Santri Umar", 10_000)],
        returns:    vec![line("Santri Ali", 8_000)],
      },
      DriverDay {
        driver:     "Pak Budi".to_string(),
        departures: vec![line("Santri Hasan", 10_000)],
        returns:    vec![],
      },
    ];

    let report = build_report(date("2025-01-05"), &days).unwrap();
    assert!(report.starts_with("Laporan 05-01-2025\n"));
    assert!(report.contains("Pak Ahmad"));
    assert!(report.contains("Pak Budi"));
    assert!(report.contains("- Santri Ali: Rp10.000"));
    assert!(report.contains("- Santri Ali: Rp8.000"));
    assert!(report.contains("Subtotal: Rp28.000"));
    assert!(report.contains("Subtotal: Rp10.000"));
    // Grand total across all drivers equals the sum of every line item.
    assert!(report.ends_with("Total: Rp38.000"));
  }

  #[test]
  fn driver_without_returns_omits_the_section() {
    let days = vec![DriverDay {
      driver:     "Pak Budi".to_string(),
      departures: vec![line("Santri Hasan", 10_000)],
      returns:    vec![],
    }];
    let report = build_report(date("2025-01-05"), &days).unwrap();
    assert!(report.contains("Antar:"));
    assert!(!report.contains("Jemput:"));
  }
}
