//! Inbound message classification and trip-sheet parsing.
//!
//! A trip sheet looks like:
//!
//! ```text
//! antar
//! Driver: Pak Ahmad
//! - Santri Ali
//! - Santri Umar
//! ```
//!
//! The first line is the leg keyword (`antar` = departure, `jemput` =
//! return), the second names the driver, and every following non-empty
//! line is one passenger, with an optional leading bullet stripped.

use angkot_core::{Error, Result, trip::LegKind};

/// What a chat message asks the bot to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
  Ping,
  Help,
  /// `/santri` — prompt for a passenger name to register.
  AddPassengerPrompt,
  /// `/daftarsantri`
  ListPassengers,
  /// `/driver` — prompt for a driver name to register.
  AddDriverPrompt,
  /// `/drivers`
  ListDrivers,
  /// `/antar` — show the departure sheet format.
  DepartureFormat,
  /// `/jemput` — show the return sheet format.
  ReturnFormat,
  /// `/laporan [DD-MM-YYYY|kemarin]`
  Report { date_arg: Option<String> },
  /// `/backupdb` — admin only.
  BackupDb,
  /// A full trip sheet; the raw text still needs [`parse_trip_sheet`].
  TripSheet { kind: LegKind, raw: String },
  /// Anything else; may be the answer to a pending prompt.
  Other(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TripSheet {
  pub driver:     String,
  pub passengers: Vec<String>,
}

/// Classify one inbound message. Never fails: an unparseable trip sheet
/// is still `TripSheet` material and surfaces its error from
/// [`parse_trip_sheet`] at the dispatch site instead.
pub fn parse_message(text: &str) -> Command {
  let trimmed = text.trim();

  match trimmed {
    "/ping" => return Command::Ping,
    "/start" | "/help" => return Command::Help,
    "/santri" => return Command::AddPassengerPrompt,
    "/daftarsantri" => return Command::ListPassengers,
    "/driver" => return Command::AddDriverPrompt,
    "/drivers" => return Command::ListDrivers,
    "/antar" => return Command::DepartureFormat,
    "/jemput" => return Command::ReturnFormat,
    "/backupdb" => return Command::BackupDb,
    _ => {}
  }

  if let Some(rest) = trimmed.strip_prefix("/laporan") {
    let date_arg = rest.split_whitespace().next().map(str::to_string);
    return Command::Report { date_arg };
  }

  if let Some(kind) = sheet_kind(trimmed) {
    return Command::TripSheet { kind, raw: trimmed.to_string() };
  }

  Command::Other(trimmed.to_string())
}

/// Leg keyword on the first line, if any.
pub fn sheet_kind(text: &str) -> Option<LegKind> {
  let first = text.lines().next()?.trim().to_lowercase();
  match first.as_str() {
    "antar" => Some(LegKind::Departure),
    "jemput" => Some(LegKind::Return),
    _ => None,
  }
}

/// Parse the body of a trip sheet (everything after the keyword line).
pub fn parse_trip_sheet(text: &str) -> Result<TripSheet> {
  let mut lines = text.lines().skip(1).map(str::trim).filter(|l| !l.is_empty());

  let driver_line = lines
    .next()
    .ok_or_else(|| Error::MalformedInput("trip sheet has no driver line".into()))?;
  let driver = driver_line
    .strip_prefix("Driver:")
    .or_else(|| driver_line.strip_prefix("driver:"))
    .ok_or_else(|| {
      Error::MalformedInput(format!("expected \"Driver: <nama>\", got {driver_line:?}"))
    })?
    .trim()
    .to_string();
  if driver.is_empty() {
    return Err(Error::MalformedInput("driver name is empty".into()));
  }

  let passengers: Vec<String> = lines
    .map(strip_bullet)
    .filter(|name| !name.is_empty())
    .collect();
  if passengers.is_empty() {
    return Err(Error::MalformedInput("passenger list is empty".into()));
  }

  Ok(TripSheet { driver, passengers })
}

fn strip_bullet(line: &str) -> String {
  line
    .trim_start_matches(['-', '*', '•'])
    .trim()
    .to_string()
}
