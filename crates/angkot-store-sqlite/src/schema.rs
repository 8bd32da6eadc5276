//! SQL schema for the angkot SQLite store.
//!
//! Executed once at connection startup. Two constraints back invariants
//! the ledger relies on:
//!
//! - `drivers.name` is UNIQUE — duplicate registrations fail instead of
//!   silently forking a driver.
//! - each leg table is UNIQUE over `(driver_id, trip_date)` — at most one
//!   departure and one return per driver per business day, even under
//!   racing writers.
//!
//! `trip_date` holds the business day (`YYYY-MM-DD`, already offset into
//! the configured timezone) as its own column, so day attribution never
//! depends on how the reader interprets `created_at`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;
PRAGMA busy_timeout = 5000;

CREATE TABLE IF NOT EXISTS drivers (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    name        TEXT NOT NULL UNIQUE,
    created_at  TEXT NOT NULL    -- ISO 8601 UTC
);

CREATE TABLE IF NOT EXISTS passengers (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    name        TEXT NOT NULL,
    created_at  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS departures (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    driver_id   INTEGER NOT NULL REFERENCES drivers(id),
    trip_date   TEXT NOT NULL,   -- business day, YYYY-MM-DD
    created_at  TEXT NOT NULL,
    UNIQUE (driver_id, trip_date)
);

-- Line items are wholly owned by their leg and deleted en masse when the
-- leg is re-recorded. passenger_name is free text on purpose: ad hoc
-- riders need not exist in the passengers roster.
CREATE TABLE IF NOT EXISTS departure_passengers (
    departure_id   INTEGER NOT NULL REFERENCES departures(id),
    passenger_name TEXT NOT NULL,
    price          INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS returns (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    driver_id   INTEGER NOT NULL REFERENCES drivers(id),
    trip_date   TEXT NOT NULL,
    created_at  TEXT NOT NULL,
    UNIQUE (driver_id, trip_date)
);

CREATE TABLE IF NOT EXISTS return_passengers (
    return_id      INTEGER NOT NULL REFERENCES returns(id),
    passenger_name TEXT NOT NULL,
    price          INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS departures_date_idx ON departures(trip_date);
CREATE INDEX IF NOT EXISTS returns_date_idx    ON returns(trip_date);
CREATE INDEX IF NOT EXISTS departure_passengers_name_idx
    ON departure_passengers(passenger_name);
CREATE INDEX IF NOT EXISTS return_passengers_name_idx
    ON return_passengers(passenger_name);

PRAGMA user_version = 1;
";
