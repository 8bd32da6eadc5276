//! [`SqliteStore`] — the SQLite implementation of [`TripStore`].

use std::path::Path;

use angkot_core::{
  Error, Result,
  fare::FarePolicy,
  roster::{Driver, Passenger},
  store::TripStore,
  trip::{DriverDay, LegKind, RecordedLeg, RecordedLine},
};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use rusqlite::{OptionalExtension as _, TransactionBehavior};

use crate::{
  error::{is_unique_violation, map_db_error},
  schema::SCHEMA,
};

// ─── Options ─────────────────────────────────────────────────────────────────

/// Store configuration fixed at open time.
#[derive(Debug, Clone, Copy)]
pub struct StoreOptions {
  pub policy: FarePolicy,
  /// Minutes added to UTC to derive the business day. The same offset is
  /// applied when stamping legs and when resolving report dates, so the
  /// writer and the reader can never disagree on which day a leg belongs
  /// to. Default 420 (UTC+7, WIB).
  pub tz_offset_minutes: i32,
}

impl Default for StoreOptions {
  fn default() -> Self {
    Self { policy: FarePolicy::default(), tz_offset_minutes: 420 }
  }
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A trip ledger backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted. All
/// operations run on the connection's dedicated thread, one at a time,
/// which together with immediate transactions serialises writers.
#[derive(Clone)]
pub struct SqliteStore {
  conn:    tokio_rusqlite::Connection,
  options: StoreOptions,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>, options: StoreOptions) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path)
      .await
      .map_err(map_db_error)?;
    let store = Self { conn, options };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store with default options — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    Self::open_in_memory_with(StoreOptions::default()).await
  }

  pub async fn open_in_memory_with(options: StoreOptions) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory()
      .await
      .map_err(map_db_error)?;
    let store = Self { conn, options };
    store.init_schema().await?;
    Ok(store)
  }

  pub fn policy(&self) -> FarePolicy { self.options.policy }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await
      .map_err(map_db_error)
  }
}

// ─── Encoding helpers ────────────────────────────────────────────────────────

fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::Storage(format!("bad timestamp {s:?}: {e}")))
}

fn encode_date(date: NaiveDate) -> String { date.format("%Y-%m-%d").to_string() }

/// Leg tables come in departure/return pairs with identical shapes.
fn leg_tables(kind: LegKind) -> (&'static str, &'static str, &'static str) {
  match kind {
    LegKind::Departure => ("departures", "departure_passengers", "departure_id"),
    LegKind::Return => ("returns", "return_passengers", "return_id"),
  }
}

/// Boardings recorded under `name` on `date`, both kinds, all drivers.
/// Runs on the caller's connection, so inside a transaction it sees line
/// items written earlier in that same transaction.
fn trip_count(
  conn: &rusqlite::Connection,
  name: &str,
  date: &str,
) -> rusqlite::Result<u32> {
  conn.query_row(
    "SELECT
       (SELECT COUNT(*) FROM departure_passengers dp
          JOIN departures d ON d.id = dp.departure_id
         WHERE dp.passenger_name = ?1 AND d.trip_date = ?2)
       +
       (SELECT COUNT(*) FROM return_passengers rp
          JOIN returns r ON r.id = rp.return_id
         WHERE rp.passenger_name = ?1 AND r.trip_date = ?2)",
    rusqlite::params![name, date],
    |row| row.get(0),
  )
}

// ─── TripStore impl ──────────────────────────────────────────────────────────

impl TripStore for SqliteStore {
  // ── Roster ────────────────────────────────────────────────────────────────

  async fn register_driver(&self, name: &str) -> Result<Driver> {
    let name = name.trim().to_string();
    if name.is_empty() {
      return Err(Error::MalformedInput("driver name is empty".into()));
    }

    let created_at = Utc::now();
    let at_str = encode_dt(created_at);
    let insert_name = name.clone();

    let inserted: Option<i64> = self
      .conn
      .call(move |conn| {
        let res = conn.execute(
          "INSERT INTO drivers (name, created_at) VALUES (?1, ?2)",
          rusqlite::params![insert_name, at_str],
        );
        match res {
          Ok(_) => Ok(Some(conn.last_insert_rowid())),
          Err(e) if is_unique_violation(&e) => Ok(None),
          Err(e) => Err(e.into()),
        }
      })
      .await
      .map_err(map_db_error)?;

    match inserted {
      Some(id) => Ok(Driver { id, name, created_at }),
      None => Err(Error::DuplicateDriver(name)),
    }
  }

  async fn driver_exists(&self, name: &str) -> Result<bool> {
    let name = name.trim().to_string();
    self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          "SELECT EXISTS(SELECT 1 FROM drivers WHERE name = ?1)",
          rusqlite::params![name],
          |row| row.get(0),
        )?)
      })
      .await
      .map_err(map_db_error)
  }

  async fn register_passenger(&self, name: &str) -> Result<Passenger> {
    let name = name.trim().to_string();
    if name.is_empty() {
      return Err(Error::MalformedInput("passenger name is empty".into()));
    }

    let created_at = Utc::now();
    let at_str = encode_dt(created_at);
    let insert_name = name.clone();

    let id = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO passengers (name, created_at) VALUES (?1, ?2)",
          rusqlite::params![insert_name, at_str],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await
      .map_err(map_db_error)?;

    Ok(Passenger { id, name, created_at })
  }

  async fn list_drivers(&self) -> Result<Vec<Driver>> {
    let raws: Vec<(i64, String, String)> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT id, name, created_at FROM drivers
           ORDER BY created_at DESC, id DESC",
        )?;
        let rows = stmt
          .query_map([], |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await
      .map_err(map_db_error)?;

    raws
      .into_iter()
      .map(|(id, name, at)| Ok(Driver { id, name, created_at: decode_dt(&at)? }))
      .collect()
  }

  async fn list_passengers(&self) -> Result<Vec<Passenger>> {
    let raws: Vec<(i64, String, String)> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT id, name, created_at FROM passengers
           ORDER BY created_at DESC, id DESC",
        )?;
        let rows = stmt
          .query_map([], |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await
      .map_err(map_db_error)?;

    raws
      .into_iter()
      .map(|(id, name, at)| {
        Ok(Passenger { id, name, created_at: decode_dt(&at)? })
      })
      .collect()
  }

  async fn trip_count_today(&self, passenger_name: &str) -> Result<u32> {
    let name = passenger_name.trim().to_string();
    let date = encode_date(self.today());
    self
      .conn
      .call(move |conn| Ok(trip_count(conn, &name, &date)?))
      .await
      .map_err(map_db_error)
  }

  // ── Ledger ────────────────────────────────────────────────────────────────

  async fn record_leg(
    &self,
    kind: LegKind,
    driver_name: &str,
    passenger_names: &[String],
  ) -> Result<RecordedLeg> {
    let driver = driver_name.trim().to_string();
    if driver.is_empty() {
      return Err(Error::MalformedInput("driver name is empty".into()));
    }
    let names: Vec<String> = passenger_names
      .iter()
      .map(|n| n.trim().to_string())
      .filter(|n| !n.is_empty())
      .collect();
    if names.is_empty() {
      return Err(Error::MalformedInput("passenger list is empty".into()));
    }

    let policy = self.options.policy;
    let today = self.today();
    let date_str = encode_date(today);
    let lookup_name = driver.clone();

    // The whole upsert runs in one immediate transaction on the
    // connection thread: resolve the driver, reuse or create the leg,
    // then price and insert each boarding. Counts are read through the
    // transaction, so a duplicate name later in the same call already
    // sees the line items written before it.
    let outcome: Result<(i64, Vec<RecordedLine>)> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let driver_id: Option<i64> = tx
          .query_row(
            "SELECT id FROM drivers WHERE name = ?1",
            rusqlite::params![lookup_name],
            |row| row.get(0),
          )
          .optional()?;
        let Some(driver_id) = driver_id else {
          return Ok(Err(Error::UnknownDriver(lookup_name)));
        };

        let (leg_table, item_table, item_fk) = leg_tables(kind);
        let now_str = encode_dt(Utc::now());

        let existing: Option<i64> = tx
          .query_row(
            &format!(
              "SELECT id FROM {leg_table}
               WHERE driver_id = ?1 AND trip_date = ?2"
            ),
            rusqlite::params![driver_id, date_str],
            |row| row.get(0),
          )
          .optional()?;

        let leg_id = match existing {
          Some(id) => {
            // Replace in place: same leg id, fresh timestamp, new items.
            tx.execute(
              &format!("DELETE FROM {item_table} WHERE {item_fk} = ?1"),
              rusqlite::params![id],
            )?;
            tx.execute(
              &format!("UPDATE {leg_table} SET created_at = ?1 WHERE id = ?2"),
              rusqlite::params![now_str, id],
            )?;
            id
          }
          None => {
            tx.execute(
              &format!(
                "INSERT INTO {leg_table} (driver_id, trip_date, created_at)
                 VALUES (?1, ?2, ?3)"
              ),
              rusqlite::params![driver_id, date_str, now_str],
            )?;
            tx.last_insert_rowid()
          }
        };

        let mut lines = Vec::with_capacity(names.len());
        for name in &names {
          let already = trip_count(&tx, name, &date_str)?;
          let fare = policy.fare(already);
          tx.execute(
            &format!(
              "INSERT INTO {item_table} ({item_fk}, passenger_name, price)
               VALUES (?1, ?2, ?3)"
            ),
            rusqlite::params![leg_id, name, fare],
          )?;
          lines.push(RecordedLine { passenger: name.clone(), fare });
        }

        tx.commit()?;
        Ok(Ok((leg_id, lines)))
      })
      .await
      .map_err(map_db_error)?;

    let (id, lines) = outcome?;
    Ok(RecordedLeg { id, kind, driver, date: today, lines })
  }

  // ── Reports ───────────────────────────────────────────────────────────────

  async fn legs_for_date(&self, date: NaiveDate) -> Result<Vec<DriverDay>> {
    let date_str = encode_date(date);

    // (driver_id, driver_name, passenger, fare) per kind, drivers in
    // registration order, line items in insertion order.
    type Row = (i64, String, String, i64);
    let (departures, returns): (Vec<Row>, Vec<Row>) = self
      .conn
      .call(move |conn| {
        let fetch = |conn: &rusqlite::Connection,
                     kind: LegKind|
         -> rusqlite::Result<Vec<Row>> {
          let (leg_table, item_table, item_fk) = leg_tables(kind);
          let mut stmt = conn.prepare(&format!(
            "SELECT dr.id, dr.name, li.passenger_name, li.price
             FROM {leg_table} l
             JOIN drivers dr ON dr.id = l.driver_id
             JOIN {item_table} li ON li.{item_fk} = l.id
             WHERE l.trip_date = ?1
             ORDER BY dr.id, li.rowid"
          ))?;
          let rows = stmt
            .query_map(rusqlite::params![date_str], |row| {
              Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
          Ok(rows)
        };
        Ok((fetch(conn, LegKind::Departure)?, fetch(conn, LegKind::Return)?))
      })
      .await
      .map_err(map_db_error)?;

    // Merge the two row sets into per-driver days, keeping driver order.
    fn day_for(days: &mut Vec<(i64, DriverDay)>, id: i64, name: &str) -> usize {
      if let Some(pos) = days.iter().position(|(d, _)| *d == id) {
        pos
      } else {
        let pos = days.partition_point(|(d, _)| *d < id);
        days.insert(
          pos,
          (id, DriverDay {
            driver:     name.to_string(),
            departures: Vec::new(),
            returns:    Vec::new(),
          }),
        );
        pos
      }
    }
    let mut days: Vec<(i64, DriverDay)> = Vec::new();

    for (id, name, passenger, fare) in departures {
      let pos = day_for(&mut days, id, &name);
      days[pos].1.departures.push(RecordedLine { passenger, fare });
    }
    for (id, name, passenger, fare) in returns {
      let pos = day_for(&mut days, id, &name);
      days[pos].1.returns.push(RecordedLine { passenger, fare });
    }

    Ok(days.into_iter().map(|(_, day)| day).collect())
  }

  fn today(&self) -> NaiveDate {
    (Utc::now() + Duration::minutes(i64::from(self.options.tz_offset_minutes)))
      .date_naive()
  }
}
