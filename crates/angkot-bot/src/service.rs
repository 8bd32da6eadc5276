//! `BotService` — turns parsed chat commands into ledger calls and fixed
//! Indonesian reply strings.
//!
//! Every core error kind maps to one message; anything unexpected from
//! the store is logged here and answered with a generic saving/reading
//! failure so internals never leak into chat.

use std::path::PathBuf;

use angkot_core::{
  Error,
  report::{DATE_FORMAT, build_report, format_rupiah, parse_report_date},
  store::TripStore,
  trip::LegKind,
};
use chrono::Utc;
use tracing::{error, info};

use crate::{
  parse::{Command, parse_message, parse_trip_sheet},
  session::{Pending, SessionMap},
};

pub struct BotService<S> {
  store:         S,
  sessions:      SessionMap,
  admin_chat_id: Option<i64>,
  /// Database file to copy on `/backupdb`; `None` for in-memory stores.
  db_path:       Option<PathBuf>,
}

const HELP: &str = "Selamat datang! Berikut adalah daftar perintah yang tersedia:\n\
  /ping - Cek koneksi bot\n\
  /santri - Tambah santri baru\n\
  /daftarsantri - Lihat daftar santri\n\
  /driver - Tambah driver baru\n\
  /drivers - Lihat daftar driver\n\
  /antar - Lihat format pencatatan antar\n\
  /jemput - Lihat format pencatatan jemput\n\
  /laporan - Lihat laporan harian";

fn format_help(keyword: &str) -> String {
  format!(
    "Format pencatatan {keyword}:\n\n\
     {keyword}\n\
     Driver: [nama_driver]\n\
     - [nama_santri_1]\n\
     - [nama_santri_2]\n\
     - [nama_santri_3]\n\n\
     Contoh:\n\
     {keyword}\n\
     Driver: Pak Ahmad\n\
     - Santri Ali\n\
     - Santri Umar\n\
     - Santri Hasan"
  )
}

fn leg_keyword(kind: LegKind) -> &'static str {
  match kind {
    LegKind::Departure => "antar",
    LegKind::Return => "jemput",
  }
}

impl<S: TripStore> BotService<S> {
  pub fn new(
    store: S,
    admin_chat_id: Option<i64>,
    db_path: Option<PathBuf>,
  ) -> Self {
    Self { store, sessions: SessionMap::new(), admin_chat_id, db_path }
  }

  /// Handle one inbound message. `None` means no reply.
  pub async fn handle_message(&self, chat_id: i64, text: &str) -> Option<String> {
    match parse_message(text) {
      Command::Ping => Some("pong".to_string()),
      Command::Help => Some(HELP.to_string()),
      Command::DepartureFormat => Some(format_help("antar")),
      Command::ReturnFormat => Some(format_help("jemput")),
      Command::AddDriverPrompt => {
        self.sessions.set(chat_id, Pending::DriverName);
        Some("Siapa nama driver yang ingin ditambahkan?".to_string())
      }
      Command::AddPassengerPrompt => {
        self.sessions.set(chat_id, Pending::PassengerName);
        Some("Siapa nama santri yang ingin ditambahkan?".to_string())
      }
      Command::ListDrivers => Some(self.list_drivers().await),
      Command::ListPassengers => Some(self.list_passengers().await),
      Command::Report { date_arg } => Some(self.report(date_arg).await),
      Command::BackupDb => Some(self.backup(chat_id).await),
      Command::TripSheet { kind, raw } => Some(self.record(kind, &raw).await),
      Command::Other(answer) => match self.sessions.take(chat_id) {
        Some(Pending::DriverName) => Some(self.add_driver(&answer).await),
        Some(Pending::PassengerName) => Some(self.add_passenger(&answer).await),
        None => None,
      },
    }
  }

  // ── Roster ────────────────────────────────────────────────────────────

  async fn add_driver(&self, name: &str) -> String {
    match self.store.register_driver(name).await {
      Ok(driver) => {
        info!(driver = %driver.name, "driver registered");
        format!("Driver {} berhasil ditambahkan", driver.name)
      }
      Err(Error::DuplicateDriver(name)) => {
        format!("Driver {name} sudah terdaftar")
      }
      Err(Error::MalformedInput(_)) => "Nama driver tidak boleh kosong".to_string(),
      Err(err) => {
        error!(%err, "failed to register driver");
        "Maaf, terjadi kesalahan saat menyimpan data driver".to_string()
      }
    }
  }

  async fn add_passenger(&self, name: &str) -> String {
    match self.store.register_passenger(name).await {
      Ok(passenger) => {
        info!(passenger = %passenger.name, "passenger registered");
        format!("Penumpang {} berhasil ditambahkan", passenger.name)
      }
      Err(Error::MalformedInput(_)) => "Nama santri tidak boleh kosong".to_string(),
      Err(err) => {
        error!(%err, "failed to register passenger");
        "Maaf, terjadi kesalahan saat menyimpan data penumpang".to_string()
      }
    }
  }

  async fn list_drivers(&self) -> String {
    match self.store.list_drivers().await {
      Ok(drivers) if drivers.is_empty() => "Belum ada driver terdaftar".to_string(),
      Ok(drivers) => {
        let mut out = "Daftar driver:".to_string();
        for driver in drivers {
          out.push_str(&format!(
            "\n- {} - {}",
            driver.created_at.format("%Y-%m-%d %H:%M:%S"),
            driver.name
          ));
        }
        out
      }
      Err(err) => {
        error!(%err, "failed to list drivers");
        "Maaf, terjadi kesalahan saat membaca data driver".to_string()
      }
    }
  }

  async fn list_passengers(&self) -> String {
    match self.store.list_passengers().await {
      Ok(passengers) if passengers.is_empty() => {
        "Belum ada santri terdaftar".to_string()
      }
      Ok(passengers) => {
        let mut out = "Daftar santri:".to_string();
        for passenger in passengers {
          out.push_str(&format!(
            "\n- {} - {}",
            passenger.created_at.format("%Y-%m-%d %H:%M:%S"),
            passenger.name
          ));
        }
        out
      }
      Err(err) => {
        error!(%err, "failed to list passengers");
        "Maaf, terjadi kesalahan saat membaca data santri".to_string()
      }
    }
  }

  // ── Ledger ────────────────────────────────────────────────────────────

  async fn record(&self, kind: LegKind, raw: &str) -> String {
    let keyword = leg_keyword(kind);

    let sheet = match parse_trip_sheet(raw) {
      Ok(sheet) => sheet,
      Err(_) => {
        return format!(
          "Format pesan salah. Kirim /{keyword} untuk melihat format pencatatan"
        );
      }
    };

    match self.store.record_leg(kind, &sheet.driver, &sheet.passengers).await {
      Ok(leg) => {
        info!(
          driver = %leg.driver,
          kind = keyword,
          lines = leg.lines.len(),
          "leg recorded"
        );
        let mut out =
          format!("Pencatatan {keyword} tersimpan\nDriver: {}", leg.driver);
        for line in &leg.lines {
          out.push_str(&format!(
            "\n- {}: {}",
            line.passenger,
            format_rupiah(line.fare)
          ));
        }
        out.push_str(&format!("\nTotal: {}", format_rupiah(leg.total())));
        out
      }
      Err(Error::UnknownDriver(name)) => format!("Driver {name} belum terdaftar"),
      Err(Error::MalformedInput(_)) => format!(
        "Format pesan salah. Kirim /{keyword} untuk melihat format pencatatan"
      ),
      Err(Error::StoreUnavailable) => {
        "Sistem sedang sibuk, silakan coba lagi".to_string()
      }
      Err(err) => {
        error!(%err, "failed to record leg");
        "Maaf, terjadi kesalahan saat menyimpan data perjalanan".to_string()
      }
    }
  }

  // ── Reports ───────────────────────────────────────────────────────────

  async fn report(&self, date_arg: Option<String>) -> String {
    let today = self.store.today();
    let date = match date_arg {
      None => today,
      Some(arg) => match parse_report_date(&arg, today) {
        Ok(date) => date,
        Err(_) => {
          return format!(
            "Format tanggal {arg} tidak dikenali. \
             Gunakan DD-MM-YYYY atau \"kemarin\""
          );
        }
      },
    };

    let days = match self.store.legs_for_date(date).await {
      Ok(days) => days,
      Err(err) => {
        error!(%err, "failed to read report data");
        return "Maaf, terjadi kesalahan saat membaca data laporan".to_string();
      }
    };

    match build_report(date, &days) {
      Ok(report) => report,
      Err(Error::NoDataForDate(date)) => {
        format!("Tidak ada data perjalanan pada {}", date.format(DATE_FORMAT))
      }
      Err(err) => {
        error!(%err, "failed to build report");
        "Maaf, terjadi kesalahan saat membaca data laporan".to_string()
      }
    }
  }

  // ── Admin ─────────────────────────────────────────────────────────────

  async fn backup(&self, chat_id: i64) -> String {
    if self.admin_chat_id != Some(chat_id) {
      return "Anda tidak memiliki izin untuk mengakses ini".to_string();
    }
    let Some(db_path) = &self.db_path else {
      return "Backup tidak tersedia untuk penyimpanan ini".to_string();
    };

    let stamp = Utc::now().format("%Y%m%d-%H%M%S");
    let backup_path = db_path.with_extension(format!("{stamp}.bak"));
    match tokio::fs::copy(db_path, &backup_path).await {
      Ok(_) => {
        info!(path = %backup_path.display(), "database backed up");
        format!("Backup tersimpan di {}", backup_path.display())
      }
      Err(err) => {
        error!(%err, "backup failed");
        "Gagal membuat backup database".to_string()
      }
    }
  }
}
