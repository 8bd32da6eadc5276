//! angkot-bot server binary.
//!
//! Reads `config.toml` (or the path specified with `--config`), opens an
//! in-process SQLite store, and serves the Telegram webhook over HTTP.
//!
//! Register the webhook with Telegram once the server is reachable:
//!
//! ```text
//! curl "https://api.telegram.org/bot$TOKEN/setWebhook" \
//!   -d url=https://example.com/telegram/webhook \
//!   -d secret_token=$ANGKOT_WEBHOOK_SECRET
//! ```

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use angkot_bot::{AppState, ServerConfig, service::BotService};
use angkot_core::fare::FarePolicy;
use angkot_store_sqlite::{SqliteStore, StoreOptions};
use anyhow::Context as _;
use clap::Parser;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Angkot trip ledger Telegram bot")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  // Load configuration.
  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("ANGKOT"))
    .build()
    .context("failed to read config file")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  // A bad fare table is a deployment mistake; refuse to start.
  let policy =
    FarePolicy::new(server_cfg.single_trip_price, server_cfg.round_trip_price)
      .context("invalid fare configuration")?;

  // Expand `~` in database path.
  let db_path = expand_tilde(&server_cfg.db_path);

  // Open SQLite store.
  let store = SqliteStore::open(&db_path, StoreOptions {
    policy,
    tz_offset_minutes: server_cfg.tz_offset_minutes,
  })
  .await
  .with_context(|| format!("failed to open store at {db_path:?}"))?;

  // Build application state.
  let state = AppState {
    service: Arc::new(BotService::new(
      store,
      server_cfg.admin_chat_id,
      Some(db_path),
    )),
    secret:  Arc::new(server_cfg.webhook_secret.clone()),
  };

  let app = angkot_bot::router(state);
  let address = format!("{}:{}", server_cfg.host, server_cfg.port);

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
