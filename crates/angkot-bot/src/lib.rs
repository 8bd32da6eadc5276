//! Telegram dispatcher for the angkot trip ledger.
//!
//! Exposes an axum [`Router`] with a single webhook endpoint backed by
//! any [`TripStore`]. Replies ride back on the webhook response; no
//! outbound HTTP is needed.

pub mod parse;
pub mod service;
pub mod session;
pub mod telegram;

use std::{path::PathBuf, sync::Arc};

use angkot_core::store::TripStore;
use axum::{
  Json, Router,
  extract::State,
  http::{HeaderMap, StatusCode},
  response::{IntoResponse, Response},
  routing::post,
};
use serde::Deserialize;
use tower_http::trace::TraceLayer;
use tracing::warn;

use service::BotService;
use telegram::{SECRET_HEADER, Update, WebhookReply};

// ─── Configuration ───────────────────────────────────────────────────────────

/// Runtime configuration, deserialised from `config.toml` and the
/// `ANGKOT_*` environment.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
  pub host:           String,
  pub port:           u16,
  pub db_path:        PathBuf,
  /// Must match the secret token registered with `setWebhook`.
  pub webhook_secret: String,
  /// The one chat allowed to run `/backupdb`.
  pub admin_chat_id:  Option<i64>,
  #[serde(default = "default_single_trip")]
  pub single_trip_price: i64,
  #[serde(default = "default_round_trip")]
  pub round_trip_price: i64,
  /// Minutes added to UTC when deriving the business day (420 = WIB).
  #[serde(default = "default_tz_offset")]
  pub tz_offset_minutes: i32,
}

fn default_single_trip() -> i64 { angkot_core::fare::DEFAULT_SINGLE_TRIP }
fn default_round_trip() -> i64 { angkot_core::fare::DEFAULT_ROUND_TRIP }
fn default_tz_offset() -> i32 { 420 }

// ─── Application state ───────────────────────────────────────────────────────

/// Shared state threaded through the axum handlers.
#[derive(Clone)]
pub struct AppState<S> {
  pub service: Arc<BotService<S>>,
  pub secret:  Arc<String>,
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// Build the webhook router for `state`.
pub fn router<S>(state: AppState<S>) -> Router
where
  S: TripStore + Clone + Send + Sync + 'static,
{
  Router::new()
    .route("/telegram/webhook", post(webhook::<S>))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

async fn webhook<S>(
  State(state): State<AppState<S>>,
  headers: HeaderMap,
  Json(update): Json<Update>,
) -> Response
where
  S: TripStore + Clone + Send + Sync + 'static,
{
  let presented = headers.get(SECRET_HEADER).and_then(|v| v.to_str().ok());
  if presented != Some(state.secret.as_str()) {
    warn!(update_id = update.update_id, "webhook secret mismatch");
    return StatusCode::UNAUTHORIZED.into_response();
  }

  // Updates without a text message (edits, stickers, joins) are
  // acknowledged and dropped.
  let Some(message) = update.message else {
    return StatusCode::OK.into_response();
  };
  let Some(text) = message.text else {
    return StatusCode::OK.into_response();
  };

  match state.service.handle_message(message.chat.id, &text).await {
    Some(reply) => {
      Json(WebhookReply::send_message(message.chat.id, reply)).into_response()
    }
    None => StatusCode::OK.into_response(),
  }
}

// ─── Integration tests ───────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use angkot_store_sqlite::SqliteStore;
  use axum::{
    body::Body,
    http::{Request, header},
  };
  use tower::ServiceExt as _;

  use super::*;

  const SECRET: &str = "hush";

  async fn make_state() -> AppState<SqliteStore> {
    let store = SqliteStore::open_in_memory().await.unwrap();
    AppState {
      service: Arc::new(BotService::new(store, None, None)),
      secret:  Arc::new(SECRET.to_string()),
    }
  }

  async fn post_update(
    state: AppState<SqliteStore>,
    secret: Option<&str>,
    body: &str,
  ) -> axum::response::Response {
    let mut builder = Request::builder()
      .method("POST")
      .uri("/telegram/webhook")
      .header(header::CONTENT_TYPE, "application/json");
    if let Some(secret) = secret {
      builder = builder.header(SECRET_HEADER, secret);
    }
    let req = builder.body(Body::from(body.to_string())).unwrap();
    router(state).oneshot(req).await.unwrap()
  }

  fn text_update(chat_id: i64, text: &str) -> String {
    serde_json::json!({
      "update_id": 1,
      "message": { "chat": { "id": chat_id }, "text": text }
    })
    .to_string()
  }

  #[tokio::test]
  async fn missing_secret_is_unauthorized() {
    let state = make_state().await;
    let resp = post_update(state, None, &text_update(7, "/ping")).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
  }

  #[tokio::test]
  async fn wrong_secret_is_unauthorized() {
    let state = make_state().await;
    let resp =
      post_update(state, Some("nope"), &text_update(7, "/ping")).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
  }

  #[tokio::test]
  async fn ping_replies_via_webhook_response() {
    let state = make_state().await;
    let resp =
      post_update(state, Some(SECRET), &text_update(7, "/ping")).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let bytes =
      axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let reply: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(reply["method"], "sendMessage");
    assert_eq!(reply["chat_id"], 7);
    assert_eq!(reply["text"], "pong");
  }

  #[tokio::test]
  async fn non_message_updates_are_acknowledged() {
    let state = make_state().await;
    let resp =
      post_update(state, Some(SECRET), r#"{"update_id":2}"#).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let bytes =
      axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    assert!(bytes.is_empty());
  }

  #[tokio::test]
  async fn free_text_without_prompt_is_acknowledged_silently() {
    let state = make_state().await;
    let resp =
      post_update(state, Some(SECRET), &text_update(7, "halo")).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let bytes =
      axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    assert!(bytes.is_empty());
  }

  #[tokio::test]
  async fn full_flow_over_the_webhook() {
    let state = make_state().await;

    let resp = post_update(
      state.clone(),
      Some(SECRET),
      &text_update(7, "/driver"),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = post_update(
      state.clone(),
      Some(SECRET),
      &text_update(7, "Pak Ahmad"),
    )
    .await;
    let bytes =
      axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let reply: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(reply["text"], "Driver Pak Ahmad berhasil ditambahkan");

    let resp = post_update(
      state,
      Some(SECRET),
      &text_update(7, "antar\nDriver: Pak Ahmad\n- Santri Ali"),
    )
    .await;
    let bytes =
      axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let reply: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    let text = reply["text"].as_str().unwrap();
    assert!(text.contains("Santri Ali: Rp10.000"), "reply: {text}");
  }
}
