//! Minimal Telegram Bot API models.
//!
//! Only the fields the dispatcher reads are modelled; everything else in
//! an update is ignored by serde. Replies use the webhook-reply
//! mechanism: the HTTP response to an update carries a method call.

use serde::{Deserialize, Serialize};

/// Header Telegram sends when a webhook secret token is configured.
pub const SECRET_HEADER: &str = "x-telegram-bot-api-secret-token";

#[derive(Debug, Deserialize)]
pub struct Update {
  pub update_id: i64,
  pub message:   Option<Message>,
}

#[derive(Debug, Deserialize)]
pub struct Message {
  pub chat: Chat,
  pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Chat {
  pub id: i64,
}

/// A method call answered in the webhook response body.
#[derive(Debug, Serialize)]
pub struct WebhookReply {
  pub method:  &'static str,
  pub chat_id: i64,
  pub text:    String,
}

impl WebhookReply {
  pub fn send_message(chat_id: i64, text: impl Into<String>) -> Self {
    Self { method: "sendMessage", chat_id, text: text.into() }
  }
}
