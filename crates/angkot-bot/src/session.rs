//! Per-chat prompt state.
//!
//! `/driver` and `/santri` answer with a question; the next message from
//! that chat is the name being registered. The flag lives for exactly one
//! response: set when prompting, taken (and thereby cleared) when the
//! answer arrives. The core never sees this state.

use std::{
  collections::HashMap,
  sync::{Arc, Mutex, PoisonError},
};

/// What the bot is waiting to hear from a chat.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pending {
  DriverName,
  PassengerName,
}

#[derive(Debug, Clone, Default)]
pub struct SessionMap {
  inner: Arc<Mutex<HashMap<i64, Pending>>>,
}

impl SessionMap {
  pub fn new() -> Self { Self::default() }

  pub fn set(&self, chat_id: i64, pending: Pending) {
    let mut map = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
    map.insert(chat_id, pending);
  }

  /// Remove and return the pending prompt for a chat, if any.
  pub fn take(&self, chat_id: i64) -> Option<Pending> {
    let mut map = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
    map.remove(&chat_id)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn take_clears_the_flag() {
    let sessions = SessionMap::new();
    sessions.set(7, Pending::DriverName);

    assert_eq!(sessions.take(7), Some(Pending::DriverName));
    assert_eq!(sessions.take(7), None);
  }

  #[test]
  fn chats_are_independent() {
    let sessions = SessionMap::new();
    sessions.set(1, Pending::DriverName);
    sessions.set(2, Pending::PassengerName);

    assert_eq!(sessions.take(1), Some(Pending::DriverName));
    assert_eq!(sessions.take(2), Some(Pending::PassengerName));
  }

  #[test]
  fn a_new_prompt_replaces_the_old_one() {
    let sessions = SessionMap::new();
    sessions.set(1, Pending::DriverName);
    sessions.set(1, Pending::PassengerName);

    assert_eq!(sessions.take(1), Some(Pending::PassengerName));
  }
}
