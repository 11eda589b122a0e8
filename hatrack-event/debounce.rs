//! Utilities for declaring an async (usually debounced) hook.

use std::time::Duration;

use futures_executor::block_on;
use tokio::{
  sync::mpsc::{
    self,
    Sender,
    error::TrySendError,
  },
  time::Instant,
};

/// Maximum time to block when sending to a full channel. Kept very short:
/// dropping a re-hat request is always recoverable (the next cursor move
/// produces a fresh one), freezing the editor is not.
const SEND_TIMEOUT_MS: u64 = 2;

/// A debounced event handler running as a background tokio task.
///
/// Trigger events (cursor moves, edits, scrolls) arrive far faster than the
/// work they request is worth doing. A hook receives every event immediately
/// through [`handle_event`](AsyncHook::handle_event), where it can absorb the
/// event into its pending state and move the debounce deadline; when the
/// deadline is reached with no newer event, [`finish_debounce`](AsyncHook::finish_debounce)
/// performs the actual work exactly once.
pub trait AsyncHook: Sync + Send + 'static + Sized {
  type Event: Sync + Send + 'static;

  /// Called for every incoming event. Returns the new debounce deadline, or
  /// `None` to cancel any pending work.
  fn handle_event(&mut self, event: Self::Event, timeout: Option<Instant>) -> Option<Instant>;

  /// Called once when the debounce deadline elapses.
  fn finish_debounce(&mut self);

  fn spawn(self) -> mpsc::Sender<Self::Event> {
    let (tx, rx) = mpsc::channel(128);
    // Only spawn the worker inside a runtime, so unit tests can drive hooks
    // synchronously without one.
    if tokio::runtime::Handle::try_current().is_ok() {
      tokio::spawn(run(self, rx));
    }
    tx
  }
}

async fn run<Hook: AsyncHook>(mut hook: Hook, mut rx: mpsc::Receiver<Hook::Event>) {
  let mut deadline = None;
  loop {
    let event = match deadline {
      Some(deadline_) => {
        let res = tokio::time::timeout_at(deadline_, rx.recv()).await;
        match res {
          Ok(event) => event,
          Err(_) => {
            hook.finish_debounce();
            deadline = None;
            continue;
          },
        }
      },
      None => rx.recv().await,
    };
    let Some(event) = event else {
      break;
    };
    deadline = hook.handle_event(event, deadline);
  }
}

/// Send an event from synchronous code, blocking at most briefly.
///
/// Fast path is a non-blocking send; when the channel is full the send waits
/// `SEND_TIMEOUT_MS` and then drops the message.
pub fn send_blocking<T>(tx: &Sender<T>, data: T) {
  match tx.try_send(data) {
    Ok(()) => {},
    Err(TrySendError::Full(data)) => {
      let _ = block_on(tx.send_timeout(data, Duration::from_millis(SEND_TIMEOUT_MS)));
    },
    Err(TrySendError::Closed(_)) => {
      log::warn!("Attempted to send to closed channel");
    },
  }
}

/// Non-blocking send. Returns whether the event was accepted.
pub fn try_send<T>(tx: &Sender<T>, data: T) -> bool {
  tx.try_send(data).is_ok()
}
