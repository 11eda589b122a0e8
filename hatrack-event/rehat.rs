//! The debounced re-hat hook.
//!
//! Every cursor move, edit or scroll asks for a fresh allocation, but only
//! the newest snapshot is worth allocating: rapid events within the debounce
//! window collapse, and a superseded snapshot is replaced before any work
//! starts on it (cancellation is implicit — the allocation itself is a pure,
//! non-blocking computation that is simply never started).
//!
//! The hook is also the continuity owner: it keeps the previous cycle's
//! result and threads it back into the allocator as the stability reference.
//! The engine itself never retains cross-cycle state.

use std::sync::Arc;

use arc_swap::ArcSwap;
use hatrack_engine::{
  allocate::{
    HatStability,
    allocate_hats,
  },
  config::EngineConfig,
  token::{
    EditorId,
    EditorSnapshot,
    TokenHat,
  },
};
use tokio::{
  sync::mpsc::Sender,
  time::{
    Duration,
    Instant,
  },
};

use crate::debounce::{
  AsyncHook,
  send_blocking,
};

const REHAT_DEBOUNCE: Duration = Duration::from_millis(50);

/// Everything one allocation cycle needs, snapshotted at event time.
#[derive(Debug, Clone)]
pub struct RehatRequest {
  pub active_editor: EditorId,
  pub editors: Vec<EditorSnapshot>,
}

#[derive(Debug)]
pub enum RehatEvent {
  /// Cursor or selection moved.
  SelectionMoved(RehatRequest),
  /// Document text changed.
  DocumentEdited(RehatRequest),
  /// Scrolling, splits or focus changed what is visible.
  VisibleRangesChanged(RehatRequest),
  /// Configuration was swapped; applies from the next cycle on.
  ConfigReloaded,
}

impl RehatEvent {
  fn into_request(self) -> Option<RehatRequest> {
    match self {
      RehatEvent::SelectionMoved(request)
      | RehatEvent::DocumentEdited(request)
      | RehatEvent::VisibleRangesChanged(request) => Some(request),
      RehatEvent::ConfigReloaded => None,
    }
  }
}

pub struct RehatHook {
  config: Arc<ArcSwap<EngineConfig>>,
  /// Latest pending snapshot. Newer events overwrite it, which is the whole
  /// debouncing story: superseded snapshots never reach the allocator.
  pending: Option<RehatRequest>,
  /// Previous cycle's result, read-only input to the next one.
  old_hats: Vec<TokenHat>,
  results: Sender<Vec<TokenHat>>,
}

impl RehatHook {
  pub fn new(config: Arc<ArcSwap<EngineConfig>>, results: Sender<Vec<TokenHat>>) -> Self {
    Self {
      config,
      pending: None,
      old_hats: Vec::new(),
      results,
    }
  }

  /// The shared configuration handle. Swapping it takes effect on the next
  /// allocation cycle; a running cycle keeps the config it loaded.
  pub fn config(&self) -> Arc<ArcSwap<EngineConfig>> {
    Arc::clone(&self.config)
  }

  fn rehat(&mut self, request: RehatRequest) {
    let config = self.config.load();
    // The first cycle has nothing to be stable against.
    let stability = if self.old_hats.is_empty() {
      HatStability::Greedy
    } else {
      config.stability
    };

    match allocate_hats(
      &config.splitter(),
      &config.hats,
      &self.old_hats,
      stability,
      &request.active_editor,
      &request.editors,
    ) {
      Ok(hats) => {
        self.old_hats = hats.clone();
        send_blocking(&self.results, hats);
      },
      Err(err) => {
        log::error!("hat allocation failed: {err}");
      },
    }
  }
}

impl AsyncHook for RehatHook {
  type Event = RehatEvent;

  fn handle_event(&mut self, event: RehatEvent, timeout: Option<Instant>) -> Option<Instant> {
    match event.into_request() {
      Some(request) => {
        self.pending = Some(request);
        Some(Instant::now() + REHAT_DEBOUNCE)
      },
      // A config swap does not carry a snapshot; it just lets any pending
      // request (re)run under the new config.
      None => timeout,
    }
  }

  fn finish_debounce(&mut self) {
    if let Some(request) = self.pending.take() {
      self.rehat(request);
    }
  }
}

#[cfg(test)]
mod tests {
  use arc_swap::ArcSwap;
  use hatrack_core::{
    document::DocumentSnapshot,
    position::Span,
  };
  use tokio::sync::mpsc;

  use super::*;

  fn snapshot(text: &str, cursor: usize, token_spans: &[Span]) -> RehatRequest {
    let doc = DocumentSnapshot::new(text);
    let selections = vec![doc.range_of(Span::point(cursor))];
    let editor = EditorSnapshot::from_document("e1", &doc, selections, token_spans);
    RehatRequest {
      active_editor: editor.id.clone(),
      editors: vec![editor],
    }
  }

  fn hook() -> (RehatHook, mpsc::Receiver<Vec<TokenHat>>) {
    let (tx, rx) = mpsc::channel(8);
    let config = Arc::new(ArcSwap::from_pointee(EngineConfig::default()));
    (RehatHook::new(config, tx), rx)
  }

  #[test]
  fn test_rapid_events_collapse_to_latest_snapshot() {
    let (mut hook, mut rx) = hook();

    let stale = snapshot("old old old", 0, &[Span::new(0, 3)]);
    let fresh = snapshot("new", 0, &[Span::new(0, 3)]);

    let deadline = hook.handle_event(RehatEvent::SelectionMoved(stale), None);
    assert!(deadline.is_some());
    let deadline = hook.handle_event(RehatEvent::DocumentEdited(fresh), deadline);
    assert!(deadline.is_some());

    // One deadline elapses, one allocation runs, over the newest snapshot.
    hook.finish_debounce();
    let hats = rx.try_recv().unwrap();
    assert_eq!(hats.len(), 1);
    assert_eq!(hats[0].token.text, "new");
    assert!(rx.try_recv().is_err());

    // The deadline elapsing with nothing pending does no work.
    hook.finish_debounce();
    assert!(rx.try_recv().is_err());
  }

  #[test]
  fn test_continuity_is_threaded_between_cycles() {
    let (mut hook, mut rx) = hook();
    let spans = [Span::new(0, 3), Span::new(4, 7), Span::new(8, 11)];

    hook.handle_event(
      RehatEvent::SelectionMoved(snapshot("fig fog fun", 0, &spans)),
      None,
    );
    hook.finish_debounce();
    let first = rx.try_recv().unwrap();
    assert_eq!(first.len(), 3);

    // The cursor jumps to the far end, reversing the ranking. A fresh
    // greedy allocation would re-style every token; the threaded old hats
    // under the default balanced stability keep all of them in place.
    hook.handle_event(
      RehatEvent::SelectionMoved(snapshot("fig fog fun", 11, &spans)),
      None,
    );
    hook.finish_debounce();
    let second = rx.try_recv().unwrap();

    for hat in &first {
      let counterpart = second
        .iter()
        .find(|h| h.token.span == hat.token.span)
        .unwrap();
      assert_eq!(counterpart.style, hat.style);
    }
  }

  #[test]
  fn test_config_reload_alone_does_not_allocate() {
    let (mut hook, mut rx) = hook();

    let deadline = hook.handle_event(RehatEvent::ConfigReloaded, None);
    assert!(deadline.is_none());
    hook.finish_debounce();
    assert!(rx.try_recv().is_err());
  }
}
