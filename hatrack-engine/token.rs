//! Tokens, per-editor snapshots and the allocation result unit.
//!
//! Everything here is a read-only view with a one-cycle lifetime: the caller
//! rebuilds tokens and snapshots from the live documents on every triggering
//! event, and the engine never retains any of it across cycles.

use hatrack_core::{
  document::DocumentSnapshot,
  position::{
    Range,
    Span,
  },
};

use crate::{
  Tendril,
  styles::HatStyleName,
};

pub type EditorId = Tendril;

/// A contiguous, externally-defined lexical span of text in one editor.
///
/// Tokens carry both a line/character `range` (what the renderer consumes,
/// and what the single-line contract is checked against) and a character
/// offset `span` (what the ranker measures distance with), mirroring the two
/// coordinate systems an editor exposes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
  pub editor: EditorId,
  pub range: Range,
  pub span: Span,
  pub text: Tendril,
}

/// One editor's immutable view for a single allocation cycle.
///
/// When a `&[EditorSnapshot]` is handed to the engine, slice order is the
/// editor visibility order: it is the fixed tie-break used to order tokens
/// from non-active editors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorSnapshot {
  pub id: EditorId,
  pub selections: Vec<Range>,
  /// Selection endpoints as character offsets, parallel to `selections`.
  pub selection_offsets: Vec<Span>,
  pub tokens: Vec<Token>,
}

impl EditorSnapshot {
  /// Builds a snapshot from a document plus the token spans the external
  /// scanner found in it. Token boundaries are never decided here.
  pub fn from_document(
    id: impl Into<EditorId>,
    doc: &DocumentSnapshot,
    selections: Vec<Range>,
    token_spans: &[Span],
  ) -> Self {
    let id = id.into();
    let selection_offsets = selections.iter().map(|s| doc.span_of(*s)).collect();
    let tokens = token_spans
      .iter()
      .map(|span| Token {
        editor: id.clone(),
        range: doc.range_of(*span),
        span: *span,
        text: doc.slice(*span).into(),
      })
      .collect();

    Self {
      id,
      selections,
      selection_offsets,
      tokens,
    }
  }
}

/// The allocation result unit: one hat, anchored to one grapheme of one
/// token.
///
/// Across a whole allocation result, `(grapheme_text, style)` pairs are
/// unique. The key is the grapheme *text*, not the token: the same grapheme
/// text may appear in many tokens, and giving two of them the same style
/// would make them indistinguishable to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenHat {
  pub token: Token,
  pub style: HatStyleName,
  pub hat_range: Range,
  pub grapheme_text: Tendril,
}
