//! Orders visible tokens by how likely the user is to target them next.
//!
//! The heuristic is purely textual: absolute character distance from the
//! token start to the nearest selection endpoint in the token's own editor.
//! Tokens of the active editor rank strictly ahead of every other editor's
//! tokens regardless of distance; non-active editors keep their visibility
//! order. Rank 0 is allocated first and gets first pick of styles.

use crate::{
  allocate::{
    AllocationError,
    Result,
  },
  token::{
    EditorId,
    EditorSnapshot,
    Token,
  },
};

/// Produces the deterministic total order the allocator consumes.
///
/// Fails fast on multi-line tokens: downstream rendering assumes single-line
/// hat ranges, so silently mis-ranking one would be worse than erroring.
pub fn rank_tokens(active: &EditorId, editors: &[EditorSnapshot]) -> Result<Vec<Token>> {
  let mut ranked = Vec::with_capacity(editors.iter().map(|e| e.tokens.len()).sum());

  if let Some(editor) = editors.iter().find(|e| &e.id == active) {
    rank_editor_tokens(editor, &mut ranked)?;
  }
  for editor in editors.iter().filter(|e| &e.id != active) {
    rank_editor_tokens(editor, &mut ranked)?;
  }

  Ok(ranked)
}

fn rank_editor_tokens(editor: &EditorSnapshot, out: &mut Vec<Token>) -> Result<()> {
  let mut tokens: Vec<(usize, &Token)> = Vec::with_capacity(editor.tokens.len());
  for token in &editor.tokens {
    if !token.range.is_single_line() {
      return Err(AllocationError::MultiLineToken {
        editor: token.editor.clone(),
        range: token.range,
      });
    }
    tokens.push((selection_distance(editor, token), token));
  }

  // Ties fall back to document order, keeping the ranking a total order.
  tokens.sort_by_key(|(distance, token)| (*distance, token.span.start, token.span.end));
  out.extend(tokens.into_iter().map(|(_, token)| token.clone()));

  Ok(())
}

/// Distance from the token start to the nearest selection endpoint in the
/// token's own editor. An editor with no selections falls back to
/// start-of-document distance, which degrades to plain document order.
fn selection_distance(editor: &EditorSnapshot, token: &Token) -> usize {
  editor
    .selection_offsets
    .iter()
    .flat_map(|span| [span.start, span.end])
    .map(|offset| token.span.distance_to(offset))
    .min()
    .unwrap_or(token.span.start)
}
