//! Hat allocation: the constrained assignment of styles to tokens.
//!
//! One allocation cycle is a single greedy pass over the ranked token list.
//! Each token in turn picks the cheapest `(grapheme, style)` pair that no
//! higher-ranked token has consumed yet, where cost is
//! `(penalty, grapheme position, style declaration index)`. Uniqueness is
//! keyed by the grapheme *text*, not the token: once "blue fox" sits on some
//! `f`, no other `f` anywhere on screen may wear it.
//!
//! The consumed pairs are tracked in an explicit memo threaded through the
//! pass. There is no backtracking and no randomness; identical inputs yield
//! identical outputs, which callers rely on for caching and tests rely on
//! for reproducibility.
//!
//! # Stability
//!
//! To keep hats from jumping around on every keystroke, a token that wore a
//! hat in the previous cycle can be biased toward wearing it again. The bias
//! strength is the [`HatStability`] policy:
//!
//! - `Greedy` ignores old hats entirely (right for the first cycle, where
//!   there is nothing to be stable against),
//! - `Stable` keeps the old pair whenever it is still free, even when a
//!   cheaper one exists,
//! - `Balanced` keeps the old pair only while its penalty stays within
//!   [`BALANCED_PENALTY_TOLERANCE`] of the best free alternative.
//!
//! Continuity is threaded explicitly: the caller passes the previous cycle's
//! result back in as `old_token_hats`, and the engine retains nothing across
//! cycles itself.
//!
//! # Scarcity
//!
//! Running out of free pairs is expected, not an error. A token whose every
//! grapheme/style combination is taken simply receives no hat and is dropped
//! from the result.

use std::collections::{
  HashMap,
  HashSet,
};

use hatrack_core::position::{
  Position,
  Range,
  Span,
};
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::{
  Tendril,
  ranking::rank_tokens,
  splitting::{
    Grapheme,
    GraphemeSplitter,
  },
  styles::{
    HatStyleMap,
    HatStyleName,
  },
  token::{
    EditorId,
    EditorSnapshot,
    Token,
    TokenHat,
  },
};

pub type Result<T> = std::result::Result<T, AllocationError>;

#[derive(Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum AllocationError {
  #[error("multi-line tokens are not supported: editor {editor} has a token spanning {range}")]
  MultiLineToken { editor: EditorId, range: Range },
}

/// How strongly a new allocation favors reusing a token's previous hat.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HatStability {
  Greedy,
  #[default]
  Balanced,
  Stable,
}

/// In balanced mode, an old hat survives while
/// `old penalty <= best penalty + BALANCED_PENALTY_TOLERANCE`.
pub const BALANCED_PENALTY_TOLERANCE: u8 = 1;

/// The single synchronous entry point: ranks all visible tokens and assigns
/// each one a hat, honoring `stability` against `old_token_hats`.
///
/// Pure function of its inputs; performs no I/O and never blocks, so it is
/// safe to run on the UI/event thread on every cursor move.
pub fn allocate_hats(
  splitter: &GraphemeSplitter,
  styles: &HatStyleMap,
  old_token_hats: &[TokenHat],
  stability: HatStability,
  active_editor: &EditorId,
  editors: &[EditorSnapshot],
) -> Result<Vec<TokenHat>> {
  let ranked = rank_tokens(active_editor, editors)?;
  Ok(allocate_ranked(
    splitter,
    styles,
    old_token_hats,
    stability,
    &ranked,
  ))
}

/// Allocation over an already-ranked token list, rank 0 first.
pub fn allocate_ranked(
  splitter: &GraphemeSplitter,
  styles: &HatStyleMap,
  old_token_hats: &[TokenHat],
  stability: HatStability,
  ranked: &[Token],
) -> Vec<TokenHat> {
  // Old hats are matched back to this cycle's tokens by editor and offsets.
  // Read-only: continuity bias, nothing else.
  let old_by_token: HashMap<(&EditorId, Span), &TokenHat> = old_token_hats
    .iter()
    .map(|hat| ((&hat.token.editor, hat.token.span), hat))
    .collect();

  let mut consumed = ConsumedPairs::default();
  let mut hats = Vec::with_capacity(ranked.len().min(styles.len()));

  for token in ranked {
    let graphemes = splitter.split(&token.text);
    let old_hat = match stability {
      HatStability::Greedy => None,
      _ => old_by_token.get(&(&token.editor, token.span)).copied(),
    };

    let Some(chosen) = choose_token_hat(styles, &consumed, old_hat, stability, &graphemes) else {
      continue;
    };

    consumed.insert(chosen.grapheme.text.clone(), chosen.style_index);
    hats.push(token_hat(token, chosen));
  }

  debug!(
    tokens = ranked.len(),
    hats = hats.len(),
    dropped = ranked.len() - hats.len(),
    "allocated hats"
  );

  hats
}

/// The `(grapheme text, style)` pairs already worn by higher-ranked tokens,
/// style identified by its declaration index.
#[derive(Debug, Default)]
struct ConsumedPairs {
  by_text: HashMap<Tendril, HashSet<usize>>,
}

impl ConsumedPairs {
  fn contains(&self, text: &str, style_index: usize) -> bool {
    self
      .by_text
      .get(text)
      .is_some_and(|styles| styles.contains(&style_index))
  }

  fn insert(&mut self, text: Tendril, style_index: usize) {
    self.by_text.entry(text).or_default().insert(style_index);
  }
}

#[derive(Debug, Clone, Copy)]
struct Candidate<'a> {
  grapheme: &'a Grapheme,
  style_name: &'a HatStyleName,
  style_index: usize,
  penalty: u8,
}

/// Picks the winning `(grapheme, style)` pair for one token, or `None` when
/// every combination is already taken.
fn choose_token_hat<'a>(
  styles: &'a HatStyleMap,
  consumed: &ConsumedPairs,
  old_hat: Option<&TokenHat>,
  stability: HatStability,
  graphemes: &'a [Grapheme],
) -> Option<Candidate<'a>> {
  let best = cheapest_free_pair(styles, consumed, graphemes);

  let old = old_hat.and_then(|hat| free_old_pair(styles, consumed, hat, graphemes));
  if let Some(old) = old {
    let keep = match stability {
      HatStability::Greedy => false,
      HatStability::Stable => true,
      HatStability::Balanced => match best {
        Some(best) => old.penalty <= best.penalty + BALANCED_PENALTY_TOLERANCE,
        None => true,
      },
    };
    if keep {
      return Some(old);
    }
  }

  best
}

/// Minimum-cost free pair: cost is `(penalty, grapheme index, style index)`,
/// so cheap styles win, earlier anchors break penalty ties, and declaration
/// order keeps the result reproducible.
fn cheapest_free_pair<'a>(
  styles: &'a HatStyleMap,
  consumed: &ConsumedPairs,
  graphemes: &'a [Grapheme],
) -> Option<Candidate<'a>> {
  let mut best: Option<Candidate<'a>> = None;

  for grapheme in graphemes {
    for (style_index, (style_name, style)) in styles.iter().enumerate() {
      if consumed.contains(&grapheme.text, style_index) {
        continue;
      }
      let penalty = style.penalty();
      if best.is_none_or(|b| penalty < b.penalty) {
        best = Some(Candidate {
          grapheme,
          style_name,
          style_index,
          penalty,
        });
        if penalty == 0 {
          // Nothing can beat a free default hat on an earlier anchor.
          return best;
        }
      }
    }
  }

  best
}

/// The token's previous pair, if its style is still in the catalog, its
/// grapheme text still occurs in the token, and no higher-ranked token has
/// taken it this cycle. Anchors matching the old in-token offset are
/// preferred so the hat does not slide along the token.
fn free_old_pair<'a>(
  styles: &'a HatStyleMap,
  consumed: &ConsumedPairs,
  old_hat: &TokenHat,
  graphemes: &'a [Grapheme],
) -> Option<Candidate<'a>> {
  let style_index = styles.index_of(&old_hat.style)?;
  if consumed.contains(&old_hat.grapheme_text, style_index) {
    return None;
  }

  let old_offset = old_hat
    .hat_range
    .start
    .character
    .checked_sub(old_hat.token.range.start.character);
  let grapheme = graphemes
    .iter()
    .filter(|g| g.text == old_hat.grapheme_text)
    .min_by_key(|g| (Some(g.offset) != old_offset, g.offset))?;

  let (style_name, style) = styles.iter().nth(style_index)?;

  Some(Candidate {
    grapheme,
    style_name,
    style_index,
    penalty: style.penalty(),
  })
}

fn token_hat(token: &Token, chosen: Candidate<'_>) -> TokenHat {
  let line = token.range.start.line;
  let start = token.range.start.character + chosen.grapheme.offset;

  TokenHat {
    token: token.clone(),
    style: chosen.style_name.clone(),
    hat_range: Range::new(
      Position::new(line, start),
      Position::new(line, start + chosen.grapheme.len),
    ),
    grapheme_text: chosen.grapheme.text.clone(),
  }
}
