//! Splits a token's text into addressable graphemes.
//!
//! A grapheme here is an anchor point a hat can sit on, not a unicode
//! grapheme cluster (though anchors are always aligned to cluster
//! boundaries). Every token is addressable by its first character; further
//! anchors are produced at word-boundary positions (case transitions,
//! separators, digit/letter transitions) so that a token whose first
//! character collides with many others can still be disambiguated:
//! `myVariableName` yields anchors at `m`, `V` and `N`.
//!
//! The *identity* of a grapheme (the text hats are keyed by) is normalized
//! according to [`TokenHatSplittingMode`]: letters are lower-cased unless
//! case is preserved, and symbols collapse into one shared unknown identity
//! so rare punctuation does not fragment the hat namespace.

use std::collections::BTreeSet;

use hatrack_core::chars::{
  CharKind,
  categorize_char,
};
use serde::Deserialize;
use smallvec::SmallVec;
use unicode_segmentation::UnicodeSegmentation;

use crate::Tendril;

/// The shared identity all unpreserved symbols normalize to.
pub const UNKNOWN_SYMBOL: &str = "?";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct TokenHatSplittingMode {
  /// Keep upper-case letters distinct from their lower-case forms, so `Fox`
  /// and `fox` never collide in the uniqueness check.
  pub preserve_case: bool,
  /// Letters that keep their exact form even while case-folding is active.
  pub letters_to_preserve: BTreeSet<char>,
  /// Symbols that keep their exact form instead of collapsing into
  /// [`UNKNOWN_SYMBOL`].
  pub symbols_to_preserve: BTreeSet<char>,
}

/// One addressable anchor within a token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grapheme {
  /// Normalized identity. This is what hat uniqueness is keyed by.
  pub text: Tendril,
  /// Character offset of the anchor within the token.
  pub offset: usize,
  /// Character length of the source cluster under the anchor.
  pub len: usize,
}

/// Pure splitter: no I/O, no shared state, safe to call concurrently for
/// independent tokens.
#[derive(Debug, Clone, Default)]
pub struct GraphemeSplitter {
  mode: TokenHatSplittingMode,
}

impl GraphemeSplitter {
  pub fn new(mode: TokenHatSplittingMode) -> Self {
    Self { mode }
  }

  pub fn mode(&self) -> &TokenHatSplittingMode {
    &self.mode
  }

  /// Produces the ordered anchor sequence for `text`.
  ///
  /// Output is stable left-to-right and anchors never overlap. Tokens are
  /// single-line by contract, but stray whitespace is skipped rather than
  /// anchored.
  pub fn split(&self, text: &str) -> SmallVec<[Grapheme; 4]> {
    let mut graphemes = SmallVec::new();
    let mut offset = 0usize;
    let mut prev: Option<CharKind> = None;

    for cluster in text.graphemes(true) {
      let len = cluster.chars().count();
      // A cluster's anchor behavior follows its leading char.
      let kind = cluster
        .chars()
        .next()
        .map(categorize_char)
        .unwrap_or(CharKind::Whitespace);

      if kind != CharKind::Whitespace && self.is_anchor(prev, kind) {
        graphemes.push(Grapheme {
          text: self.normalize(cluster, kind),
          offset,
          len,
        });
      }

      prev = Some(kind);
      offset += len;
    }

    graphemes
  }

  /// Word-boundary detection: the first character is always an anchor, then
  /// every alphanumeric that follows a separator, every lower-to-upper case
  /// transition and every digit/letter transition.
  fn is_anchor(&self, prev: Option<CharKind>, kind: CharKind) -> bool {
    let Some(prev) = prev else {
      return true;
    };

    match (prev, kind) {
      (CharKind::Symbol | CharKind::Whitespace, k) if k.is_alphanumeric() => true,
      (CharKind::Lower, CharKind::Upper) => true,
      (p, CharKind::Digit) if p.is_letter() => true,
      (CharKind::Digit, k) if k.is_letter() => true,
      _ => false,
    }
  }

  fn normalize(&self, cluster: &str, kind: CharKind) -> Tendril {
    if kind == CharKind::Symbol {
      let preserved = cluster
        .chars()
        .all(|c| self.mode.symbols_to_preserve.contains(&c));
      return if preserved {
        cluster.into()
      } else {
        UNKNOWN_SYMBOL.into()
      };
    }

    let mut text = Tendril::new();
    for c in cluster.chars() {
      if self.mode.preserve_case || self.letter_is_preserved(c) {
        text.push(c);
      } else {
        text.extend(c.to_lowercase());
      }
    }
    text
  }

  fn letter_is_preserved(&self, c: char) -> bool {
    self.mode.letters_to_preserve.contains(&c)
      || c.to_lowercase().any(|l| self.mode.letters_to_preserve.contains(&l))
  }
}

#[cfg(test)]
mod tests {
  use quickcheck::quickcheck;

  use super::*;

  fn split_default(text: &str) -> Vec<(String, usize)> {
    GraphemeSplitter::default()
      .split(text)
      .into_iter()
      .map(|g| (g.text.to_string(), g.offset))
      .collect()
  }

  #[test]
  fn test_camel_case_anchors() {
    assert_eq!(split_default("myVariableName"), vec![
      ("m".to_string(), 0),
      ("v".to_string(), 2),
      ("n".to_string(), 10),
    ]);
  }

  #[test]
  fn test_separator_and_digit_anchors() {
    assert_eq!(split_default("foo_bar2baz"), vec![
      ("f".to_string(), 0),
      ("b".to_string(), 4),
      ("2".to_string(), 7),
      ("b".to_string(), 8),
    ]);
  }

  #[test]
  fn test_single_char_token() {
    assert_eq!(split_default("a"), vec![("a".to_string(), 0)]);
  }

  #[test]
  fn test_symbol_tokens_collapse() {
    assert_eq!(split_default("=="), vec![("?".to_string(), 0)]);
    assert_eq!(split_default(")"), vec![("?".to_string(), 0)]);
  }

  #[test]
  fn test_symbols_to_preserve() {
    let splitter = GraphemeSplitter::new(TokenHatSplittingMode {
      symbols_to_preserve: BTreeSet::from(['=']),
      ..Default::default()
    });
    let graphemes = splitter.split("==");
    assert_eq!(graphemes.len(), 1);
    assert_eq!(graphemes[0].text, "=");
  }

  #[test]
  fn test_preserve_case() {
    let splitter = GraphemeSplitter::new(TokenHatSplittingMode {
      preserve_case: true,
      ..Default::default()
    });
    let texts: Vec<_> = splitter
      .split("FooBar")
      .into_iter()
      .map(|g| g.text.to_string())
      .collect();
    assert_eq!(texts, vec!["F", "B"]);
  }

  #[test]
  fn test_letters_to_preserve() {
    let splitter = GraphemeSplitter::new(TokenHatSplittingMode {
      letters_to_preserve: BTreeSet::from(['ä']),
      ..Default::default()
    });
    let graphemes = splitter.split("Äpfel");
    assert_eq!(graphemes.len(), 1);
    // Preserved letters keep their exact form even under case folding.
    assert_eq!(graphemes[0].text, "Ä");
  }

  #[test]
  fn test_anchors_are_ordered_and_disjoint() {
    let graphemes = GraphemeSplitter::default().split("someLong_mixedUp2Name");
    for pair in graphemes.windows(2) {
      assert!(pair[0].offset + pair[0].len <= pair[1].offset);
    }
  }

  #[test]
  fn test_combining_cluster_is_one_anchor() {
    // "a" + combining acute is a single cluster of two chars.
    let graphemes = GraphemeSplitter::default().split("a\u{0301}bc");
    assert_eq!(graphemes.len(), 1);
    assert_eq!(graphemes[0].offset, 0);
    assert_eq!(graphemes[0].len, 2);
  }

  quickcheck! {
    /// Anchor spans, sliced back out of the original text and recombined
    /// with the inter-anchor gaps, reconstruct the token exactly.
    fn prop_round_trip(text: String) -> bool {
      let chars: Vec<char> = text.chars().collect();
      let graphemes = GraphemeSplitter::default().split(&text);

      let mut rebuilt = String::new();
      let mut cursor = 0usize;
      for g in &graphemes {
        if g.offset < cursor || g.offset + g.len > chars.len() {
          return false;
        }
        rebuilt.extend(&chars[cursor..g.offset]);
        rebuilt.extend(&chars[g.offset..g.offset + g.len]);
        cursor = g.offset + g.len;
      }
      rebuilt.extend(&chars[cursor..]);
      rebuilt == text
    }
  }
}
