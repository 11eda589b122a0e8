//! An immutable in-memory document snapshot.
//!
//! The allocation engine never reads a live buffer: the caller takes one
//! [`DocumentSnapshot`] per cycle and discards it afterwards, so no run ever
//! observes a concurrent mutation. The snapshot only exposes what the engine
//! needs, line/offset conversions and text extraction.

use std::borrow::Cow;

use ropey::Rope;

use crate::position::{
  Position,
  Range,
  Span,
};

#[derive(Debug, Clone)]
pub struct DocumentSnapshot {
  text: Rope,
}

impl DocumentSnapshot {
  pub fn new(text: &str) -> Self {
    Self {
      text: Rope::from_str(text),
    }
  }

  pub fn len_chars(&self) -> usize {
    self.text.len_chars()
  }

  pub fn line_count(&self) -> usize {
    self.text.len_lines()
  }

  /// Converts a `Position` into an absolute character offset.
  ///
  /// Out-of-bounds lines clamp to the last line, out-of-bounds columns clamp
  /// to the line end.
  pub fn offset_at(&self, pos: Position) -> usize {
    let line = pos.line.min(self.text.len_lines().saturating_sub(1));
    let line_start = self.text.line_to_char(line);
    let line_end = if line + 1 < self.text.len_lines() {
      self.text.line_to_char(line + 1)
    } else {
      self.text.len_chars()
    };

    (line_start + pos.character).min(line_end)
  }

  /// Converts an absolute character offset into a `Position`.
  pub fn position_at(&self, offset: usize) -> Position {
    let offset = offset.min(self.text.len_chars());
    let line = self.text.char_to_line(offset);
    let line_start = self.text.line_to_char(line);

    Position::new(line, offset - line_start)
  }

  pub fn span_of(&self, range: Range) -> Span {
    Span::new(self.offset_at(range.start), self.offset_at(range.end))
  }

  pub fn range_of(&self, span: Span) -> Range {
    Range::new(self.position_at(span.start), self.position_at(span.end))
  }

  /// The text covered by `span`.
  pub fn slice(&self, span: Span) -> Cow<'_, str> {
    Cow::from(self.text.slice(span.start..span.end))
  }
}
