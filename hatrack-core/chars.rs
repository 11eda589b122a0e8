//! Character classification used by the grapheme splitter to find
//! word-boundary anchor positions inside a token.

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum CharKind {
  Lower,
  Upper,
  Digit,
  Symbol,
  Whitespace,
}

impl CharKind {
  pub fn is_letter(&self) -> bool {
    matches!(self, CharKind::Lower | CharKind::Upper)
  }

  pub fn is_alphanumeric(&self) -> bool {
    matches!(self, CharKind::Lower | CharKind::Upper | CharKind::Digit)
  }
}

pub fn categorize_char(ch: char) -> CharKind {
  match ch {
    c if c.is_whitespace() => CharKind::Whitespace,
    c if c.is_numeric() => CharKind::Digit,
    c if c.is_uppercase() => CharKind::Upper,
    c if c.is_alphabetic() => CharKind::Lower,
    _ => CharKind::Symbol,
  }
}

#[inline]
pub fn char_is_word(ch: char) -> bool {
  ch.is_alphanumeric() || ch == '_'
}

/// Symbols and punctuation as the splitter sees them: anything that is not a
/// letter, digit or whitespace, refined by unicode general category so that
/// math/currency/modifier symbols group with punctuation.
#[inline]
pub fn char_is_symbol(ch: char) -> bool {
  use unicode_general_category::{
    GeneralCategory,
    get_general_category,
  };

  if ch.is_alphanumeric() || ch.is_whitespace() {
    return false;
  }

  matches!(
    get_general_category(ch),
    GeneralCategory::OtherPunctuation
      | GeneralCategory::OpenPunctuation
      | GeneralCategory::ClosePunctuation
      | GeneralCategory::InitialPunctuation
      | GeneralCategory::FinalPunctuation
      | GeneralCategory::ConnectorPunctuation
      | GeneralCategory::DashPunctuation
      | GeneralCategory::MathSymbol
      | GeneralCategory::CurrencySymbol
      | GeneralCategory::ModifierSymbol
      | GeneralCategory::OtherSymbol
  )
}
