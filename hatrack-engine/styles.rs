//! The hat style catalog: every color/shape combination hats can be drawn
//! with, and the penalty ordering that makes the allocator prefer visually
//! simple hats.
//!
//! Catalog order is semantic: the allocator breaks penalty ties by
//! declaration order, so the map preserves insertion order.

use std::{
  fmt,
  str::FromStr,
  sync::OnceLock,
};

use indexmap::IndexMap;
use serde::{
  Deserialize,
  Deserializer,
};
use tracing::warn;

use crate::Tendril;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HatColor {
  Default,
  Blue,
  Green,
  Red,
  Pink,
  Yellow,
  UserColor1,
  UserColor2,
}

impl HatColor {
  pub const ALL: [HatColor; 8] = [
    HatColor::Default,
    HatColor::Blue,
    HatColor::Green,
    HatColor::Red,
    HatColor::Pink,
    HatColor::Yellow,
    HatColor::UserColor1,
    HatColor::UserColor2,
  ];

  pub const fn as_str(&self) -> &'static str {
    match self {
      HatColor::Default => "default",
      HatColor::Blue => "blue",
      HatColor::Green => "green",
      HatColor::Red => "red",
      HatColor::Pink => "pink",
      HatColor::Yellow => "yellow",
      HatColor::UserColor1 => "userColor1",
      HatColor::UserColor2 => "userColor2",
    }
  }
}

impl fmt::Display for HatColor {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for HatColor {
  type Err = ();

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    HatColor::ALL
      .into_iter()
      .find(|color| color.as_str() == s)
      .ok_or(())
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HatShape {
  Default,
  Ex,
  Fox,
  Wing,
  Hole,
  Frame,
  Curve,
  Eye,
  Play,
  Bolt,
  Crosshairs,
}

impl HatShape {
  pub const ALL: [HatShape; 11] = [
    HatShape::Default,
    HatShape::Ex,
    HatShape::Fox,
    HatShape::Wing,
    HatShape::Hole,
    HatShape::Frame,
    HatShape::Curve,
    HatShape::Eye,
    HatShape::Play,
    HatShape::Bolt,
    HatShape::Crosshairs,
  ];

  pub const fn as_str(&self) -> &'static str {
    match self {
      HatShape::Default => "default",
      HatShape::Ex => "ex",
      HatShape::Fox => "fox",
      HatShape::Wing => "wing",
      HatShape::Hole => "hole",
      HatShape::Frame => "frame",
      HatShape::Curve => "curve",
      HatShape::Eye => "eye",
      HatShape::Play => "play",
      HatShape::Bolt => "bolt",
      HatShape::Crosshairs => "crosshairs",
    }
  }
}

impl fmt::Display for HatShape {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for HatShape {
  type Err = ();

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    HatShape::ALL
      .into_iter()
      .find(|shape| shape.as_str() == s)
      .ok_or(())
  }
}

/// Style names: the bare color name for default-shaped hats (`"blue"`),
/// `"color-shape"` otherwise (`"blue-fox"`).
pub type HatStyleName = Tendril;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HatStyle {
  pub color: HatColor,
  pub shape: HatShape,
}

impl HatStyle {
  pub const fn new(color: HatColor, shape: HatShape) -> Self {
    Self { color, shape }
  }

  pub fn name(&self) -> HatStyleName {
    match self.shape {
      HatShape::Default => self.color.as_str().into(),
      shape => format!("{}-{}", self.color, shape).into(),
    }
  }

  /// Ranking cost: one point for a non-default shape, one for a non-default
  /// color. Lower is visually simpler.
  pub const fn penalty(&self) -> u8 {
    (!matches!(self.shape, HatShape::Default) as u8)
      + (!matches!(self.color, HatColor::Default) as u8)
  }
}

/// The catalog of available styles, in declaration order.
///
/// Immutable for the duration of one allocation call; reloaded as a whole
/// when configuration changes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HatStyleMap {
  styles: IndexMap<HatStyleName, HatStyle>,
}

impl HatStyleMap {
  pub fn from_styles(styles: impl IntoIterator<Item = HatStyle>) -> Self {
    Self {
      styles: styles
        .into_iter()
        .map(|style| (style.name(), style))
        .collect(),
    }
  }

  /// The full cross product of the catalog, colors outermost.
  pub fn full_catalog() -> Self {
    Self::from_styles(
      HatColor::ALL
        .into_iter()
        .flat_map(|color| HatShape::ALL.into_iter().map(move |shape| HatStyle::new(color, shape))),
    )
  }

  pub fn get(&self, name: &str) -> Option<&HatStyle> {
    self.styles.get(name)
  }

  pub fn contains(&self, name: &str) -> bool {
    self.styles.contains_key(name)
  }

  /// Declaration index of a style, the deterministic last tie-break of the
  /// allocator.
  pub fn index_of(&self, name: &str) -> Option<usize> {
    self.styles.get_index_of(name)
  }

  pub fn iter(&self) -> impl Iterator<Item = (&HatStyleName, &HatStyle)> {
    self.styles.iter()
  }

  pub fn len(&self) -> usize {
    self.styles.len()
  }

  pub fn is_empty(&self) -> bool {
    self.styles.is_empty()
  }
}

impl<'de> Deserialize<'de> for HatStyleMap {
  fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
  where
    D: Deserializer<'de>,
  {
    #[derive(Deserialize)]
    #[serde(deny_unknown_fields, rename_all = "snake_case")]
    struct InnerCatalog {
      colors: Vec<String>,
      shapes: Vec<String>,
    }

    let inner = InnerCatalog::deserialize(deserializer)?;

    let colors: Vec<HatColor> = inner
      .colors
      .iter()
      .filter_map(|name| match name.parse() {
        Ok(color) => Some(color),
        Err(()) => {
          warn!("Skipping unknown hat color '{name}'");
          None
        },
      })
      .collect();
    let shapes: Vec<HatShape> = inner
      .shapes
      .iter()
      .filter_map(|name| match name.parse() {
        Ok(shape) => Some(shape),
        Err(()) => {
          warn!("Skipping unknown hat shape '{name}'");
          None
        },
      })
      .collect();

    if colors.is_empty() || shapes.is_empty() {
      warn!("Hat catalog has no usable colors or shapes; no hats will be allocated");
    }

    Ok(Self::from_styles(colors.iter().flat_map(|&color| {
      shapes.iter().map(move |&shape| HatStyle::new(color, shape))
    })))
  }
}

/// The embedded default catalog, parsed once.
pub fn default_style_map() -> &'static HatStyleMap {
  static DEFAULT_STYLE_MAP: OnceLock<HatStyleMap> = OnceLock::new();

  DEFAULT_STYLE_MAP.get_or_init(|| {
    toml::from_str(include_str!("hats.toml")).unwrap_or_else(|err| {
      warn!("Failed to parse embedded hat catalog: {err}");
      HatStyleMap::full_catalog()
    })
  })
}
