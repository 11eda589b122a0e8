//! Engine configuration: splitting mode, stability policy and the hat
//! catalog, as one TOML-loadable struct.
//!
//! Validation happens once at load time; the engine itself assumes a
//! well-formed config. Runtime changes are applied by swapping the whole
//! struct between allocation cycles, never by mutating it mid-cycle.

use serde::Deserialize;
use thiserror::Error;

use crate::{
  allocate::HatStability,
  splitting::{
    GraphemeSplitter,
    TokenHatSplittingMode,
  },
  styles::{
    HatStyleMap,
    default_style_map,
  },
};

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("failed to parse engine configuration: {0}")]
  Parse(#[from] toml::de::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct EngineConfig {
  pub stability: HatStability,
  pub splitting: TokenHatSplittingMode,
  pub hats: HatStyleMap,
}

impl Default for EngineConfig {
  fn default() -> Self {
    Self {
      stability: HatStability::default(),
      splitting: TokenHatSplittingMode::default(),
      hats: default_style_map().clone(),
    }
  }
}

impl EngineConfig {
  pub fn from_toml(text: &str) -> Result<Self> {
    Ok(toml::from_str(text)?)
  }

  pub fn splitter(&self) -> GraphemeSplitter {
    GraphemeSplitter::new(self.splitting.clone())
  }
}
