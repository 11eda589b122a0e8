use smartstring::{
  LazyCompact,
  SmartString,
};

pub mod allocate;
pub mod config;
pub mod ranking;
pub mod splitting;
pub mod styles;
pub mod token;

pub type Tendril = SmartString<LazyCompact>;
