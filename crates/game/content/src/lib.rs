//! Data-driven content loaders for the tabula engine.
//!
//! This crate turns authored data files into engine inputs:
//! - Board definitions (data-driven via JSON)
//! - Engine configuration (data-driven via TOML)
//! - Advisory board validation (authoring-time lint sweep)
//!
//! Content is consumed at session setup and never appears in game state.
//! All loaders use tabula-core types directly with serde deserialization.

pub mod loaders;
pub mod validate;

pub use loaders::{BoardLoader, ConfigLoader, ContentFactory, LoadError, LoadResult};
pub use validate::{validate_board, validate_plugins};
