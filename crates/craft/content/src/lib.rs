//! Data-driven recipe definitions and loaders.
//!
//! Recipes and engine settings are plain data files:
//! - Recipes (TOML or RON, one recipe per file)
//! - Engine settings (TOML)
//!
//! All loaders use craft-core types directly with serde for RON/TOML
//! deserialization.

#[cfg(feature = "loaders")]
pub mod loaders;

#[cfg(feature = "loaders")]
pub use loaders::{ConfigLoader, ContentFactory, LoadResult, RecipeLoader};
