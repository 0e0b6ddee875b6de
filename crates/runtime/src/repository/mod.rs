//! Repository layer for data that lives outside the engine.
//!
//! Two collaborators are abstracted here:
//! - [`ConfigStore`] persists recipe configuration records
//! - [`InventoryRepository`] resolves and mutates the items a craft touches
//!
//! Each comes with an in-memory adapter; recipes also have a TOML file store.

mod error;
mod file;
mod memory;
pub mod payload;
mod traits;
mod types;

pub use error::{RepositoryError, Result};
pub use file::FileConfigStore;
pub use memory::{InMemoryConfigStore, InMemoryInventory, InventoryCall};
pub use traits::{ConfigStore, InventoryRepository};
pub use types::{Container, EffectRecord, InventoryItem, ItemUpdate};
