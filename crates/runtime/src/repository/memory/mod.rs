//! In-memory repository implementations for testing and development.

mod config;
mod inventory;

pub use config::InMemoryConfigStore;
pub use inventory::{InMemoryInventory, InventoryCall};
