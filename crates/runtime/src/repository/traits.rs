//! Repository contracts for recipe configuration and inventory access.

use async_trait::async_trait;

use craft_core::{CraftRecipe, ItemRef};

use super::Result;
use super::types::{Container, InventoryItem, ItemUpdate};

/// Persistence for recipe configuration records.
///
/// Child records (slots, results, modifiers, rules, categories) are not
/// stored separately; edits load the whole record, mutate it and save it back.
#[async_trait]
pub trait ConfigStore: Send + Sync {
    async fn load(&self, id: &str) -> Result<Option<CraftRecipe>>;

    /// Insert or replace a recipe (last write wins).
    async fn save(&self, recipe: &CraftRecipe) -> Result<()>;

    /// Returns true if a recipe was removed.
    async fn delete(&self, id: &str) -> Result<bool>;

    /// Ids of every stored recipe, sorted.
    async fn list(&self) -> Result<Vec<String>>;
}

/// Access to the items and containers a craft reads and mutates.
///
/// Mutations are batched per container: one call per container and kind.
#[async_trait]
pub trait InventoryRepository: Send + Sync {
    /// Current state of an item, or `None` if it no longer exists.
    async fn resolve(&self, item: &ItemRef) -> Result<Option<InventoryItem>>;

    async fn container(&self, id: &str) -> Result<Option<Container>>;

    async fn update_items(&self, container: &str, updates: Vec<ItemUpdate>) -> Result<()>;

    async fn delete_items(&self, container: &str, ids: Vec<String>) -> Result<()>;

    /// Create items at a container or holding location, returning them with
    /// their assigned ids.
    async fn create_items(
        &self,
        location: &str,
        items: Vec<InventoryItem>,
    ) -> Result<Vec<InventoryItem>>;
}
