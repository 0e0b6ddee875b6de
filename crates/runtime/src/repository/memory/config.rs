//! In-memory recipe store.

use std::collections::BTreeMap;
use std::sync::RwLock;

use async_trait::async_trait;

use craft_core::CraftRecipe;

use crate::repository::{ConfigStore, RepositoryError, Result};

/// In-memory recipe store for testing and development.
///
/// Thread-safe but not persistent across process restarts.
pub struct InMemoryConfigStore {
    recipes: RwLock<BTreeMap<String, CraftRecipe>>,
}

impl InMemoryConfigStore {
    pub fn new() -> Self {
        Self {
            recipes: RwLock::new(BTreeMap::new()),
        }
    }

    /// Create a store pre-populated with recipes.
    pub fn with_recipes(recipes: impl IntoIterator<Item = CraftRecipe>) -> Self {
        let recipes = recipes
            .into_iter()
            .map(|recipe| (recipe.id.clone(), recipe))
            .collect();
        Self {
            recipes: RwLock::new(recipes),
        }
    }
}

impl Default for InMemoryConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ConfigStore for InMemoryConfigStore {
    async fn load(&self, id: &str) -> Result<Option<CraftRecipe>> {
        let recipes = self
            .recipes
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;

        Ok(recipes.get(id).cloned())
    }

    async fn save(&self, recipe: &CraftRecipe) -> Result<()> {
        let mut recipes = self
            .recipes
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;

        recipes.insert(recipe.id.clone(), recipe.clone());
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        let mut recipes = self
            .recipes
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;

        Ok(recipes.remove(id).is_some())
    }

    async fn list(&self) -> Result<Vec<String>> {
        let recipes = self
            .recipes
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;

        Ok(recipes.keys().cloned().collect())
    }
}
