//! File-based ConfigStore implementation.

use std::fs;
use std::path::{Path, PathBuf};

use async_trait::async_trait;

use craft_content::RecipeLoader;
use craft_core::CraftRecipe;

use crate::repository::{ConfigStore, RepositoryError, Result};

/// File-based implementation of ConfigStore.
///
/// Stores each recipe as `{id}.toml` under the base directory, in the same
/// format the content loaders read.
pub struct FileConfigStore {
    base_dir: PathBuf,
}

impl FileConfigStore {
    /// Create a new file-based recipe store.
    pub fn new(base_dir: impl AsRef<Path>) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        fs::create_dir_all(&base_dir).map_err(RepositoryError::Io)?;
        Ok(Self { base_dir })
    }

    /// Get the path to a recipe file. Ids that are not plain file stems are
    /// rejected so every path stays under the base directory.
    fn recipe_path(&self, id: &str) -> Result<PathBuf> {
        if !CraftRecipe::is_valid_id(id) {
            return Err(RepositoryError::InvalidId(id.to_string()));
        }
        Ok(self.base_dir.join(format!("{}.toml", id)))
    }
}

#[async_trait]
impl ConfigStore for FileConfigStore {
    async fn load(&self, id: &str) -> Result<Option<CraftRecipe>> {
        let path = self.recipe_path(id)?;

        if !path.exists() {
            return Ok(None);
        }

        let recipe = RecipeLoader::load_toml(&path)
            .map_err(|e| RepositoryError::Serialization(e.to_string()))?;

        tracing::debug!(target: "runtime::repository", recipe = id, "Loaded recipe from {}", path.display());

        Ok(Some(recipe))
    }

    async fn save(&self, recipe: &CraftRecipe) -> Result<()> {
        let path = self.recipe_path(&recipe.id)?;
        let temp_path = path.with_extension("toml.tmp");

        let content = RecipeLoader::to_toml_string(recipe)
            .map_err(|e| RepositoryError::Serialization(e.to_string()))?;

        // Write to temp file
        fs::write(&temp_path, content).map_err(RepositoryError::Io)?;

        // Atomic rename
        fs::rename(&temp_path, &path).map_err(RepositoryError::Io)?;

        tracing::debug!(target: "runtime::repository", recipe = %recipe.id, "Saved recipe to {}", path.display());

        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        let path = self.recipe_path(id)?;

        if !path.exists() {
            return Ok(false);
        }

        fs::remove_file(&path).map_err(RepositoryError::Io)?;
        tracing::debug!(target: "runtime::repository", recipe = id, "Deleted recipe");
        Ok(true)
    }

    async fn list(&self) -> Result<Vec<String>> {
        let mut ids = Vec::new();

        let entries = fs::read_dir(&self.base_dir).map_err(RepositoryError::Io)?;

        for entry in entries {
            let entry = entry.map_err(RepositoryError::Io)?;
            let path = entry.path();

            if path.extension().and_then(|s| s.to_str()) == Some("toml")
                && let Some(stem) = path.file_stem().and_then(|s| s.to_str())
            {
                ids.push(stem.to_string());
            }
        }

        ids.sort_unstable();
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use craft_core::{Modifier, Slot};

    #[tokio::test]
    async fn save_load_list_delete() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileConfigStore::new(dir.path().join("recipes")).unwrap();

        let mut recipe = CraftRecipe::new("anvil", "Anvil");
        recipe.slots.push(Slot::new("ingot").necessary());
        recipe.modifiers.push(Modifier::new("tempered", 2));
        store.save(&recipe).await.unwrap();

        assert_eq!(store.list().await.unwrap(), vec!["anvil".to_string()]);
        assert_eq!(store.load("anvil").await.unwrap(), Some(recipe));
        assert_eq!(store.load("missing").await.unwrap(), None);

        assert!(store.delete("anvil").await.unwrap());
        assert!(!store.delete("anvil").await.unwrap());
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn ids_outside_the_base_dir_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileConfigStore::new(dir.path().join("recipes")).unwrap();

        let escaping = CraftRecipe::new("../outside", "Outside");
        assert!(matches!(
            store.save(&escaping).await,
            Err(RepositoryError::InvalidId(ref id)) if id == "../outside"
        ));
        assert!(!dir.path().join("outside.toml").exists());
        assert!(matches!(
            store.load("nested/recipe").await,
            Err(RepositoryError::InvalidId(_))
        ));
        assert!(matches!(store.delete("..").await, Err(RepositoryError::InvalidId(_))));
    }
}
