//! Content factory for loading every recipe in a data directory.

use std::path::{Path, PathBuf};

use craft_core::{CraftRecipe, EngineConfig};

use crate::loaders::{ConfigLoader, LoadResult, RecipeLoader};

/// Content factory that loads engine settings and recipes from a data
/// directory.
///
/// # Directory Structure
///
/// ```text
/// data_dir/
/// ├── config.toml
/// └── recipes/
///     ├── enchanting.toml
///     └── mortar.ron
/// ```
pub struct ContentFactory {
    data_dir: PathBuf,
}

impl ContentFactory {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Load engine settings from `config.toml`, or defaults when absent.
    pub fn load_config(&self) -> LoadResult<EngineConfig> {
        let path = self.data_dir.join("config.toml");
        if !path.exists() {
            return Ok(EngineConfig::default());
        }
        ConfigLoader::load(&path)
    }

    /// Load every `.toml` / `.ron` recipe under `recipes/`, sorted by id.
    pub fn load_recipes(&self) -> LoadResult<Vec<CraftRecipe>> {
        let dir = self.recipes_dir();
        let entries = std::fs::read_dir(&dir)
            .map_err(|e| anyhow::anyhow!("Failed to read directory {}: {}", dir.display(), e))?;

        let mut recipes = Vec::new();
        for entry in entries {
            let path = entry?.path();
            let supported = matches!(
                path.extension().and_then(|ext| ext.to_str()),
                Some("toml" | "ron")
            );
            if supported {
                recipes.push(RecipeLoader::load(&path)?);
            }
        }
        recipes.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(recipes)
    }

    pub fn recipes_dir(&self) -> PathBuf {
        self.data_dir.join("recipes")
    }

    /// Returns the data directory path.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factory_paths() {
        let factory = ContentFactory::new("/tmp/data");
        assert_eq!(factory.data_dir(), Path::new("/tmp/data"));
        assert_eq!(factory.recipes_dir(), Path::new("/tmp/data/recipes"));
    }

    #[test]
    fn test_load_bundled_data() {
        let factory = ContentFactory::new(concat!(env!("CARGO_MANIFEST_DIR"), "/data"));
        let recipes = factory.load_recipes().unwrap();
        assert_eq!(recipes.len(), 1);
        assert_eq!(recipes[0].id, "enchanting-table");

        // no config.toml shipped
        assert_eq!(factory.load_config().unwrap(), EngineConfig::default());
    }
}
