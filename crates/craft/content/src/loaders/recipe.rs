//! Recipe loader.
//!
//! One recipe per file. The format follows the file extension: `.toml` or
//! `.ron`. Loaded recipes are validated before they are returned.

use std::path::Path;

use craft_core::CraftRecipe;

use crate::loaders::{LoadResult, read_file};

/// Loader for recipe records from TOML or RON files.
pub struct RecipeLoader;

impl RecipeLoader {
    /// Load a recipe, picking the format from the file extension.
    pub fn load(path: &Path) -> LoadResult<CraftRecipe> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Self::load_toml(path),
            Some("ron") => Self::load_ron(path),
            _ => Err(anyhow::anyhow!(
                "Unsupported recipe file {}: expected .toml or .ron",
                path.display()
            )),
        }
    }

    pub fn load_toml(path: &Path) -> LoadResult<CraftRecipe> {
        let content = read_file(path)?;
        Self::parse_toml(&content)
    }

    pub fn load_ron(path: &Path) -> LoadResult<CraftRecipe> {
        let content = read_file(path)?;
        Self::parse_ron(&content)
    }

    pub fn parse_toml(content: &str) -> LoadResult<CraftRecipe> {
        let recipe: CraftRecipe = toml::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse recipe TOML: {}", e))?;
        Self::checked(recipe)
    }

    pub fn parse_ron(content: &str) -> LoadResult<CraftRecipe> {
        let recipe: CraftRecipe = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse recipe RON: {}", e))?;
        Self::checked(recipe)
    }

    pub fn to_toml_string(recipe: &CraftRecipe) -> LoadResult<String> {
        toml::to_string_pretty(recipe)
            .map_err(|e| anyhow::anyhow!("Failed to serialize recipe `{}`: {}", recipe.id, e))
    }

    /// Write a recipe as TOML, replacing any existing file.
    pub fn save_toml(path: &Path, recipe: &CraftRecipe) -> LoadResult<()> {
        let content = Self::to_toml_string(recipe)?;
        std::fs::write(path, content)
            .map_err(|e| anyhow::anyhow!("Failed to write file {}: {}", path.display(), e))
    }

    fn checked(recipe: CraftRecipe) -> LoadResult<CraftRecipe> {
        recipe
            .validate()
            .map_err(|e| anyhow::anyhow!("Invalid recipe `{}`: {}", recipe.id, e))?;
        Ok(recipe)
    }
}
