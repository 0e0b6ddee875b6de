//! Engine settings loader.

use std::path::Path;

use craft_core::EngineConfig;

use crate::loaders::{LoadResult, read_file};

/// Loader for engine settings from TOML files.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load engine settings from a TOML file. Missing keys take their defaults.
    pub fn load(path: &Path) -> LoadResult<EngineConfig> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> LoadResult<EngineConfig> {
        toml::from_str(content).map_err(|e| anyhow::anyhow!("Failed to parse config TOML: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_keys_take_defaults() {
        let config = ConfigLoader::parse("holding_location = \"guild-vault\"\n").unwrap();
        assert_eq!(config.holding_location, "guild-vault");
        assert_eq!(config.quantity_path, EngineConfig::DEFAULT_QUANTITY_PATH);
        assert!(config.audit_trail);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "quantity_path = \"data.count\"\naudit_trail = false\nalways_show_elements = true\n",
        )
        .unwrap();

        let config = ConfigLoader::load(&path).unwrap();
        assert_eq!(config.quantity_path, "data.count");
        assert!(!config.audit_trail);
        assert!(config.always_show_elements);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let err = ConfigLoader::load(Path::new("/nonexistent/config.toml")).unwrap_err();
        assert!(err.to_string().contains("Failed to read file"));
    }
}
