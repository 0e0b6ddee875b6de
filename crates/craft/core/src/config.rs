/// Engine-wide settings shared by every recipe.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EngineConfig {
    /// Dotted path to the quantity field inside an item's data.
    pub quantity_path: String,
    /// Location results are created in when no actor is bound.
    pub holding_location: String,
    /// Append applied modifier names to crafted result descriptions.
    pub audit_trail: bool,
    /// Show every aggregated element regardless of rule visibility.
    pub always_show_elements: bool,
}

impl EngineConfig {
    pub const DEFAULT_QUANTITY_PATH: &'static str = "system.quantity";
    pub const DEFAULT_HOLDING_LOCATION: &'static str = "crafted";

    pub fn new() -> Self {
        Self {
            quantity_path: Self::DEFAULT_QUANTITY_PATH.to_string(),
            holding_location: Self::DEFAULT_HOLDING_LOCATION.to_string(),
            audit_trail: true,
            always_show_elements: false,
        }
    }

    pub fn with_quantity_path(mut self, path: impl Into<String>) -> Self {
        self.quantity_path = path.into();
        self
    }

    pub fn with_holding_location(mut self, location: impl Into<String>) -> Self {
        self.holding_location = location.into();
        self
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new()
    }
}
