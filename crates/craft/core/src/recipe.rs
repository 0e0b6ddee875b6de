//! Typed configuration records.
//!
//! A [`CraftRecipe`] is the persisted configuration record of one crafting
//! surface: its input [`Slot`]s, output [`ResultSlot`]s, optional
//! [`Modifier`]s, element aggregation rules, budget and selection limits.
//! Every field is explicit; there is no path-string indirection.

use std::collections::{BTreeMap, BTreeSet};

use crate::condition::Condition;
use crate::element::ElementAggregationRule;
use crate::error::ConfigError;
use crate::requirement::IngredientRequirements;

pub type RecipeId = String;
pub type SlotId = String;
pub type ResultId = String;
pub type ModifierId = String;

// ============================================================================
// Extension Points
// ============================================================================

/// Reference to a named script registered with the runtime's script host.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct ScriptRef(pub String);

impl ScriptRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

/// Predicate that may lift a static lock for the current refresh.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum UnlockPredicate {
    /// Evaluated in-process by [`Condition::evaluate`].
    Condition(Condition),
    /// Evaluated by the runtime's script host.
    Script(ScriptRef),
}

impl UnlockPredicate {
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Condition(_) => false,
            Self::Script(script) => script.is_empty(),
        }
    }
}

// ============================================================================
// Slots
// ============================================================================

/// Acceptance rule checked when an item is placed in a slot.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SlotAcceptance {
    /// Accepted material keys; empty accepts anything.
    pub materials: BTreeSet<String>,
    pub min_quantity: Option<i32>,
    pub max_quantity: Option<i32>,
}

impl SlotAcceptance {
    pub fn accepts(&self, material: &str, quantity: i32) -> bool {
        if !self.materials.is_empty() && !self.materials.contains(material) {
            return false;
        }
        if self.min_quantity.is_some_and(|min| quantity < min) {
            return false;
        }
        if self.max_quantity.is_some_and(|max| quantity > max) {
            return false;
        }
        true
    }
}

/// A declared input bay.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Slot {
    pub id: SlotId,
    pub name: String,
    pub is_necessary: bool,
    pub is_consumed: bool,
    pub is_locked: bool,
    pub unlock: Option<UnlockPredicate>,
    pub accepts: SlotAcceptance,
}

impl Default for Slot {
    fn default() -> Self {
        Self {
            id: String::new(),
            name: String::new(),
            is_necessary: false,
            is_consumed: true,
            is_locked: false,
            unlock: None,
            accepts: SlotAcceptance::default(),
        }
    }
}

impl Slot {
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn necessary(mut self) -> Self {
        self.is_necessary = true;
        self
    }

    #[must_use]
    pub fn kept(mut self) -> Self {
        self.is_consumed = false;
        self
    }

    #[must_use]
    pub fn locked(mut self, unlock: Option<UnlockPredicate>) -> Self {
        self.is_locked = true;
        self.unlock = unlock;
        self
    }
}

/// A declared output bay.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ResultSlot {
    pub id: ResultId,
    pub name: String,
    pub is_necessary: bool,
    pub is_locked: bool,
    pub unlock: Option<UnlockPredicate>,
    /// Results sharing a group are bounded by [`SelectionLimits::result_groups`].
    pub result_limit_group: Option<String>,
}

impl ResultSlot {
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn necessary(mut self) -> Self {
        self.is_necessary = true;
        self
    }

    #[must_use]
    pub fn group(mut self, group: impl Into<String>) -> Self {
        self.result_limit_group = Some(group.into());
        self
    }

    #[must_use]
    pub fn locked(mut self, unlock: Option<UnlockPredicate>) -> Self {
        self.is_locked = true;
        self.unlock = unlock;
        self
    }
}

// ============================================================================
// Modifiers
// ============================================================================

/// How a change is combined with the current property value.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum ChangeMode {
    /// Interpreted by the host only; never patched directly.
    Custom,
    Multiply,
    #[default]
    Add,
    /// Keep the smaller of current and change.
    Downgrade,
    /// Keep the larger of current and change.
    Upgrade,
    Override,
}

/// Value carried by an [`EffectChange`].
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum ChangeValue {
    Flag(bool),
    Number(i64),
    Float(f64),
    Text(String),
}

impl Default for ChangeValue {
    fn default() -> Self {
        Self::Number(0)
    }
}

impl core::fmt::Display for ChangeValue {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Flag(flag) => write!(f, "{flag}"),
            Self::Number(number) => write!(f, "{number}"),
            Self::Float(number) => write!(f, "{number}"),
            Self::Text(text) => f.write_str(text),
        }
    }
}

/// One ordered property change of a modifier.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EffectChange {
    pub key: String,
    pub mode: ChangeMode,
    pub value: ChangeValue,
}

impl EffectChange {
    pub fn new(key: impl Into<String>, mode: ChangeMode, value: ChangeValue) -> Self {
        Self {
            key: key.into(),
            mode,
            value,
        }
    }

    /// Direct patches are only allowed on plain dotted keys (`[A-Za-z0-9.]+`).
    pub fn is_patchable(&self) -> bool {
        !self.key.is_empty()
            && self
                .key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '.')
    }
}

/// Where a modifier's changes end up on each result.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum AppliesAs {
    /// Property patches on the result's data.
    #[default]
    Direct,
    /// A generated effect record per result holding this modifier's changes.
    Effect,
    /// Appended to the recipe's shared named effect record on each result.
    Merge,
}

/// An optional, costed effect bundle.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Modifier {
    pub id: ModifierId,
    pub name: String,
    pub description: String,
    pub img: String,
    /// May be negative (refunds budget).
    pub cost: i32,
    pub categories: BTreeSet<String>,
    pub is_auto: bool,
    pub is_locked: bool,
    pub unlock: Option<UnlockPredicate>,
    pub requirements: IngredientRequirements,
    pub changes: Vec<EffectChange>,
    pub applies_as: AppliesAs,
    pub script: Option<ScriptRef>,
}

impl Modifier {
    pub fn new(id: impl Into<String>, cost: i32) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            cost,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn auto(mut self) -> Self {
        self.is_auto = true;
        self
    }

    #[must_use]
    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.categories.insert(category.into());
        self
    }

    #[must_use]
    pub fn locked(mut self, unlock: Option<UnlockPredicate>) -> Self {
        self.is_locked = true;
        self.unlock = unlock;
        self
    }

    #[must_use]
    pub fn requires(mut self, requirements: IngredientRequirements) -> Self {
        self.requirements = requirements;
        self
    }

    #[must_use]
    pub fn change(mut self, change: EffectChange) -> Self {
        self.changes.push(change);
        self
    }

    #[must_use]
    pub fn applies_as(mut self, applies_as: AppliesAs) -> Self {
        self.applies_as = applies_as;
        self
    }

    #[must_use]
    pub fn script(mut self, script: ScriptRef) -> Self {
        self.script = Some(script);
        self
    }
}

// ============================================================================
// Recipe Record
// ============================================================================

#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BudgetConfig {
    pub base: i32,
    /// Element whose aggregated quantity is added to the base.
    pub element_ref: Option<String>,
    pub icon: String,
}

/// Selection quotas. A limit of `0` (or an absent entry) means unlimited.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SelectionLimits {
    /// Maximum number of discretionary modifiers.
    pub modifier_limit: u32,
    pub categories: BTreeMap<String, u32>,
    pub result_groups: BTreeMap<String, u32>,
}

impl SelectionLimits {
    pub fn category_limit(&self, category: &str) -> u32 {
        self.categories.get(category).copied().unwrap_or(0)
    }

    pub fn group_limit(&self, group: &str) -> u32 {
        self.result_groups.get(group).copied().unwrap_or(0)
    }
}

/// Recipe-level extension points.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RecipeScripts {
    /// Returns a number that replaces the computed budget maximum.
    pub budget: Option<ScriptRef>,
    pub pre_craft: Option<ScriptRef>,
    pub post_craft: Option<ScriptRef>,
}

/// The persisted configuration record of one crafting surface.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CraftRecipe {
    pub id: RecipeId,
    pub name: String,
    pub description: String,
    pub img: String,
    /// Name of the shared effect record used by merge modifiers.
    pub effect_name: String,
    pub slots: Vec<Slot>,
    pub results: Vec<ResultSlot>,
    pub modifiers: Vec<Modifier>,
    pub rules: Vec<ElementAggregationRule>,
    pub budget: BudgetConfig,
    pub limits: SelectionLimits,
    pub scripts: RecipeScripts,
}

impl CraftRecipe {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn slot(&self, id: &str) -> Option<&Slot> {
        self.slots.iter().find(|slot| slot.id == id)
    }

    pub fn result(&self, id: &str) -> Option<&ResultSlot> {
        self.results.iter().find(|result| result.id == id)
    }

    pub fn modifier(&self, id: &str) -> Option<&Modifier> {
        self.modifiers.iter().find(|modifier| modifier.id == id)
    }

    /// Name of the shared merge effect, falling back to the recipe name.
    pub fn effect_name(&self) -> &str {
        if self.effect_name.is_empty() {
            &self.name
        } else {
            &self.effect_name
        }
    }

    /// Every category referenced by a modifier or a limit.
    pub fn categories(&self) -> BTreeSet<String> {
        self.modifiers
            .iter()
            .flat_map(|modifier| modifier.categories.iter().cloned())
            .chain(self.limits.categories.keys().cloned())
            .collect()
    }

    /// Recipe ids double as file stems, so they stay within `[A-Za-z0-9_-]`.
    pub fn is_valid_id(id: &str) -> bool {
        !id.is_empty()
            && id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    }

    /// Checks the recipe id, id uniqueness and rule sanity.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.id.is_empty() {
            return Err(ConfigError::EmptyId { kind: "recipe" });
        }
        if !Self::is_valid_id(&self.id) {
            return Err(ConfigError::InvalidRecipeId(self.id.clone()));
        }
        unique("slot", self.slots.iter().map(|s| s.id.as_str()))?;
        unique("result", self.results.iter().map(|r| r.id.as_str()))?;
        unique("modifier", self.modifiers.iter().map(|m| m.id.as_str()))?;
        unique("rule", self.rules.iter().map(|r| r.id.as_str()))?;

        if let Some(rule) = self.rules.iter().find(|rule| rule.ids.is_empty()) {
            return Err(ConfigError::EmptyRule(rule.id.clone()));
        }
        Ok(())
    }
}

fn unique<'a>(kind: &'static str, ids: impl Iterator<Item = &'a str>) -> Result<(), ConfigError> {
    let mut seen = BTreeSet::new();
    for id in ids {
        if id.is_empty() {
            return Err(ConfigError::EmptyId { kind });
        }
        if !seen.insert(id) {
            return Err(ConfigError::DuplicateId {
                kind,
                id: id.to_string(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn patchable_keys_are_plain_dotted_paths() {
        let ok = EffectChange::new("system.damage.bonus", ChangeMode::Add, ChangeValue::Number(1));
        assert!(ok.is_patchable());

        for key in ["", "system.damage[0]", "system.name; drop", "flags.x-y", "a b"] {
            let change = EffectChange::new(key, ChangeMode::Add, ChangeValue::Number(1));
            assert!(!change.is_patchable(), "{key:?}");
        }
    }

    #[test]
    fn acceptance_filters_material_and_quantity() {
        let acceptance = SlotAcceptance {
            materials: ["herb".to_string()].into_iter().collect(),
            min_quantity: Some(1),
            max_quantity: Some(3),
        };
        assert!(acceptance.accepts("herb", 2));
        assert!(!acceptance.accepts("stone", 2));
        assert!(!acceptance.accepts("herb", 4));
        assert!(SlotAcceptance::default().accepts("anything", 99));
    }

    #[test]
    fn validate_rejects_duplicates_and_empty_rules() {
        let mut recipe = CraftRecipe::new("r", "Recipe");
        recipe.slots = vec![Slot::new("a"), Slot::new("a")];
        assert_eq!(
            recipe.validate(),
            Err(ConfigError::DuplicateId {
                kind: "slot",
                id: "a".into()
            })
        );

        recipe.slots = vec![Slot::new("a")];
        recipe.rules = vec![ElementAggregationRule::new("empty", Vec::<String>::new())];
        assert_eq!(recipe.validate(), Err(ConfigError::EmptyRule("empty".into())));
    }

    #[test]
    fn recipe_ids_stay_plain_file_stems() {
        assert!(CraftRecipe::new("enchanting-table", "Table").validate().is_ok());
        assert_eq!(
            CraftRecipe::new("", "Nameless").validate(),
            Err(ConfigError::EmptyId { kind: "recipe" })
        );
        for id in ["../escape", "a/b", "a.b", "with space"] {
            assert_eq!(
                CraftRecipe::new(id, "Bad").validate(),
                Err(ConfigError::InvalidRecipeId(id.into())),
                "{id:?}"
            );
        }
    }

    #[test]
    fn effect_name_falls_back_to_recipe_name() {
        let mut recipe = CraftRecipe::new("r", "Enchanting Table");
        assert_eq!(recipe.effect_name(), "Enchanting Table");
        recipe.effect_name = "Enchantments".into();
        assert_eq!(recipe.effect_name(), "Enchantments");
    }
}
