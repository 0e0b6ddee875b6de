//! Budget resolver.
//!
//! Computes the spendable budget of a session and the set of chosen
//! modifiers, enforcing cost and quota constraints.
//!
//! Modifiers fall in three groups:
//! - **auto**: chosen whenever unlocked
//! - **carried**: already applied to a chosen result, always chosen
//! - **discretionary**: toggled by the user
//!
//! Only discretionary modifiers are ever de-selected, and only all at once.

use std::collections::BTreeSet;

use crate::element::ElementProfile;
use crate::eligibility::LockTable;
use crate::error::SelectionError;
use crate::recipe::{BudgetConfig, CraftRecipe, ModifierId};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Budget {
    pub base: i32,
    pub max: i32,
    /// Remaining spendable capacity.
    pub value: i32,
    pub element_ref: Option<String>,
    pub icon: String,
}

impl Budget {
    /// `base + quantity(element_ref)`, unless a script supplied a maximum.
    pub fn new(config: &BudgetConfig, profile: &ElementProfile, script_max: Option<i32>) -> Self {
        let max = script_max.unwrap_or_else(|| {
            config.base
                + config
                    .element_ref
                    .as_deref()
                    .map_or(0, |id| profile.quantity(id))
        });
        Self {
            base: config.base,
            max,
            value: max,
            element_ref: config.element_ref.clone(),
            icon: config.icon.clone(),
        }
    }

    pub fn spent(&self) -> i32 {
        self.max - self.value
    }
}

/// Outcome of a toggle request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Toggled {
    On,
    Off,
}

/// The chosen modifier set together with the budget it leaves.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BudgetResolution {
    pub budget: Budget,
    /// Every chosen modifier: auto, carried and discretionary.
    pub chosen: BTreeSet<ModifierId>,
    pub auto: BTreeSet<ModifierId>,
    pub carried: BTreeSet<ModifierId>,
    /// Set when the last resolve de-selected the discretionary modifiers.
    pub cleared: bool,
}

impl BudgetResolution {
    /// Resolves the chosen set for one refresh.
    ///
    /// `previous` holds the discretionary choices of the last refresh.
    pub fn resolve(
        recipe: &CraftRecipe,
        profile: &ElementProfile,
        locks: &LockTable,
        previous: &BTreeSet<ModifierId>,
        carried: &BTreeSet<ModifierId>,
        script_max: Option<i32>,
    ) -> Self {
        let mut budget = Budget::new(&recipe.budget, profile, script_max);
        let mut chosen = BTreeSet::new();
        let mut auto = BTreeSet::new();
        let mut carried_set = BTreeSet::new();
        let mut discretionary = Vec::new();

        for modifier in &recipe.modifiers {
            let id = &modifier.id;
            if carried.contains(id) {
                carried_set.insert(id.clone());
            } else if modifier.is_auto {
                if locks.modifier_locked(id) {
                    continue;
                }
                auto.insert(id.clone());
            } else if previous.contains(id) && !locks.modifier_locked(id) {
                discretionary.push(modifier);
            } else {
                continue;
            }
            chosen.insert(id.clone());
            budget.value -= modifier.cost;
        }

        let limit = recipe.limits.modifier_limit;
        let over_budget = budget.value < 0;
        let over_limit = limit > 0 && discretionary.len() > limit as usize;
        let cleared = !discretionary.is_empty() && (over_budget || over_limit);
        if cleared {
            for modifier in discretionary {
                chosen.remove(&modifier.id);
                budget.value += modifier.cost;
            }
        }

        Self {
            budget,
            chosen,
            auto,
            carried: carried_set,
            cleared,
        }
    }

    pub fn is_chosen(&self, id: &str) -> bool {
        self.chosen.contains(id)
    }

    /// Chosen modifiers that are neither auto nor carried.
    pub fn discretionary(&self) -> BTreeSet<ModifierId> {
        self.chosen
            .iter()
            .filter(|id| !self.auto.contains(*id) && !self.carried.contains(*id))
            .cloned()
            .collect()
    }

    /// Toggles a discretionary modifier.
    ///
    /// # Errors
    ///
    /// Returns a [`SelectionError`] and leaves the resolution unchanged when
    /// the modifier is unknown, locked, immutable, unaffordable or over a
    /// quota.
    pub fn toggle(
        &mut self,
        recipe: &CraftRecipe,
        locks: &LockTable,
        id: &str,
    ) -> Result<Toggled, SelectionError> {
        let modifier = recipe
            .modifier(id)
            .ok_or_else(|| SelectionError::UnknownModifier(id.to_string()))?;

        if self.auto.contains(id) || self.carried.contains(id) {
            return Err(SelectionError::Immutable(id.to_string()));
        }

        if self.chosen.remove(id) {
            self.budget.value += modifier.cost;
            return Ok(Toggled::Off);
        }

        if locks.modifier_locked(id) {
            return Err(SelectionError::Locked(id.to_string()));
        }
        if self.budget.value < modifier.cost {
            return Err(SelectionError::OverBudget {
                id: id.to_string(),
                cost: modifier.cost,
                remaining: self.budget.value,
            });
        }

        let limit = recipe.limits.modifier_limit;
        if limit > 0 && self.discretionary().len() >= limit as usize {
            return Err(SelectionError::ModifierLimit { limit });
        }

        for category in &modifier.categories {
            let limit = recipe.limits.category_limit(category);
            if limit == 0 {
                continue;
            }
            let sharing = self
                .chosen
                .iter()
                .filter_map(|chosen| recipe.modifier(chosen))
                .filter(|chosen| chosen.categories.contains(category))
                .count();
            if sharing >= limit as usize {
                return Err(SelectionError::CategoryLimit {
                    category: category.clone(),
                    limit,
                });
            }
        }

        self.chosen.insert(id.to_string());
        self.budget.value -= modifier.cost;
        self.cleared = false;
        Ok(Toggled::On)
    }
}
