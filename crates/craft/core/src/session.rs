//! Session state and the refresh pipeline snapshot.
//!
//! [`SessionState`] holds what the user placed and picked. A refresh turns it
//! into a [`Resolution`]: aggregate elements, evaluate locks, resolve the
//! budget. Each step returns a new value; nothing is patched in place.

use std::collections::{BTreeMap, BTreeSet};

use crate::budget::{BudgetResolution, Toggled};
use crate::condition::ConditionContext;
use crate::element::{AggregationMode, Element, ElementProfile, aggregate};
use crate::eligibility::{LockTable, UnlockOverrides, evaluate_locks};
use crate::error::SelectionError;
use crate::recipe::{CraftRecipe, ModifierId, ResultId, SlotId};
use crate::requirement::MaterialCounts;

/// Reference to an inventory item.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ItemRef {
    pub id: String,
    /// Owning container; `None` for items lying outside any container.
    pub container: Option<String>,
}

impl ItemRef {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            container: None,
        }
    }

    pub fn owned_by(id: impl Into<String>, container: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            container: Some(container.into()),
        }
    }
}

/// An item placed in an input slot.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SlotContent {
    pub item: ItemRef,
    pub name: String,
    /// Material key used by acceptance rules and requirements.
    pub material: String,
    pub quantity: i32,
    pub elements: Vec<Element>,
}

/// An item placed in a result slot.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ResultContent {
    pub item: ItemRef,
    pub name: String,
    /// Modifier ids already committed on this item.
    pub applied: BTreeSet<ModifierId>,
}

/// Display overrides applied to every crafted result.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ResultOverrides {
    pub name: Option<String>,
    pub img: Option<String>,
    pub description: Option<String>,
}

impl ResultOverrides {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.img.is_none() && self.description.is_none()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SessionState {
    pub filled: BTreeMap<SlotId, SlotContent>,
    pub results: BTreeMap<ResultId, ResultContent>,
    /// Discretionary modifier choices carried into the next refresh.
    pub chosen_modifiers: BTreeSet<ModifierId>,
    pub chosen_results: BTreeSet<ResultId>,
    /// Container consumed materials are taken from and results land in.
    pub actor: Option<String>,
    pub overrides: ResultOverrides,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw elements in slot order, then element order inside each item.
    pub fn raw_elements(&self, recipe: &CraftRecipe) -> Vec<Element> {
        recipe
            .slots
            .iter()
            .filter_map(|slot| self.filled.get(&slot.id))
            .flat_map(|content| content.elements.iter().cloned())
            .collect()
    }

    pub fn material_counts(&self, recipe: &CraftRecipe) -> MaterialCounts {
        let mut counts = MaterialCounts::new();
        for content in recipe.slots.iter().filter_map(|slot| self.filled.get(&slot.id)) {
            if content.material.is_empty() {
                continue;
            }
            *counts.entry(content.material.clone()).or_insert(0) += content.quantity;
        }
        counts
    }

    pub fn filled_slot_ids(&self) -> BTreeSet<SlotId> {
        self.filled.keys().cloned().collect()
    }

    pub fn profile(&self, recipe: &CraftRecipe, mode: AggregationMode) -> ElementProfile {
        aggregate(&self.raw_elements(recipe), &recipe.rules, mode)
    }

    /// Modifiers already applied to any chosen result.
    pub fn carried_modifiers(&self) -> BTreeSet<ModifierId> {
        self.chosen_results
            .iter()
            .filter_map(|id| self.results.get(id))
            .flat_map(|content| content.applied.iter().cloned())
            .collect()
    }

    /// Places an item in an input slot, returning what it replaced.
    ///
    /// # Errors
    ///
    /// Fails when the slot is unknown, locked, or its acceptance rule refuses
    /// the item.
    pub fn fill_slot(
        &mut self,
        recipe: &CraftRecipe,
        locks: &LockTable,
        slot_id: &str,
        content: SlotContent,
    ) -> Result<Option<SlotContent>, SelectionError> {
        let slot = recipe
            .slot(slot_id)
            .ok_or_else(|| SelectionError::UnknownSlot(slot_id.to_string()))?;
        if locks.slot_locked(slot_id) {
            return Err(SelectionError::Locked(slot_id.to_string()));
        }
        if !slot.accepts.accepts(&content.material, content.quantity) {
            return Err(SelectionError::NotAccepted {
                slot: slot_id.to_string(),
                material: content.material,
            });
        }
        Ok(self.filled.insert(slot_id.to_string(), content))
    }

    pub fn empty_slot(&mut self, slot_id: &str) -> Option<SlotContent> {
        self.filled.remove(slot_id)
    }

    /// Places an item in a result slot, returning what it replaced.
    ///
    /// # Errors
    ///
    /// Fails when the result slot is unknown.
    pub fn set_result(
        &mut self,
        recipe: &CraftRecipe,
        result_id: &str,
        content: ResultContent,
    ) -> Result<Option<ResultContent>, SelectionError> {
        if recipe.result(result_id).is_none() {
            return Err(SelectionError::UnknownResult(result_id.to_string()));
        }
        Ok(self.results.insert(result_id.to_string(), content))
    }

    pub fn clear_result(&mut self, result_id: &str) -> Option<ResultContent> {
        self.chosen_results.remove(result_id);
        self.results.remove(result_id)
    }

    /// Toggles a result slot in or out of the chosen set.
    ///
    /// # Errors
    ///
    /// Choosing fails when the slot is unknown, empty, locked, or its limit
    /// group is full. Un-choosing always succeeds.
    pub fn choose_result(
        &mut self,
        recipe: &CraftRecipe,
        locks: &LockTable,
        result_id: &str,
    ) -> Result<Toggled, SelectionError> {
        let result = recipe
            .result(result_id)
            .ok_or_else(|| SelectionError::UnknownResult(result_id.to_string()))?;

        if self.chosen_results.remove(result_id) {
            return Ok(Toggled::Off);
        }
        if !self.results.contains_key(result_id) {
            return Err(SelectionError::EmptyResult(result_id.to_string()));
        }
        if locks.result_locked(result_id) {
            return Err(SelectionError::Locked(result_id.to_string()));
        }

        if let Some(group) = &result.result_limit_group {
            let limit = recipe.limits.group_limit(group);
            let in_group = self
                .chosen_results
                .iter()
                .filter_map(|id| recipe.result(id))
                .filter(|chosen| chosen.result_limit_group.as_ref() == Some(group))
                .count();
            if limit > 0 && in_group >= limit as usize {
                return Err(SelectionError::ResultGroupLimit {
                    group: group.clone(),
                    limit,
                });
            }
        }

        self.chosen_results.insert(result_id.to_string());
        Ok(Toggled::On)
    }

    /// Necessary slots and result slots that are still empty, in recipe order.
    pub fn missing_necessary(&self, recipe: &CraftRecipe) -> Vec<String> {
        let slots = recipe
            .slots
            .iter()
            .filter(|slot| slot.is_necessary && !self.filled.contains_key(&slot.id))
            .map(|slot| slot.name.clone());
        let results = recipe
            .results
            .iter()
            .filter(|result| result.is_necessary && !self.results.contains_key(&result.id))
            .map(|result| result.name.clone());
        slots.chain(results).collect()
    }

    /// Chosen results that hold an item, in recipe order.
    pub fn chosen_result_items<'a>(
        &'a self,
        recipe: &'a CraftRecipe,
    ) -> impl Iterator<Item = (&'a ResultId, &'a ResultContent)> + 'a {
        recipe
            .results
            .iter()
            .filter(|result| self.chosen_results.contains(&result.id))
            .filter_map(|result| self.results.get(&result.id).map(|content| (&result.id, content)))
    }

    /// Keeps the discretionary choices of a resolution for the next refresh.
    pub fn remember(&mut self, resolution: &Resolution) {
        self.chosen_modifiers = resolution.budget.discretionary();
    }

    /// Clears inputs, outputs and selections after a committed craft.
    pub fn reset(&mut self) {
        self.filled.clear();
        self.results.clear();
        self.chosen_modifiers.clear();
        self.chosen_results.clear();
        self.overrides = ResultOverrides::default();
    }
}

/// One refresh worth of derived state.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Resolution {
    pub profile: ElementProfile,
    pub materials: MaterialCounts,
    pub locks: LockTable,
    pub budget: BudgetResolution,
}

impl Resolution {
    /// Runs locks and budget over an already aggregated profile.
    ///
    /// Script outcomes are passed in: `overrides` for script unlock
    /// predicates and `script_max` for a budget script.
    pub fn compute(
        recipe: &CraftRecipe,
        state: &SessionState,
        profile: ElementProfile,
        overrides: &UnlockOverrides,
        script_max: Option<i32>,
    ) -> Self {
        let materials = state.material_counts(recipe);
        let filled = state.filled_slot_ids();
        let locks = evaluate_locks(
            recipe,
            &ConditionContext {
                profile: &profile,
                materials: &materials,
                filled_slots: &filled,
            },
            overrides,
        );
        let budget = BudgetResolution::resolve(
            recipe,
            &profile,
            &locks,
            &state.chosen_modifiers,
            &state.carried_modifiers(),
            script_max,
        );
        Self {
            profile,
            materials,
            locks,
            budget,
        }
    }

    /// Script-free refresh.
    pub fn refresh(recipe: &CraftRecipe, state: &SessionState, mode: AggregationMode) -> Self {
        Self::compute(
            recipe,
            state,
            state.profile(recipe, mode),
            &UnlockOverrides::new(),
            None,
        )
    }

    /// Chosen modifiers in recipe list order.
    pub fn chosen_in_order<'a>(
        &'a self,
        recipe: &'a CraftRecipe,
    ) -> impl Iterator<Item = &'a crate::recipe::Modifier> + 'a {
        recipe
            .modifiers
            .iter()
            .filter(|modifier| self.budget.is_chosen(&modifier.id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recipe::{Modifier, ResultSlot, Slot, SlotAcceptance};

    fn herb(id: &str, fire: i32, quantity: i32) -> SlotContent {
        SlotContent {
            item: ItemRef::owned_by(id, "alice"),
            name: id.to_string(),
            material: "herb".into(),
            quantity,
            elements: vec![Element::new("fire", fire)],
        }
    }

    fn recipe() -> CraftRecipe {
        let mut recipe = CraftRecipe::new("still", "Still");
        recipe.slots = vec![
            Slot::new("a").necessary(),
            Slot::new("b"),
            Slot {
                accepts: SlotAcceptance {
                    materials: ["gem".to_string()].into_iter().collect(),
                    ..SlotAcceptance::default()
                },
                ..Slot::new("gem")
            },
        ];
        recipe.results = vec![
            ResultSlot::new("potion").group("flask"),
            ResultSlot::new("tonic").group("flask"),
            ResultSlot::new("salve"),
        ];
        recipe.limits.result_groups.insert("flask".into(), 1);
        recipe.budget.base = 1;
        recipe.budget.element_ref = Some("fire".into());
        recipe.modifiers = vec![Modifier::new("strong", 2), Modifier::new("fine", 1).auto()];
        recipe
    }

    #[test]
    fn refresh_aggregates_slots_in_order() {
        let recipe = recipe();
        let locks = LockTable::default();
        let mut state = SessionState::new();
        state.fill_slot(&recipe, &locks, "b", herb("h2", 2, 1)).unwrap();
        state.fill_slot(&recipe, &locks, "a", herb("h1", 1, 3)).unwrap();

        assert_eq!(state.raw_elements(&recipe)[0].num, 1);
        assert_eq!(state.material_counts(&recipe).get("herb"), Some(&4));

        let resolution = Resolution::refresh(&recipe, &state, AggregationMode::Craft);
        assert_eq!(resolution.profile.quantity("fire"), 3);
        assert_eq!(resolution.budget.budget.max, 4);
        assert!(resolution.budget.is_chosen("fine"));
        assert_eq!(resolution.budget.budget.value, 3);
    }

    #[test]
    fn fill_slot_checks_acceptance() {
        let recipe = recipe();
        let mut state = SessionState::new();
        let err = state
            .fill_slot(&recipe, &LockTable::default(), "gem", herb("h", 1, 1))
            .unwrap_err();
        assert_eq!(
            err,
            SelectionError::NotAccepted {
                slot: "gem".into(),
                material: "herb".into()
            }
        );
        assert!(state.filled.is_empty());
    }

    #[test]
    fn result_group_limit_and_empty_results() {
        let recipe = recipe();
        let locks = LockTable::default();
        let mut state = SessionState::new();
        assert_eq!(
            state.choose_result(&recipe, &locks, "potion"),
            Err(SelectionError::EmptyResult("potion".into()))
        );

        for id in ["potion", "tonic", "salve"] {
            let content = ResultContent {
                item: ItemRef::new(id),
                name: id.into(),
                applied: BTreeSet::new(),
            };
            state.set_result(&recipe, id, content).unwrap();
        }
        assert_eq!(state.choose_result(&recipe, &locks, "potion"), Ok(Toggled::On));
        assert!(matches!(
            state.choose_result(&recipe, &locks, "tonic"),
            Err(SelectionError::ResultGroupLimit { limit: 1, .. })
        ));
        assert_eq!(state.choose_result(&recipe, &locks, "salve"), Ok(Toggled::On));
        assert_eq!(state.choose_result(&recipe, &locks, "potion"), Ok(Toggled::Off));
        assert_eq!(state.choose_result(&recipe, &locks, "tonic"), Ok(Toggled::On));
    }

    #[test]
    fn carried_modifiers_come_from_chosen_results() {
        let recipe = recipe();
        let mut state = SessionState::new();
        let content = ResultContent {
            item: ItemRef::new("old-potion"),
            name: "Old Potion".into(),
            applied: ["strong".to_string()].into_iter().collect(),
        };
        state.set_result(&recipe, "salve", content).unwrap();
        assert!(state.carried_modifiers().is_empty());

        state.chosen_results.insert("salve".into());
        let resolution = Resolution::refresh(&recipe, &state, AggregationMode::Craft);
        assert!(resolution.budget.carried.contains("strong"));
        assert!(resolution.budget.is_chosen("strong"));
    }

    #[test]
    fn missing_necessary_lists_empty_required_slots() {
        let recipe = recipe();
        let state = SessionState::new();
        assert_eq!(state.missing_necessary(&recipe), vec!["a".to_string()]);
    }
}
