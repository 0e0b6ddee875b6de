//! Recipe editing.
//!
//! Child records (slots, results, modifiers, rules, categories) live inside
//! the recipe record. Every edit loads the record, mutates its typed fields,
//! validates and writes it back. A failed edit is reported and leaves the
//! stored record untouched.

use std::sync::Arc;

use tracing::{info, warn};

use craft_core::{
    BudgetConfig, CraftFailure, CraftRecipe, ElementAggregationRule, Modifier, ResultSlot, Slot,
};

use crate::api::EditError;
use crate::runtime::Services;
use crate::session::{SessionKey, SessionManager, SessionMode};

type EditResult<T> = std::result::Result<T, EditError>;

/// A child record addressed by id inside its recipe.
trait Entry {
    const KIND: &'static str;

    fn entry_id(&self) -> &str;
}

impl Entry for Slot {
    const KIND: &'static str = "slot";

    fn entry_id(&self) -> &str {
        &self.id
    }
}

impl Entry for ResultSlot {
    const KIND: &'static str = "result";

    fn entry_id(&self) -> &str {
        &self.id
    }
}

impl Entry for Modifier {
    const KIND: &'static str = "modifier";

    fn entry_id(&self) -> &str {
        &self.id
    }
}

impl Entry for ElementAggregationRule {
    const KIND: &'static str = "rule";

    fn entry_id(&self) -> &str {
        &self.id
    }
}

fn position<T: Entry>(list: &[T], id: &str) -> EditResult<usize> {
    list.iter()
        .position(|entry| entry.entry_id() == id)
        .ok_or_else(|| EditError::UnknownEntry {
            kind: T::KIND,
            id: id.to_string(),
        })
}

fn add<T: Entry>(list: &mut Vec<T>, entry: T) -> EditResult<()> {
    if list.iter().any(|existing| existing.entry_id() == entry.entry_id()) {
        return Err(EditError::DuplicateEntry {
            kind: T::KIND,
            id: entry.entry_id().to_string(),
        });
    }
    list.push(entry);
    Ok(())
}

fn replace<T: Entry>(list: &mut [T], entry: T) -> EditResult<()> {
    let index = position(list, entry.entry_id())?;
    list[index] = entry;
    Ok(())
}

fn remove<T: Entry>(list: &mut Vec<T>, id: &str) -> EditResult<T> {
    let index = position(list, id)?;
    Ok(list.remove(index))
}

/// Reads, mutates and writes back recipe records.
#[derive(Clone)]
pub struct RecipeEditor {
    services: Arc<Services>,
    sessions: Option<Arc<SessionManager>>,
}

impl RecipeEditor {
    pub(crate) fn new(services: Arc<Services>, sessions: Option<Arc<SessionManager>>) -> Self {
        Self { services, sessions }
    }

    fn report(&self, recipe_id: &str, error: &EditError) {
        warn!(
            target: "runtime::editor",
            recipe = recipe_id,
            code = error.error_code(),
            error = %error,
            "Recipe edit rejected"
        );
        self.services.sink.error(&error.to_string());
    }

    async fn persist(&self, recipe: &CraftRecipe) -> EditResult<()> {
        recipe.validate()?;
        self.services.store.save(recipe).await?;
        if let Some(sessions) = &self.sessions {
            sessions.reload(recipe).await;
        }
        Ok(())
    }

    /// Loads `recipe_id`, applies `mutate`, validates and saves.
    ///
    /// Open sessions of the recipe pick up the saved record.
    pub async fn edit<F>(&self, recipe_id: &str, mutate: F) -> EditResult<CraftRecipe>
    where
        F: FnOnce(&mut CraftRecipe) -> EditResult<()>,
    {
        match self.try_edit(recipe_id, mutate).await {
            Ok(recipe) => {
                info!(target: "runtime::editor", recipe = recipe_id, "Recipe saved");
                Ok(recipe)
            }
            Err(e) => {
                self.report(recipe_id, &e);
                Err(e)
            }
        }
    }

    async fn try_edit<F>(&self, recipe_id: &str, mutate: F) -> EditResult<CraftRecipe>
    where
        F: FnOnce(&mut CraftRecipe) -> EditResult<()>,
    {
        let mut recipe = self
            .services
            .store
            .load(recipe_id)
            .await?
            .ok_or_else(|| EditError::RecipeNotFound(recipe_id.to_string()))?;
        mutate(&mut recipe)?;
        self.persist(&recipe).await?;
        Ok(recipe)
    }

    pub async fn create_recipe(&self, recipe: CraftRecipe) -> EditResult<()> {
        let exists = self.services.store.load(&recipe.id).await?.is_some();
        let outcome = if exists {
            Err(EditError::DuplicateEntry {
                kind: "recipe",
                id: recipe.id.clone(),
            })
        } else {
            self.persist(&recipe).await
        };

        if let Err(e) = &outcome {
            self.report(&recipe.id, e);
        }
        outcome
    }

    /// Deletes a recipe and closes its sessions. Returns true if it existed.
    pub async fn delete_recipe(&self, recipe_id: &str) -> EditResult<bool> {
        let deleted = match self.services.store.delete(recipe_id).await {
            Ok(deleted) => deleted,
            Err(e) => {
                let e = EditError::from(e);
                self.report(recipe_id, &e);
                return Err(e);
            }
        };
        if let Some(sessions) = &self.sessions {
            for mode in [SessionMode::Craft, SessionMode::Edit] {
                sessions
                    .close_existing(&SessionKey::new(recipe_id, mode))
                    .await;
            }
        }
        Ok(deleted)
    }

    // ========================================================================
    // Slots
    // ========================================================================

    pub async fn add_slot(&self, recipe_id: &str, slot: Slot) -> EditResult<CraftRecipe> {
        self.edit(recipe_id, |recipe| add(&mut recipe.slots, slot)).await
    }

    pub async fn update_slot(&self, recipe_id: &str, slot: Slot) -> EditResult<CraftRecipe> {
        self.edit(recipe_id, |recipe| replace(&mut recipe.slots, slot))
            .await
    }

    pub async fn remove_slot(&self, recipe_id: &str, slot_id: &str) -> EditResult<CraftRecipe> {
        self.edit(recipe_id, |recipe| remove(&mut recipe.slots, slot_id).map(drop))
            .await
    }

    // ========================================================================
    // Result slots
    // ========================================================================

    pub async fn add_result(&self, recipe_id: &str, result: ResultSlot) -> EditResult<CraftRecipe> {
        self.edit(recipe_id, |recipe| add(&mut recipe.results, result))
            .await
    }

    pub async fn update_result(
        &self,
        recipe_id: &str,
        result: ResultSlot,
    ) -> EditResult<CraftRecipe> {
        self.edit(recipe_id, |recipe| replace(&mut recipe.results, result))
            .await
    }

    pub async fn remove_result(&self, recipe_id: &str, result_id: &str) -> EditResult<CraftRecipe> {
        self.edit(recipe_id, |recipe| {
            remove(&mut recipe.results, result_id).map(drop)
        })
        .await
    }

    /// A limit of `0` removes the group's cap.
    pub async fn set_result_group_limit(
        &self,
        recipe_id: &str,
        group: &str,
        limit: u32,
    ) -> EditResult<CraftRecipe> {
        self.edit(recipe_id, |recipe| {
            if limit == 0 {
                recipe.limits.result_groups.remove(group);
            } else {
                recipe.limits.result_groups.insert(group.to_string(), limit);
            }
            Ok(())
        })
        .await
    }

    // ========================================================================
    // Modifiers and categories
    // ========================================================================

    pub async fn add_modifier(&self, recipe_id: &str, modifier: Modifier) -> EditResult<CraftRecipe> {
        self.edit(recipe_id, |recipe| add(&mut recipe.modifiers, modifier))
            .await
    }

    pub async fn update_modifier(
        &self,
        recipe_id: &str,
        modifier: Modifier,
    ) -> EditResult<CraftRecipe> {
        self.edit(recipe_id, |recipe| replace(&mut recipe.modifiers, modifier))
            .await
    }

    pub async fn remove_modifier(
        &self,
        recipe_id: &str,
        modifier_id: &str,
    ) -> EditResult<CraftRecipe> {
        self.edit(recipe_id, |recipe| {
            remove(&mut recipe.modifiers, modifier_id).map(drop)
        })
        .await
    }

    /// `0` means unlimited.
    pub async fn set_modifier_limit(&self, recipe_id: &str, limit: u32) -> EditResult<CraftRecipe> {
        self.edit(recipe_id, |recipe| {
            recipe.limits.modifier_limit = limit;
            Ok(())
        })
        .await
    }

    /// Declares a category or changes its quota. `0` means unlimited.
    pub async fn set_category_limit(
        &self,
        recipe_id: &str,
        category: &str,
        limit: u32,
    ) -> EditResult<CraftRecipe> {
        self.edit(recipe_id, |recipe| {
            recipe.limits.categories.insert(category.to_string(), limit);
            Ok(())
        })
        .await
    }

    /// Removes a category that no modifier uses anymore.
    pub async fn remove_category(&self, recipe_id: &str, category: &str) -> EditResult<CraftRecipe> {
        self.edit(recipe_id, |recipe| {
            if let Some(modifier) = recipe
                .modifiers
                .iter()
                .find(|modifier| modifier.categories.contains(category))
            {
                return Err(EditError::CategoryInUse {
                    category: category.to_string(),
                    modifier: modifier.id.clone(),
                });
            }
            recipe
                .limits
                .categories
                .remove(category)
                .map(drop)
                .ok_or_else(|| EditError::UnknownEntry {
                    kind: "category",
                    id: category.to_string(),
                })
        })
        .await
    }

    pub async fn set_budget(&self, recipe_id: &str, budget: BudgetConfig) -> EditResult<CraftRecipe> {
        self.edit(recipe_id, |recipe| {
            recipe.budget = budget;
            Ok(())
        })
        .await
    }

    // ========================================================================
    // Aggregation rules
    // ========================================================================

    pub async fn add_rule(
        &self,
        recipe_id: &str,
        rule: ElementAggregationRule,
    ) -> EditResult<CraftRecipe> {
        self.edit(recipe_id, |recipe| add(&mut recipe.rules, rule)).await
    }

    pub async fn update_rule(
        &self,
        recipe_id: &str,
        rule: ElementAggregationRule,
    ) -> EditResult<CraftRecipe> {
        self.edit(recipe_id, |recipe| replace(&mut recipe.rules, rule))
            .await
    }

    pub async fn remove_rule(&self, recipe_id: &str, rule_id: &str) -> EditResult<CraftRecipe> {
        self.edit(recipe_id, |recipe| remove(&mut recipe.rules, rule_id).map(drop))
            .await
    }

    /// Moves a rule to `index` (clamped to the end). Earlier rules claim
    /// element ids first.
    pub async fn move_rule(
        &self,
        recipe_id: &str,
        rule_id: &str,
        index: usize,
    ) -> EditResult<CraftRecipe> {
        self.edit(recipe_id, |recipe| {
            let rule = remove(&mut recipe.rules, rule_id)?;
            let index = index.min(recipe.rules.len());
            recipe.rules.insert(index, rule);
            Ok(())
        })
        .await
    }
}
