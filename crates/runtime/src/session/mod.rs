//! Crafting sessions.
//!
//! A session is the non-persisted state of one crafting interaction: what sits
//! in the slots, which results and modifiers are chosen and the last
//! [`Resolution`]. Every user action ends with a refresh:
//!
//! ```text
//! script unlocks → budget script → aggregate → evaluate locks → resolve budget
//! ```

mod handle;
mod manager;

pub use handle::SessionHandle;
pub use manager::SessionManager;

use tracing::{debug, warn};

use craft_core::{
    AggregationMode, CraftRecipe, RecipeId, Resolution, SessionState, UnlockOverrides,
    scripted_predicates,
};

use crate::runtime::Services;
use crate::scripts::{BudgetContext, UnlockContext};

/// What a session is open for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SessionMode {
    Craft,
    /// Editing the recipe: every aggregation rule is shown.
    Edit,
}

/// At most one session is open per key.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SessionKey {
    pub recipe: RecipeId,
    pub mode: SessionMode,
}

impl SessionKey {
    pub fn new(recipe: impl Into<RecipeId>, mode: SessionMode) -> Self {
        Self {
            recipe: recipe.into(),
            mode,
        }
    }
}

#[derive(Clone, Debug)]
pub struct CraftingSession {
    key: SessionKey,
    recipe: CraftRecipe,
    state: SessionState,
    resolution: Resolution,
}

impl CraftingSession {
    pub(crate) fn new(key: SessionKey, recipe: CraftRecipe) -> Self {
        Self {
            key,
            recipe,
            state: SessionState::new(),
            resolution: Resolution::default(),
        }
    }

    pub fn key(&self) -> &SessionKey {
        &self.key
    }

    pub fn recipe(&self) -> &CraftRecipe {
        &self.recipe
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn resolution(&self) -> &Resolution {
        &self.resolution
    }

    fn aggregation_mode(&self, services: &Services) -> AggregationMode {
        if self.key.mode == SessionMode::Edit || services.config.always_show_elements {
            AggregationMode::Edit
        } else {
            AggregationMode::Craft
        }
    }

    /// Recomputes the resolution from the current state.
    ///
    /// Discretionary choices that no longer fit are dropped with a warning.
    pub(crate) async fn refresh(&mut self, services: &Services) {
        let profile = self
            .state
            .profile(&self.recipe, self.aggregation_mode(services));
        let materials = self.state.material_counts(&self.recipe);
        let filled_slots = self.state.filled_slot_ids();

        let mut overrides = UnlockOverrides::new();
        for (target, script) in scripted_predicates(&self.recipe) {
            let ctx = UnlockContext {
                recipe: self.recipe.id.clone(),
                target: target.clone(),
                profile: profile.clone(),
                materials: materials.clone(),
                filled_slots: filled_slots.clone(),
            };
            if let Some(truthy) = services.scripts.unlock(script, &ctx).await {
                overrides.set(target, truthy);
            }
        }

        let script_max = match &self.recipe.scripts.budget {
            Some(script) => {
                let ctx = BudgetContext {
                    recipe: self.recipe.id.clone(),
                    profile: profile.clone(),
                    materials,
                };
                services.scripts.budget(script, &ctx).await
            }
            None => None,
        };

        let resolution =
            Resolution::compute(&self.recipe, &self.state, profile, &overrides, script_max);
        if resolution.budget.cleared {
            warn!(
                target: "runtime::session",
                recipe = %self.recipe.id,
                remaining = resolution.budget.budget.value,
                "Chosen modifiers no longer fit, clearing them"
            );
            services
                .sink
                .warn("The chosen modifiers no longer fit and were cleared.");
        }
        debug!(
            target: "runtime::session",
            recipe = %self.recipe.id,
            locked = resolution.locks.locked().count(),
            chosen = resolution.budget.chosen.len(),
            budget = resolution.budget.budget.value,
            "Session refreshed"
        );

        self.state.remember(&resolution);
        self.resolution = resolution;
    }
}
