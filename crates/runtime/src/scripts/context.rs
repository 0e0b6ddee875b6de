//! Parameter structs handed to scripts.

use std::collections::BTreeSet;

use craft_core::{ElementProfile, LockTarget, MaterialCounts, Modifier, ModifierId, RecipeId, SlotId};

use crate::craft::{Material, ResultDraft};
use crate::repository::InventoryItem;

/// Read-only view for an unlock predicate.
#[derive(Clone, Debug)]
pub struct UnlockContext {
    pub recipe: RecipeId,
    pub target: LockTarget,
    pub profile: ElementProfile,
    pub materials: MaterialCounts,
    pub filled_slots: BTreeSet<SlotId>,
}

/// Read-only view for a budget script.
#[derive(Clone, Debug)]
pub struct BudgetContext {
    pub recipe: RecipeId,
    pub profile: ElementProfile,
    pub materials: MaterialCounts,
}

#[derive(Clone, Debug)]
pub struct PreCraftContext {
    pub recipe: RecipeId,
    pub materials: Vec<Material>,
    pub results: Vec<ResultDraft>,
    pub chosen_modifiers: Vec<ModifierId>,
    /// Set to abort the craft right before committing.
    pub cancel: bool,
}

#[derive(Clone, Debug)]
pub struct ModifierContext {
    pub recipe: RecipeId,
    pub modifier: Modifier,
    pub materials: Vec<Material>,
    pub results: Vec<ResultDraft>,
}

#[derive(Clone, Debug)]
pub struct PostCraftContext {
    pub recipe: RecipeId,
    pub materials: Vec<Material>,
    pub created: Vec<InventoryItem>,
}
