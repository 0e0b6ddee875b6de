//! Eligibility evaluator.
//!
//! Decides, for the current refresh, which slots, result slots and modifiers
//! are locked. Persisted `is_locked` flags are never mutated; the outcome is
//! returned as a fresh [`LockTable`].

use std::collections::{BTreeMap, BTreeSet};

use crate::condition::ConditionContext;
use crate::recipe::{CraftRecipe, ScriptRef, UnlockPredicate};
use crate::requirement::IngredientRequirements;

/// Identifies one lockable entity of a recipe.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LockTarget {
    Slot(String),
    Result(String),
    Modifier(String),
}

impl LockTarget {
    pub fn id(&self) -> &str {
        match self {
            Self::Slot(id) | Self::Result(id) | Self::Modifier(id) => id,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Slot(_) => "slot",
            Self::Result(_) => "result",
            Self::Modifier(_) => "modifier",
        }
    }
}

impl core::fmt::Display for LockTarget {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}:{}", self.kind(), self.id())
    }
}

/// Results of script unlock predicates, resolved by the runtime before the
/// core evaluates locks. A missing entry means "no override".
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UnlockOverrides {
    truthy: BTreeMap<LockTarget, bool>,
}

impl UnlockOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, target: LockTarget, truthy: bool) {
        self.truthy.insert(target, truthy);
    }

    pub fn is_truthy(&self, target: &LockTarget) -> bool {
        self.truthy.get(target).copied().unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.truthy.len()
    }

    pub fn is_empty(&self) -> bool {
        self.truthy.is_empty()
    }
}

/// Locked entity ids for one refresh.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LockTable {
    locked: BTreeSet<LockTarget>,
}

impl LockTable {
    pub fn is_locked(&self, target: &LockTarget) -> bool {
        self.locked.contains(target)
    }

    pub fn slot_locked(&self, id: &str) -> bool {
        self.is_locked(&LockTarget::Slot(id.to_string()))
    }

    pub fn result_locked(&self, id: &str) -> bool {
        self.is_locked(&LockTarget::Result(id.to_string()))
    }

    pub fn modifier_locked(&self, id: &str) -> bool {
        self.is_locked(&LockTarget::Modifier(id.to_string()))
    }

    pub fn locked(&self) -> impl Iterator<Item = &LockTarget> {
        self.locked.iter()
    }
}

/// Script predicates that need resolving before [`evaluate_locks`] runs.
///
/// Only statically locked entities are listed: a predicate on an unlocked
/// entity can not change anything.
pub fn scripted_predicates(recipe: &CraftRecipe) -> Vec<(LockTarget, &ScriptRef)> {
    let slots = recipe
        .slots
        .iter()
        .map(|s| (LockTarget::Slot(s.id.clone()), s.is_locked, s.unlock.as_ref()));
    let results = recipe
        .results
        .iter()
        .map(|r| (LockTarget::Result(r.id.clone()), r.is_locked, r.unlock.as_ref()));
    let modifiers = recipe
        .modifiers
        .iter()
        .map(|m| (LockTarget::Modifier(m.id.clone()), m.is_locked, m.unlock.as_ref()));

    slots
        .chain(results)
        .chain(modifiers)
        .filter_map(|(target, is_locked, unlock)| match unlock {
            Some(UnlockPredicate::Script(script)) if is_locked && !script.is_empty() => {
                Some((target, script))
            }
            _ => None,
        })
        .collect()
}

/// Computes the lock state of every slot, result slot and modifier.
pub fn evaluate_locks(
    recipe: &CraftRecipe,
    ctx: &ConditionContext<'_>,
    overrides: &UnlockOverrides,
) -> LockTable {
    let mut locked = BTreeSet::new();

    for slot in &recipe.slots {
        let target = LockTarget::Slot(slot.id.clone());
        if is_locked(&target, slot.is_locked, slot.unlock.as_ref(), None, ctx, overrides) {
            locked.insert(target);
        }
    }

    for result in &recipe.results {
        let target = LockTarget::Result(result.id.clone());
        if is_locked(&target, result.is_locked, result.unlock.as_ref(), None, ctx, overrides) {
            locked.insert(target);
        }
    }

    for modifier in &recipe.modifiers {
        let target = LockTarget::Modifier(modifier.id.clone());
        if is_locked(
            &target,
            modifier.is_locked,
            modifier.unlock.as_ref(),
            Some(&modifier.requirements),
            ctx,
            overrides,
        ) {
            locked.insert(target);
        }
    }

    LockTable { locked }
}

fn is_locked(
    target: &LockTarget,
    static_lock: bool,
    unlock: Option<&UnlockPredicate>,
    requirements: Option<&IngredientRequirements>,
    ctx: &ConditionContext<'_>,
    overrides: &UnlockOverrides,
) -> bool {
    match unlock.filter(|predicate| !predicate.is_empty()) {
        Some(predicate) => static_lock && !is_truthy(target, predicate, ctx, overrides),
        None => {
            static_lock
                || requirements
                    .is_some_and(|requirements| !requirements.is_met(ctx.profile, ctx.materials))
        }
    }
}

fn is_truthy(
    target: &LockTarget,
    predicate: &UnlockPredicate,
    ctx: &ConditionContext<'_>,
    overrides: &UnlockOverrides,
) -> bool {
    match predicate {
        UnlockPredicate::Condition(condition) => condition.evaluate(ctx),
        UnlockPredicate::Script(_) => overrides.is_truthy(target),
    }
}
