//! Deterministic crafting rules and data types.
//!
//! `craft-core` defines the configuration records (recipes, slots, modifiers,
//! aggregation rules) and the pure refresh pipeline that turns a session's
//! inputs into a [`Resolution`]: element aggregation, eligibility and budget
//! resolution. It performs no I/O; the runtime crate drives it.
pub mod budget;
pub mod condition;
pub mod config;
pub mod eligibility;
pub mod element;
pub mod error;
pub mod recipe;
pub mod requirement;
pub mod session;

pub use budget::{Budget, BudgetResolution, Toggled};
pub use condition::{Condition, ConditionContext};
pub use config::EngineConfig;
pub use eligibility::{LockTable, LockTarget, UnlockOverrides, evaluate_locks, scripted_predicates};
pub use element::{
    AggregationMode, Element, ElementAggregationRule, ElementProfile, MultiShow, MultiValue,
    Shape, ShownElement, Visibility, aggregate,
};
pub use error::{ConfigError, CraftFailure, ErrorSeverity, SelectionError};
pub use recipe::{
    AppliesAs, BudgetConfig, ChangeMode, ChangeValue, CraftRecipe, EffectChange, Modifier,
    ModifierId, RecipeId, RecipeScripts, ResultId, ResultSlot, ScriptRef, SelectionLimits, Slot,
    SlotAcceptance, SlotId, UnlockPredicate,
};
pub use requirement::{IngredientRequirements, MaterialCounts, Threshold};
pub use session::{ItemRef, ResultContent, ResultOverrides, Resolution, SessionState, SlotContent};
