//! Common error infrastructure for craft-core.
//!
//! This module provides the shared classification used by every error type in
//! the workspace. Domain-specific errors (e.g. [`SelectionError`]) live next to
//! the operations that produce them; the runtime crate implements
//! [`CraftFailure`] for its own errors so callers can route all of them through
//! one notification policy.
//!
//! # Design Principles
//!
//! - **Type Safety**: Each operation family has its own error enum
//! - **Severity Classification**: Errors are categorized for recovery strategies
//! - **No Panics**: Rejections are values, never aborts of the hosting session

/// Severity level of an error, used for categorization and recovery strategies.
///
/// - **Recoverable**: the user can retry after changing the selection
/// - **Validation**: invalid input, rejected before any state change
/// - **Internal**: an inconsistency between configuration and live data
/// - **Fatal**: the session can not continue
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    /// Recoverable error - can retry with another choice.
    ///
    /// Examples: budget exhausted, category quota reached
    Recoverable,

    /// Validation error - invalid input, should not retry without changes.
    ///
    /// Examples: necessary slot empty, no result chosen
    Validation,

    /// Internal error - live data no longer matches the configuration.
    ///
    /// Examples: referenced item deleted, container no longer owned
    Internal,

    /// Fatal error - the session state is unusable.
    Fatal,
}

impl ErrorSeverity {
    /// Returns a human-readable description of this severity level.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Recoverable => "recoverable",
            Self::Validation => "validation",
            Self::Internal => "internal",
            Self::Fatal => "fatal",
        }
    }

    /// Returns true if this error is potentially recoverable.
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Recoverable)
    }

    /// Returns true if this error indicates an inconsistency that needs attention.
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal | Self::Fatal)
    }
}

/// Common trait for all crafting errors.
///
/// # Implementation Guidelines
///
/// - Use `#[derive(thiserror::Error)]` for Display/Error impl
/// - Classify severity based on recoverability, not impact
pub trait CraftFailure: core::fmt::Display + core::fmt::Debug {
    /// Returns the severity level of this error.
    fn severity(&self) -> ErrorSeverity;

    /// Returns a static string identifier for this error variant.
    fn error_code(&self) -> &'static str {
        core::any::type_name::<Self>()
    }
}

// ============================================================================
// Selection Errors
// ============================================================================

/// Rejections produced by the interactive session operations
/// (`choose_modifier`, `choose_result`, `fill_slot`).
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SelectionError {
    #[error("unknown modifier `{0}`")]
    UnknownModifier(String),

    #[error("unknown slot `{0}`")]
    UnknownSlot(String),

    #[error("unknown result slot `{0}`")]
    UnknownResult(String),

    #[error("`{0}` is locked")]
    Locked(String),

    #[error("modifier `{0}` is applied automatically or carried over and can not be toggled")]
    Immutable(String),

    #[error("modifier `{id}` costs {cost} but only {remaining} is left")]
    OverBudget { id: String, cost: i32, remaining: i32 },

    #[error("modifier limit of {limit} reached")]
    ModifierLimit { limit: u32 },

    #[error("category `{category}` already holds {limit} modifier(s)")]
    CategoryLimit { category: String, limit: u32 },

    #[error("result group `{group}` already holds {limit} result(s)")]
    ResultGroupLimit { group: String, limit: u32 },

    #[error("result slot `{0}` has no item")]
    EmptyResult(String),

    #[error("slot `{slot}` does not accept `{material}`")]
    NotAccepted { slot: String, material: String },
}

impl CraftFailure for SelectionError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::UnknownModifier(_) | Self::UnknownSlot(_) | Self::UnknownResult(_) => {
                ErrorSeverity::Internal
            }
            Self::Locked(_) | Self::Immutable(_) | Self::EmptyResult(_) | Self::NotAccepted { .. } => {
                ErrorSeverity::Validation
            }
            Self::OverBudget { .. }
            | Self::ModifierLimit { .. }
            | Self::CategoryLimit { .. }
            | Self::ResultGroupLimit { .. } => ErrorSeverity::Recoverable,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownModifier(_) => "UNKNOWN_MODIFIER",
            Self::UnknownSlot(_) => "UNKNOWN_SLOT",
            Self::UnknownResult(_) => "UNKNOWN_RESULT",
            Self::Locked(_) => "LOCKED",
            Self::Immutable(_) => "IMMUTABLE",
            Self::OverBudget { .. } => "OVER_BUDGET",
            Self::ModifierLimit { .. } => "MODIFIER_LIMIT",
            Self::CategoryLimit { .. } => "CATEGORY_LIMIT",
            Self::ResultGroupLimit { .. } => "RESULT_GROUP_LIMIT",
            Self::EmptyResult(_) => "EMPTY_RESULT",
            Self::NotAccepted { .. } => "NOT_ACCEPTED",
        }
    }
}

// ============================================================================
// Configuration Errors
// ============================================================================

/// Structural problems in a [`crate::CraftRecipe`] detected by
/// [`crate::CraftRecipe::validate`].
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("duplicate {kind} id `{id}`")]
    DuplicateId { kind: &'static str, id: String },

    #[error("{kind} id must not be empty")]
    EmptyId { kind: &'static str },

    #[error("aggregation rule `{0}` claims no element ids")]
    EmptyRule(String),

    #[error("recipe id `{0}` may only contain letters, digits, `-` and `_`")]
    InvalidRecipeId(String),
}

impl CraftFailure for ConfigError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Internal
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::DuplicateId { .. } => "DUPLICATE_ID",
            Self::EmptyId { .. } => "EMPTY_ID",
            Self::EmptyRule(_) => "EMPTY_RULE",
            Self::InvalidRecipeId(_) => "INVALID_RECIPE_ID",
        }
    }
}
