//! Unified error types surfaced by the runtime API.
//!
//! Wraps failures from repositories, scripts, crafting and recipe editing so
//! clients can bubble them up with consistent context.
use thiserror::Error;

use craft_core::{ConfigError, CraftFailure, ErrorSeverity, SelectionError};

pub use crate::repository::RepositoryError;
pub use crate::scripts::ScriptError;

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error(transparent)]
    Craft(#[from] CraftError),

    #[error(transparent)]
    Edit(#[from] EditError),

    #[error(transparent)]
    Selection(#[from] SelectionError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error("recipe `{0}` not found")]
    RecipeNotFound(String),

    #[error("runtime requires an inventory repository before building")]
    MissingInventory,
}

impl CraftFailure for RuntimeError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Craft(e) => e.severity(),
            Self::Edit(e) => e.severity(),
            Self::Selection(e) => e.severity(),
            Self::Repository(e) => e.severity(),
            Self::RecipeNotFound(_) => ErrorSeverity::Validation,
            Self::MissingInventory => ErrorSeverity::Fatal,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::Craft(e) => e.error_code(),
            Self::Edit(e) => e.error_code(),
            Self::Selection(e) => e.error_code(),
            Self::Repository(e) => e.error_code(),
            Self::RecipeNotFound(_) => "RECIPE_NOT_FOUND",
            Self::MissingInventory => "MISSING_INVENTORY",
        }
    }
}

/// Failures of a craft transaction. None of them leaves a partial mutation.
#[derive(Debug, Error)]
pub enum CraftError {
    /// Pre-flight checks failed; nothing was touched.
    #[error("cannot craft: {0}")]
    Validation(String),

    /// Referenced items or containers disappeared since they were placed.
    #[error("craft cancelled, unresolved references: {}", missing.join(", "))]
    Cancelled { missing: Vec<String> },

    /// The pre-craft script set the cancel flag.
    #[error("craft cancelled by script")]
    CancelledByScript,

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl CraftFailure for CraftError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Validation(_) => ErrorSeverity::Validation,
            Self::Cancelled { .. } => ErrorSeverity::Internal,
            Self::CancelledByScript => ErrorSeverity::Recoverable,
            Self::Repository(e) => e.severity(),
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "CRAFT_VALIDATION",
            Self::Cancelled { .. } => "CRAFT_CANCELLED",
            Self::CancelledByScript => "CRAFT_CANCELLED_BY_SCRIPT",
            Self::Repository(e) => e.error_code(),
        }
    }
}

/// Configuration inconsistencies detected while editing a recipe.
#[derive(Debug, Error)]
pub enum EditError {
    #[error("recipe `{0}` not found")]
    RecipeNotFound(String),

    #[error("{kind} `{id}` does not exist")]
    UnknownEntry { kind: &'static str, id: String },

    #[error("{kind} `{id}` already exists")]
    DuplicateEntry { kind: &'static str, id: String },

    #[error("category `{category}` is still used by modifier `{modifier}`")]
    CategoryInUse { category: String, modifier: String },

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl CraftFailure for EditError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Repository(e) => e.severity(),
            _ => ErrorSeverity::Validation,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::RecipeNotFound(_) => "RECIPE_NOT_FOUND",
            Self::UnknownEntry { .. } => "UNKNOWN_ENTRY",
            Self::DuplicateEntry { .. } => "DUPLICATE_ENTRY",
            Self::CategoryInUse { .. } => "CATEGORY_IN_USE",
            Self::Config(e) => e.error_code(),
            Self::Repository(e) => e.error_code(),
        }
    }
}
