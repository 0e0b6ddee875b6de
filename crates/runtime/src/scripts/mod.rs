//! Script extension points.
//!
//! Recipes may name scripts for five call sites: unlock predicates, the budget
//! maximum, pre-craft, per-modifier and post-craft. A [`ScriptHost`] resolves
//! the names; the engine only sees typed parameter structs.
//!
//! # Error Policy
//!
//! Script failures never abort the surrounding operation. The
//! [`ScriptRunner`] logs them, sends a generic error notification and
//! continues with the state from before the script ran: each mutating script
//! works on a copy that is written back only on success.

mod context;
mod native;
mod runner;

pub use context::{BudgetContext, ModifierContext, PostCraftContext, PreCraftContext, UnlockContext};
pub use native::{NativeScripts, NoScripts};
pub use runner::ScriptRunner;

use async_trait::async_trait;
use thiserror::Error;

use craft_core::{CraftFailure, ErrorSeverity, ScriptRef};

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ScriptError {
    #[error("script `{0}` is not registered")]
    NotFound(String),

    #[error("script `{name}` can not run as a {expected} script")]
    WrongKind { name: String, expected: &'static str },

    #[error("script `{name}` failed: {message}")]
    Failed { name: String, message: String },
}

impl ScriptError {
    pub fn failed(script: &ScriptRef, message: impl Into<String>) -> Self {
        Self::Failed {
            name: script.name().to_string(),
            message: message.into(),
        }
    }
}

impl CraftFailure for ScriptError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Recoverable
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "SCRIPT_NOT_FOUND",
            Self::WrongKind { .. } => "SCRIPT_WRONG_KIND",
            Self::Failed { .. } => "SCRIPT_FAILED",
        }
    }
}

/// Host that runs named scripts, one method per call site.
///
/// Mutating call sites receive `&mut` parameters; the runner hands them a
/// working copy.
#[async_trait]
pub trait ScriptHost: Send + Sync {
    /// Truthiness of an unlock predicate.
    async fn unlock(&self, script: &ScriptRef, ctx: &UnlockContext) -> Result<bool, ScriptError>;

    /// A budget maximum, or `None` when the script produced no number.
    async fn budget(
        &self,
        script: &ScriptRef,
        ctx: &BudgetContext,
    ) -> Result<Option<i32>, ScriptError>;

    async fn pre_craft(
        &self,
        script: &ScriptRef,
        ctx: &mut PreCraftContext,
    ) -> Result<(), ScriptError>;

    async fn modifier(
        &self,
        script: &ScriptRef,
        ctx: &mut ModifierContext,
    ) -> Result<(), ScriptError>;

    async fn post_craft(&self, script: &ScriptRef, ctx: &PostCraftContext)
    -> Result<(), ScriptError>;
}
