//! Script invocation with the catch-and-continue policy.

use std::sync::Arc;

use tracing::{debug, error};

use craft_core::ScriptRef;

use super::{
    BudgetContext, ModifierContext, PostCraftContext, PreCraftContext, ScriptError, ScriptHost,
    UnlockContext,
};
use crate::api::NotificationSink;

/// Generic message shown to the user; details go to the log.
const SCRIPT_FAILED: &str = "A crafting script failed. See the log for details.";

/// Runs scripts through a [`ScriptHost`] and absorbs their failures.
///
/// Every method returns what the script produced, or `None` / `false` when it
/// failed. Failed scripts leave their parameters untouched.
#[derive(Clone)]
pub struct ScriptRunner {
    host: Arc<dyn ScriptHost>,
    sink: Arc<dyn NotificationSink>,
}

impl ScriptRunner {
    pub fn new(host: Arc<dyn ScriptHost>, sink: Arc<dyn NotificationSink>) -> Self {
        Self { host, sink }
    }

    /// `None` means "no override": the entity keeps its static lock.
    pub async fn unlock(&self, script: &ScriptRef, ctx: &UnlockContext) -> Option<bool> {
        match self.host.unlock(script, ctx).await {
            Ok(truthy) => Some(truthy),
            Err(e) => {
                self.report("unlock", script, e);
                None
            }
        }
    }

    pub async fn budget(&self, script: &ScriptRef, ctx: &BudgetContext) -> Option<i32> {
        match self.host.budget(script, ctx).await {
            Ok(Some(max)) => Some(max),
            Ok(None) => {
                debug!(
                    target: "runtime::scripts",
                    script = script.name(),
                    "Budget script returned no number, keeping computed maximum"
                );
                None
            }
            Err(e) => {
                self.report("budget", script, e);
                None
            }
        }
    }

    /// Returns true if the script succeeded and its changes were kept.
    pub async fn pre_craft(&self, script: &ScriptRef, ctx: &mut PreCraftContext) -> bool {
        let mut working = ctx.clone();
        match self.host.pre_craft(script, &mut working).await {
            Ok(()) => {
                *ctx = working;
                true
            }
            Err(e) => {
                self.report("pre-craft", script, e);
                false
            }
        }
    }

    /// Returns true if the script succeeded and its changes were kept.
    pub async fn modifier(&self, script: &ScriptRef, ctx: &mut ModifierContext) -> bool {
        let mut working = ctx.clone();
        match self.host.modifier(script, &mut working).await {
            Ok(()) => {
                *ctx = working;
                true
            }
            Err(e) => {
                self.report("modifier", script, e);
                false
            }
        }
    }

    pub async fn post_craft(&self, script: &ScriptRef, ctx: &PostCraftContext) -> bool {
        match self.host.post_craft(script, ctx).await {
            Ok(()) => true,
            Err(e) => {
                self.report("post-craft", script, e);
                false
            }
        }
    }

    fn report(&self, site: &'static str, script: &ScriptRef, error: ScriptError) {
        error!(
            target: "runtime::scripts",
            site,
            script = script.name(),
            error = %error,
            "Script failed, continuing"
        );
        self.sink.error(SCRIPT_FAILED);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::RecordingSink;
    use crate::scripts::{NativeScripts, NoScripts};

    fn pre_craft_ctx() -> PreCraftContext {
        PreCraftContext {
            recipe: "forge".into(),
            materials: vec![],
            results: vec![],
            chosen_modifiers: vec!["edge".into()],
            cancel: false,
        }
    }

    #[tokio::test]
    async fn failing_script_keeps_pre_script_state() {
        let sink = Arc::new(RecordingSink::new());
        let scripts = NativeScripts::new().pre_craft("half-done", |ctx| {
            ctx.cancel = true;
            ctx.chosen_modifiers.clear();
            Err("boom".into())
        });
        let runner = ScriptRunner::new(Arc::new(scripts), sink.clone());

        let mut ctx = pre_craft_ctx();
        assert!(!runner.pre_craft(&ScriptRef::new("half-done"), &mut ctx).await);
        assert!(!ctx.cancel);
        assert_eq!(ctx.chosen_modifiers, vec!["edge".to_string()]);
        assert_eq!(sink.errors(), vec![SCRIPT_FAILED.to_string()]);
    }

    #[tokio::test]
    async fn successful_script_writes_back() {
        let sink = Arc::new(RecordingSink::new());
        let scripts = NativeScripts::new().pre_craft("veto", |ctx| {
            ctx.cancel = true;
            Ok(())
        });
        let runner = ScriptRunner::new(Arc::new(scripts), sink.clone());

        let mut ctx = pre_craft_ctx();
        assert!(runner.pre_craft(&ScriptRef::new("veto"), &mut ctx).await);
        assert!(ctx.cancel);
        assert!(sink.notifications().is_empty());
    }

    #[tokio::test]
    async fn missing_and_mismatched_scripts_are_reported() {
        let sink = Arc::new(RecordingSink::new());
        let scripts = NativeScripts::new().budget("double", |ctx| Ok(Some(ctx.profile.quantity("fire") * 2)));
        let host = Arc::new(scripts.clone());
        let runner = ScriptRunner::new(host.clone(), sink.clone());

        let budget = BudgetContext {
            recipe: "forge".into(),
            profile: Default::default(),
            materials: Default::default(),
        };
        assert_eq!(runner.budget(&ScriptRef::new("double"), &budget).await, Some(0));

        let mut ctx = pre_craft_ctx();
        assert!(!runner.pre_craft(&ScriptRef::new("double"), &mut ctx).await);
        assert_eq!(
            ScriptHost::pre_craft(&*host, &ScriptRef::new("double"), &mut ctx).await,
            Err(ScriptError::WrongKind {
                name: "double".into(),
                expected: "pre-craft"
            })
        );

        let none = ScriptRunner::new(Arc::new(NoScripts), sink.clone());
        assert_eq!(none.budget(&ScriptRef::new("double"), &budget).await, None);
        assert_eq!(sink.errors().len(), 2);
    }
}
