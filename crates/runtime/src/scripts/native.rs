//! Script hosts backed by Rust code.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use craft_core::ScriptRef;

use super::{
    BudgetContext, ModifierContext, PostCraftContext, PreCraftContext, ScriptError, ScriptHost,
    UnlockContext,
};

type UnlockFn = dyn Fn(&UnlockContext) -> Result<bool, String> + Send + Sync;
type BudgetFn = dyn Fn(&BudgetContext) -> Result<Option<i32>, String> + Send + Sync;
type PreCraftFn = dyn Fn(&mut PreCraftContext) -> Result<(), String> + Send + Sync;
type ModifierFn = dyn Fn(&mut ModifierContext) -> Result<(), String> + Send + Sync;
type PostCraftFn = dyn Fn(&PostCraftContext) -> Result<(), String> + Send + Sync;

#[derive(Clone)]
enum NativeScript {
    Unlock(Arc<UnlockFn>),
    Budget(Arc<BudgetFn>),
    PreCraft(Arc<PreCraftFn>),
    Modifier(Arc<ModifierFn>),
    PostCraft(Arc<PostCraftFn>),
}

/// Registry of named Rust closures.
///
/// Closures return `Err(message)` to signal a script failure.
#[derive(Clone, Default)]
pub struct NativeScripts {
    scripts: HashMap<String, NativeScript>,
}

impl NativeScripts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn unlock(
        mut self,
        name: impl Into<String>,
        f: impl Fn(&UnlockContext) -> Result<bool, String> + Send + Sync + 'static,
    ) -> Self {
        self.scripts.insert(name.into(), NativeScript::Unlock(Arc::new(f)));
        self
    }

    pub fn budget(
        mut self,
        name: impl Into<String>,
        f: impl Fn(&BudgetContext) -> Result<Option<i32>, String> + Send + Sync + 'static,
    ) -> Self {
        self.scripts.insert(name.into(), NativeScript::Budget(Arc::new(f)));
        self
    }

    pub fn pre_craft(
        mut self,
        name: impl Into<String>,
        f: impl Fn(&mut PreCraftContext) -> Result<(), String> + Send + Sync + 'static,
    ) -> Self {
        self.scripts.insert(name.into(), NativeScript::PreCraft(Arc::new(f)));
        self
    }

    pub fn modifier(
        mut self,
        name: impl Into<String>,
        f: impl Fn(&mut ModifierContext) -> Result<(), String> + Send + Sync + 'static,
    ) -> Self {
        self.scripts.insert(name.into(), NativeScript::Modifier(Arc::new(f)));
        self
    }

    pub fn post_craft(
        mut self,
        name: impl Into<String>,
        f: impl Fn(&PostCraftContext) -> Result<(), String> + Send + Sync + 'static,
    ) -> Self {
        self.scripts.insert(name.into(), NativeScript::PostCraft(Arc::new(f)));
        self
    }

    pub fn len(&self) -> usize {
        self.scripts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scripts.is_empty()
    }

    fn find(&self, script: &ScriptRef) -> Result<&NativeScript, ScriptError> {
        self.scripts
            .get(script.name())
            .ok_or_else(|| ScriptError::NotFound(script.name().to_string()))
    }
}

fn wrong_kind(script: &ScriptRef, expected: &'static str) -> ScriptError {
    ScriptError::WrongKind {
        name: script.name().to_string(),
        expected,
    }
}

#[async_trait]
impl ScriptHost for NativeScripts {
    async fn unlock(&self, script: &ScriptRef, ctx: &UnlockContext) -> Result<bool, ScriptError> {
        match self.find(script)? {
            NativeScript::Unlock(f) => f(ctx).map_err(|e| ScriptError::failed(script, e)),
            _ => Err(wrong_kind(script, "unlock")),
        }
    }

    async fn budget(
        &self,
        script: &ScriptRef,
        ctx: &BudgetContext,
    ) -> Result<Option<i32>, ScriptError> {
        match self.find(script)? {
            NativeScript::Budget(f) => f(ctx).map_err(|e| ScriptError::failed(script, e)),
            _ => Err(wrong_kind(script, "budget")),
        }
    }

    async fn pre_craft(
        &self,
        script: &ScriptRef,
        ctx: &mut PreCraftContext,
    ) -> Result<(), ScriptError> {
        match self.find(script)? {
            NativeScript::PreCraft(f) => f(ctx).map_err(|e| ScriptError::failed(script, e)),
            _ => Err(wrong_kind(script, "pre-craft")),
        }
    }

    async fn modifier(
        &self,
        script: &ScriptRef,
        ctx: &mut ModifierContext,
    ) -> Result<(), ScriptError> {
        match self.find(script)? {
            NativeScript::Modifier(f) => f(ctx).map_err(|e| ScriptError::failed(script, e)),
            _ => Err(wrong_kind(script, "modifier")),
        }
    }

    async fn post_craft(
        &self,
        script: &ScriptRef,
        ctx: &PostCraftContext,
    ) -> Result<(), ScriptError> {
        match self.find(script)? {
            NativeScript::PostCraft(f) => f(ctx).map_err(|e| ScriptError::failed(script, e)),
            _ => Err(wrong_kind(script, "post-craft")),
        }
    }
}

/// Host with no scripts: every call reports [`ScriptError::NotFound`].
#[derive(Clone, Copy, Debug, Default)]
pub struct NoScripts;

#[async_trait]
impl ScriptHost for NoScripts {
    async fn unlock(&self, script: &ScriptRef, _ctx: &UnlockContext) -> Result<bool, ScriptError> {
        Err(ScriptError::NotFound(script.name().to_string()))
    }

    async fn budget(
        &self,
        script: &ScriptRef,
        _ctx: &BudgetContext,
    ) -> Result<Option<i32>, ScriptError> {
        Err(ScriptError::NotFound(script.name().to_string()))
    }

    async fn pre_craft(
        &self,
        script: &ScriptRef,
        _ctx: &mut PreCraftContext,
    ) -> Result<(), ScriptError> {
        Err(ScriptError::NotFound(script.name().to_string()))
    }

    async fn modifier(
        &self,
        script: &ScriptRef,
        _ctx: &mut ModifierContext,
    ) -> Result<(), ScriptError> {
        Err(ScriptError::NotFound(script.name().to_string()))
    }

    async fn post_craft(
        &self,
        script: &ScriptRef,
        _ctx: &PostCraftContext,
    ) -> Result<(), ScriptError> {
        Err(ScriptError::NotFound(script.name().to_string()))
    }
}
