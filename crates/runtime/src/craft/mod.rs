//! Craft transaction orchestrator.
//!
//! A craft moves through a fixed sequence of phases:
//!
//! ```text
//! Idle → Validating → PreScript → PerModifierApply → BuildResults → Committing → Done
//!                                                                      ↘ Cancelled
//! ```
//!
//! Validation failures abort before any script runs. Unresolved references
//! and script cancellation are only acted on in `Committing`, before the first
//! mutation call.

mod commit;
mod draft;
mod effects;

pub use draft::{Material, ResultDraft};
pub use effects::apply_modifier;

use serde_json::json;
use tracing::{debug, info, warn};

use craft_core::{CraftRecipe, Modifier, ResultOverrides, Resolution, SessionState};

use crate::api::CraftError;
use crate::repository::InventoryItem;
use crate::runtime::Services;
use crate::scripts::{ModifierContext, PostCraftContext, PreCraftContext};
use commit::CommitPlan;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CraftPhase {
    Idle,
    Validating,
    PreScript,
    PerModifierApply,
    BuildResults,
    Committing,
    Done,
    Cancelled,
}

/// What a committed craft produced.
#[derive(Clone, Debug)]
pub struct CraftOutcome {
    pub created: Vec<InventoryItem>,
    /// Materials taken from their containers.
    pub consumed: Vec<Material>,
    /// Materials left untouched.
    pub kept: Vec<Material>,
    /// Rich-text summary that was posted.
    pub summary: String,
}

struct Transaction<'a> {
    services: &'a Services,
    recipe: &'a CraftRecipe,
    phase: CraftPhase,
}

impl Transaction<'_> {
    fn enter(&mut self, phase: CraftPhase) {
        debug!(
            target: "runtime::craft",
            recipe = %self.recipe.id,
            from = ?self.phase,
            to = ?phase,
            "Craft phase transition"
        );
        self.phase = phase;
    }

    fn abort_validation(&mut self, message: String) -> CraftError {
        warn!(target: "runtime::craft", recipe = %self.recipe.id, "{}", message);
        self.services.sink.warn(&message);
        self.enter(CraftPhase::Cancelled);
        CraftError::Validation(message)
    }
}

/// Runs one craft over a session snapshot.
///
/// The caller resets the session after success; on error nothing changed.
pub(crate) async fn run(
    services: &Services,
    recipe: &CraftRecipe,
    state: &SessionState,
    resolution: &Resolution,
) -> Result<CraftOutcome, CraftError> {
    let mut tx = Transaction {
        services,
        recipe,
        phase: CraftPhase::Idle,
    };

    // ------------------------------------------------------------------
    tx.enter(CraftPhase::Validating);
    let chosen: Vec<_> = state.chosen_result_items(recipe).collect();
    if chosen.is_empty() {
        return Err(tx.abort_validation("No result is chosen.".to_string()));
    }
    let missing = state.missing_necessary(recipe);
    if !missing.is_empty() {
        return Err(tx.abort_validation(format!(
            "Necessary slots are empty: {}.",
            missing.join(", ")
        )));
    }

    let mut unresolved = Vec::new();
    let mut materials = Vec::new();
    for slot in &recipe.slots {
        let Some(content) = state.filled.get(&slot.id) else {
            continue;
        };
        match services.inventory.resolve(&content.item).await? {
            Some(item) => materials.push(Material {
                slot: slot.id.clone(),
                item,
                quantity: content.quantity,
                consumed: slot.is_consumed,
            }),
            None => unresolved.push(format!("item `{}` in slot `{}`", content.item.id, slot.name)),
        }
    }
    let mut drafts = Vec::new();
    for (result_id, content) in chosen {
        match services.inventory.resolve(&content.item).await? {
            Some(item) => drafts.push(ResultDraft::new(result_id.clone(), item)),
            None => unresolved.push(format!("result item `{}`", content.item.id)),
        }
    }

    let modifiers: Vec<&Modifier> = resolution.chosen_in_order(recipe).collect();

    // ------------------------------------------------------------------
    tx.enter(CraftPhase::PreScript);
    let mut cancel = false;
    if let Some(script) = &recipe.scripts.pre_craft {
        let mut ctx = PreCraftContext {
            recipe: recipe.id.clone(),
            materials,
            results: drafts,
            chosen_modifiers: modifiers.iter().map(|m| m.id.clone()).collect(),
            cancel: false,
        };
        services.scripts.pre_craft(script, &mut ctx).await;
        materials = ctx.materials;
        drafts = ctx.results;
        cancel = ctx.cancel;
    }

    // ------------------------------------------------------------------
    tx.enter(CraftPhase::PerModifierApply);
    for modifier in &modifiers {
        if let Some(script) = &modifier.script {
            let mut ctx = ModifierContext {
                recipe: recipe.id.clone(),
                modifier: (*modifier).clone(),
                materials,
                results: drafts,
            };
            services.scripts.modifier(script, &mut ctx).await;
            materials = ctx.materials;
            drafts = ctx.results;
        }
        apply_modifier(modifier, recipe.effect_name(), &mut drafts);
    }

    // ------------------------------------------------------------------
    tx.enter(CraftPhase::BuildResults);
    for draft in &mut drafts {
        build_result(draft, &state.overrides, &modifiers, services.config.audit_trail);
    }

    // ------------------------------------------------------------------
    tx.enter(CraftPhase::Committing);
    if cancel {
        warn!(target: "runtime::craft", recipe = %recipe.id, "Craft cancelled by pre-craft script");
        services.sink.warn("Crafting was cancelled.");
        tx.enter(CraftPhase::Cancelled);
        return Err(CraftError::CancelledByScript);
    }

    let actor = state.actor.as_deref();
    let plan = CommitPlan::build(
        services.inventory.as_ref(),
        &services.config,
        actor,
        &materials,
        &drafts,
        &mut unresolved,
    )
    .await?;
    if !unresolved.is_empty() {
        let err = CraftError::Cancelled {
            missing: unresolved,
        };
        warn!(target: "runtime::craft", recipe = %recipe.id, error = %err, "Craft cancelled");
        services.sink.error(&err.to_string());
        tx.enter(CraftPhase::Cancelled);
        return Err(err);
    }
    let created = plan.execute(services.inventory.as_ref()).await?;

    let (consumed, kept): (Vec<_>, Vec<_>) = materials
        .into_iter()
        .partition(|material| actor.is_some() && material.consumed);
    let summary = summarize(recipe, &consumed, &kept, &created);
    services.sink.post(
        &summary,
        &json!({
            "recipe": recipe.id,
            "consumed": consumed.iter().map(|m| json!({ "item": m.item.id, "quantity": m.quantity })).collect::<Vec<_>>(),
            "kept": kept.iter().map(|m| m.item.id.clone()).collect::<Vec<_>>(),
            "created": created.iter().map(|item| item.id.clone()).collect::<Vec<_>>(),
        }),
    );

    // ------------------------------------------------------------------
    if let Some(script) = &recipe.scripts.post_craft {
        let ctx = PostCraftContext {
            recipe: recipe.id.clone(),
            materials: consumed.iter().chain(&kept).cloned().collect(),
            created: created.clone(),
        };
        services.scripts.post_craft(script, &ctx).await;
    }
    tx.enter(CraftPhase::Done);

    info!(
        target: "runtime::craft",
        recipe = %recipe.id,
        created = created.len(),
        consumed = consumed.len(),
        "Craft committed"
    );

    Ok(CraftOutcome {
        created,
        consumed,
        kept,
        summary,
    })
}

/// Applies display overrides, the audit trail and carry-over metadata.
fn build_result(
    draft: &mut ResultDraft,
    overrides: &ResultOverrides,
    modifiers: &[&Modifier],
    audit_trail: bool,
) {
    let item = &mut draft.item;
    if let Some(name) = &overrides.name {
        item.name = name.clone();
    }
    if let Some(img) = &overrides.img {
        item.img = img.clone();
    }
    if let Some(description) = &overrides.description {
        item.description = description.clone();
    }

    let fresh: Vec<&str> = modifiers
        .iter()
        .filter(|m| !draft.source.applied_modifiers.contains(&m.id))
        .map(|m| m.name.as_str())
        .collect();
    if audit_trail && !fresh.is_empty() {
        item.description
            .push_str(&format!("<p><em>{}</em></p>", fresh.join(", ")));
    }

    item.applied_modifiers
        .extend(modifiers.iter().map(|m| m.id.clone()));
}

fn summarize(
    recipe: &CraftRecipe,
    consumed: &[Material],
    kept: &[Material],
    created: &[InventoryItem],
) -> String {
    let list = |materials: &[Material]| {
        materials
            .iter()
            .map(|m| format!("<li>{} &times;{}</li>", m.item.name, m.quantity))
            .collect::<String>()
    };

    let mut html = format!("<h3>{}</h3>", recipe.name);
    if !consumed.is_empty() {
        html.push_str(&format!("<p>Consumed</p><ul>{}</ul>", list(consumed)));
    }
    if !kept.is_empty() {
        html.push_str(&format!("<p>Kept</p><ul>{}</ul>", list(kept)));
    }
    let results: String = created
        .iter()
        .map(|item| format!("<li>{}</li>", item.name))
        .collect();
    html.push_str(&format!("<p>Created</p><ul>{}</ul>", results));
    html
}
