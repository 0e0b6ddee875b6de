//! Cloneable façade over one open session.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, warn};

use craft_core::{
    CraftRecipe, ItemRef, Resolution, ResultContent, ResultOverrides, SessionState, SlotContent,
    Toggled,
};

use super::{CraftingSession, SessionKey, SessionMode};
use crate::api::{CraftError, Result};
use crate::craft::{self, CraftOutcome};
use crate::repository::{InventoryItem, RepositoryError};
use crate::runtime::Services;

/// Handle to an open session.
///
/// Every method locks the session for its whole duration, so actions issued
/// concurrently through clones of the same handle run one after another.
#[derive(Clone)]
pub struct SessionHandle {
    key: SessionKey,
    session: Arc<Mutex<CraftingSession>>,
    services: Arc<Services>,
}

impl SessionHandle {
    pub(crate) fn new(
        key: SessionKey,
        session: Arc<Mutex<CraftingSession>>,
        services: Arc<Services>,
    ) -> Self {
        Self {
            key,
            session,
            services,
        }
    }

    pub fn key(&self) -> &SessionKey {
        &self.key
    }

    pub async fn recipe(&self) -> CraftRecipe {
        self.session.lock().await.recipe.clone()
    }

    pub async fn state(&self) -> SessionState {
        self.session.lock().await.state.clone()
    }

    pub async fn resolution(&self) -> Resolution {
        self.session.lock().await.resolution.clone()
    }

    async fn resolve_item(&self, item: &ItemRef) -> Result<InventoryItem> {
        let resolved = self.services.inventory.resolve(item).await?;
        resolved.ok_or_else(|| {
            RepositoryError::NotFound {
                kind: "item",
                id: item.id.clone(),
            }
            .into()
        })
    }

    /// Places `quantity` of an item in an input slot.
    ///
    /// Returns what the slot held before.
    pub async fn fill_slot(
        &self,
        slot_id: &str,
        item: &ItemRef,
        quantity: i32,
    ) -> Result<Option<SlotContent>> {
        let item = self.resolve_item(item).await?;
        let content = SlotContent {
            item: item.item_ref(),
            name: item.name,
            material: item.material,
            quantity,
            elements: item.elements,
        };

        let mut guard = self.session.lock().await;
        let session = &mut *guard;
        let previous =
            session
                .state
                .fill_slot(&session.recipe, &session.resolution.locks, slot_id, content)?;
        session.refresh(&self.services).await;
        Ok(previous)
    }

    pub async fn empty_slot(&self, slot_id: &str) -> Option<SlotContent> {
        let mut session = self.session.lock().await;
        let previous = session.state.empty_slot(slot_id);
        if previous.is_some() {
            session.refresh(&self.services).await;
        }
        previous
    }

    /// Places an item in a result slot. Modifiers already applied to it are
    /// carried into the selection once the result is chosen.
    pub async fn set_result(&self, result_id: &str, item: &ItemRef) -> Result<Option<ResultContent>> {
        let item = self.resolve_item(item).await?;
        let content = ResultContent {
            item: item.item_ref(),
            name: item.name,
            applied: item.applied_modifiers,
        };

        let mut guard = self.session.lock().await;
        let session = &mut *guard;
        let previous = session.state.set_result(&session.recipe, result_id, content)?;
        session.refresh(&self.services).await;
        Ok(previous)
    }

    pub async fn clear_result(&self, result_id: &str) -> Option<ResultContent> {
        let mut session = self.session.lock().await;
        let previous = session.state.clear_result(result_id);
        if previous.is_some() {
            session.refresh(&self.services).await;
        }
        previous
    }

    pub async fn choose_result(&self, result_id: &str) -> Result<Toggled> {
        let mut guard = self.session.lock().await;
        let session = &mut *guard;
        let toggled =
            session
                .state
                .choose_result(&session.recipe, &session.resolution.locks, result_id)?;
        session.refresh(&self.services).await;
        Ok(toggled)
    }

    /// Toggles a discretionary modifier against the current budget.
    pub async fn choose_modifier(&self, modifier_id: &str) -> Result<Toggled> {
        let mut guard = self.session.lock().await;
        let session = &mut *guard;
        let toggled = session.resolution.budget.toggle(
            &session.recipe,
            &session.resolution.locks,
            modifier_id,
        )?;
        session.state.remember(&session.resolution);
        debug!(
            target: "runtime::session",
            recipe = %session.recipe.id,
            modifier = modifier_id,
            ?toggled,
            remaining = session.resolution.budget.budget.value,
            "Modifier toggled"
        );
        Ok(toggled)
    }

    pub async fn set_overrides(&self, overrides: ResultOverrides) {
        self.session.lock().await.state.overrides = overrides;
    }

    /// Binds the container materials are consumed from. `None` crafts
    /// into the holding location without consuming anything.
    pub async fn bind_actor(&self, actor: Option<String>) {
        self.session.lock().await.state.actor = actor;
    }

    /// Commits a craft and resets the session on success.
    pub async fn craft(&self) -> Result<CraftOutcome> {
        if self.key.mode != SessionMode::Craft {
            let message = "recipe is open for editing";
            warn!(target: "runtime::craft", recipe = %self.key.recipe, "{}", message);
            self.services.sink.warn(message);
            return Err(CraftError::Validation(message.to_string()).into());
        }

        let mut guard = self.session.lock().await;
        let session = &mut *guard;
        let outcome = craft::run(
            &self.services,
            &session.recipe,
            &session.state,
            &session.resolution,
        )
        .await?;

        session.state.reset();
        session.refresh(&self.services).await;
        Ok(outcome)
    }
}
