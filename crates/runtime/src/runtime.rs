//! High-level runtime entry point.
//!
//! The runtime owns the collaborators a craft needs and exposes a
//! builder-based API for clients to open sessions and edit recipes.

use std::sync::Arc;

use craft_core::EngineConfig;

use crate::api::{NotificationSink, Result, RuntimeError, TracingSink};
use crate::editor::RecipeEditor;
use crate::repository::{ConfigStore, InMemoryConfigStore, InventoryRepository};
use crate::scripts::{NoScripts, ScriptHost, ScriptRunner};
use crate::session::{SessionHandle, SessionKey, SessionManager, SessionMode};

/// Collaborators shared by sessions, crafts and the editor.
pub(crate) struct Services {
    pub config: EngineConfig,
    pub store: Arc<dyn ConfigStore>,
    pub inventory: Arc<dyn InventoryRepository>,
    pub scripts: ScriptRunner,
    pub sink: Arc<dyn NotificationSink>,
}

/// Main runtime that hosts crafting sessions.
///
/// Cheap to clone; clones share sessions and collaborators.
#[derive(Clone)]
pub struct CraftRuntime {
    services: Arc<Services>,
    sessions: Arc<SessionManager>,
}

impl CraftRuntime {
    pub fn builder() -> CraftRuntimeBuilder {
        CraftRuntimeBuilder::new()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.services.config
    }

    /// Open a session for a recipe, closing any session already open for the
    /// same recipe and mode.
    pub async fn open_session(&self, recipe_id: &str, mode: SessionMode) -> Result<SessionHandle> {
        self.sessions.open(recipe_id, mode).await
    }

    /// Returns true if a session was closed.
    pub async fn close_session(&self, recipe_id: &str, mode: SessionMode) -> bool {
        self.sessions
            .close_existing(&SessionKey::new(recipe_id, mode))
            .await
    }

    /// Returns the number of closed sessions.
    pub async fn close_all(&self) -> usize {
        self.sessions.close_all().await
    }

    pub fn sessions(&self) -> &SessionManager {
        &self.sessions
    }

    /// Editor whose saves are pushed into open sessions of the same recipe.
    pub fn editor(&self) -> RecipeEditor {
        RecipeEditor::new(self.services.clone(), Some(self.sessions.clone()))
    }
}

/// Builder for [`CraftRuntime`].
pub struct CraftRuntimeBuilder {
    config: EngineConfig,
    store: Option<Arc<dyn ConfigStore>>,
    inventory: Option<Arc<dyn InventoryRepository>>,
    scripts: Option<Arc<dyn ScriptHost>>,
    sink: Option<Arc<dyn NotificationSink>>,
}

impl CraftRuntimeBuilder {
    fn new() -> Self {
        Self {
            config: EngineConfig::default(),
            store: None,
            inventory: None,
            scripts: None,
            sink: None,
        }
    }

    /// Override engine configuration
    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the recipe store (default: empty in-memory store)
    pub fn store(mut self, store: Arc<dyn ConfigStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Set required inventory repository
    pub fn inventory(mut self, inventory: Arc<dyn InventoryRepository>) -> Self {
        self.inventory = Some(inventory);
        self
    }

    /// Set the script host (default: [`NoScripts`])
    pub fn scripts(mut self, scripts: Arc<dyn ScriptHost>) -> Self {
        self.scripts = Some(scripts);
        self
    }

    /// Set the notification sink (default: [`TracingSink`])
    pub fn sink(mut self, sink: Arc<dyn NotificationSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn build(self) -> Result<CraftRuntime> {
        let inventory = self.inventory.ok_or(RuntimeError::MissingInventory)?;
        let store = self
            .store
            .unwrap_or_else(|| Arc::new(InMemoryConfigStore::new()));
        let sink = self.sink.unwrap_or_else(|| Arc::new(TracingSink));
        let host = self.scripts.unwrap_or_else(|| Arc::new(NoScripts));

        let services = Arc::new(Services {
            config: self.config,
            store,
            inventory,
            scripts: ScriptRunner::new(host, sink.clone()),
            sink,
        });
        let sessions = Arc::new(SessionManager::new(services.clone()));

        Ok(CraftRuntime { services, sessions })
    }
}
