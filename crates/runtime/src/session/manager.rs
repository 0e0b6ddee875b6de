//! Registry of open sessions.

use std::collections::BTreeMap;
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, info};

use craft_core::CraftRecipe;

use super::{CraftingSession, SessionHandle, SessionKey, SessionMode};
use crate::api::{Result, RuntimeError};
use crate::runtime::Services;

/// Open sessions keyed by recipe and mode.
///
/// Each session sits behind its own mutex so actions on one session
/// serialize while different sessions proceed independently.
pub struct SessionManager {
    services: Arc<Services>,
    sessions: Mutex<BTreeMap<SessionKey, Arc<Mutex<CraftingSession>>>>,
}

impl SessionManager {
    pub(crate) fn new(services: Arc<Services>) -> Self {
        Self {
            services,
            sessions: Mutex::new(BTreeMap::new()),
        }
    }

    /// Loads the recipe and opens a fresh, refreshed session for it.
    ///
    /// A session already open under the same key is closed first.
    pub async fn open(&self, recipe_id: &str, mode: SessionMode) -> Result<SessionHandle> {
        let key = SessionKey::new(recipe_id, mode);
        self.close_existing(&key).await;

        let recipe = self
            .services
            .store
            .load(recipe_id)
            .await?
            .ok_or_else(|| RuntimeError::RecipeNotFound(recipe_id.to_string()))?;

        let mut session = CraftingSession::new(key.clone(), recipe);
        session.refresh(&self.services).await;
        let session = Arc::new(Mutex::new(session));

        self.sessions.lock().await.insert(key.clone(), session.clone());
        info!(target: "runtime::session", recipe = recipe_id, ?mode, "Session opened");

        Ok(SessionHandle::new(key, session, self.services.clone()))
    }

    /// Returns true if a session was open under `key`.
    pub async fn close_existing(&self, key: &SessionKey) -> bool {
        let closed = self.sessions.lock().await.remove(key).is_some();
        if closed {
            debug!(target: "runtime::session", recipe = %key.recipe, mode = ?key.mode, "Session closed");
        }
        closed
    }

    /// Returns the number of sessions closed.
    pub async fn close_all(&self) -> usize {
        let mut sessions = self.sessions.lock().await;
        let count = sessions.len();
        sessions.clear();
        if count > 0 {
            info!(target: "runtime::session", count, "All sessions closed");
        }
        count
    }

    pub async fn get(&self, key: &SessionKey) -> Option<SessionHandle> {
        let sessions = self.sessions.lock().await;
        sessions
            .get(key)
            .map(|session| SessionHandle::new(key.clone(), session.clone(), self.services.clone()))
    }

    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Swaps an edited recipe into every session open for it and refreshes
    /// them. Returns the number of sessions updated.
    pub async fn reload(&self, recipe: &CraftRecipe) -> usize {
        let open: Vec<_> = self
            .sessions
            .lock()
            .await
            .iter()
            .filter(|(key, _)| key.recipe == recipe.id)
            .map(|(_, session)| session.clone())
            .collect();

        for session in &open {
            let mut session = session.lock().await;
            session.recipe = recipe.clone();
            session.refresh(&self.services).await;
        }
        if !open.is_empty() {
            debug!(target: "runtime::session", recipe = %recipe.id, count = open.len(), "Sessions reloaded");
        }
        open.len()
    }
}
