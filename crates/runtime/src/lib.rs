//! Runtime orchestration for the crafting engine.
//!
//! This crate wires the pure rules of `craft-core` to the outside world:
//! recipe stores, the inventory, scripts and notifications. Consumers embed
//! [`CraftRuntime`] to open sessions, craft and edit recipes.
//!
//! Modules are organized by responsibility:
//! - [`runtime`] hosts the entry point and builder
//! - [`api`] exposes errors and the notification sink
//! - [`session`] keeps per-recipe interactive state and refreshes it
//! - [`craft`] runs the craft transaction
//! - [`editor`] edits recipe records in place
//! - [`scripts`] and [`repository`] abstract the collaborators
pub mod api;
pub mod craft;
pub mod editor;
pub mod repository;
pub mod runtime;
pub mod scripts;
pub mod session;

pub use api::{
    CraftError, EditError, Notification, NotificationSink, RecordingSink, Result, RuntimeError,
    TracingSink,
};
pub use craft::{CraftOutcome, CraftPhase, Material, ResultDraft};
pub use editor::RecipeEditor;
pub use repository::{
    ConfigStore, Container, EffectRecord, FileConfigStore, InMemoryConfigStore, InMemoryInventory,
    InventoryCall, InventoryItem, InventoryRepository, ItemUpdate, RepositoryError,
};
pub use runtime::{CraftRuntime, CraftRuntimeBuilder};
pub use scripts::{NativeScripts, NoScripts, ScriptError, ScriptHost, ScriptRunner};
pub use session::{CraftingSession, SessionHandle, SessionKey, SessionManager, SessionMode};
