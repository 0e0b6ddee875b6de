//! Public runtime API surface.
//!
//! This module gathers the types exposed to consumers of the runtime crate so
//! other layers can stay focused on orchestration or infrastructure.

pub mod errors;
pub mod notify;

pub use errors::{CraftError, EditError, Result, RuntimeError};
pub use notify::{Notification, NotificationSink, RecordingSink, TracingSink};
