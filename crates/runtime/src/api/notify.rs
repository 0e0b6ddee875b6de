//! User-facing notifications.
//!
//! The engine never talks to a UI directly. Warnings, errors and the craft
//! summary message go through a [`NotificationSink`] supplied by the host.
use std::sync::Mutex;

use serde_json::Value;

/// One notification as delivered to a sink.
#[derive(Clone, Debug, PartialEq)]
pub enum Notification {
    Warn(String),
    Error(String),
    /// A rich-text message with machine-readable metadata.
    Post { html: String, metadata: Value },
}

pub trait NotificationSink: Send + Sync {
    fn warn(&self, message: &str);

    fn error(&self, message: &str);

    fn post(&self, html: &str, metadata: &Value);
}

/// Routes notifications into `tracing`.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingSink;

impl NotificationSink for TracingSink {
    fn warn(&self, message: &str) {
        tracing::warn!(target: "runtime::notify", "{}", message);
    }

    fn error(&self, message: &str) {
        tracing::error!(target: "runtime::notify", "{}", message);
    }

    fn post(&self, html: &str, metadata: &Value) {
        tracing::info!(target: "runtime::notify", metadata = %metadata, "{}", html);
    }
}

/// Keeps every notification in memory; used by tests.
#[derive(Debug, Default)]
pub struct RecordingSink {
    notifications: Mutex<Vec<Notification>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.notifications
            .lock()
            .map(|notifications| notifications.clone())
            .unwrap_or_default()
    }

    pub fn warnings(&self) -> Vec<String> {
        self.notifications()
            .into_iter()
            .filter_map(|n| match n {
                Notification::Warn(message) => Some(message),
                _ => None,
            })
            .collect()
    }

    pub fn errors(&self) -> Vec<String> {
        self.notifications()
            .into_iter()
            .filter_map(|n| match n {
                Notification::Error(message) => Some(message),
                _ => None,
            })
            .collect()
    }

    fn record(&self, notification: Notification) {
        if let Ok(mut notifications) = self.notifications.lock() {
            notifications.push(notification);
        }
    }
}

impl NotificationSink for RecordingSink {
    fn warn(&self, message: &str) {
        self.record(Notification::Warn(message.to_string()));
    }

    fn error(&self, message: &str) {
        self.record(Notification::Error(message.to_string()));
    }

    fn post(&self, html: &str, metadata: &Value) {
        self.record(Notification::Post {
            html: html.to_string(),
            metadata: metadata.clone(),
        });
    }
}
