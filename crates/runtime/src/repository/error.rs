//! Error types raised by repository implementations.

use thiserror::Error;

use craft_core::{CraftFailure, ErrorSeverity};

/// Errors surfaced by repository implementations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("repository lock was poisoned")]
    LockPoisoned,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("{kind} `{id}` not found")]
    NotFound { kind: &'static str, id: String },

    #[error("item `{item}` is not held by container `{container}`")]
    ContainerMismatch { item: String, container: String },

    #[error("`{0}` is not a valid recipe id")]
    InvalidId(String),
}

impl CraftFailure for RepositoryError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::NotFound { .. } | Self::ContainerMismatch { .. } | Self::InvalidId(_) => {
                ErrorSeverity::Internal
            }
            _ => ErrorSeverity::Fatal,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::LockPoisoned => "LOCK_POISONED",
            Self::Io(_) => "IO",
            Self::Serialization(_) => "SERIALIZATION",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::ContainerMismatch { .. } => "CONTAINER_MISMATCH",
            Self::InvalidId(_) => "INVALID_ID",
        }
    }
}

pub type Result<T> = std::result::Result<T, RepositoryError>;
