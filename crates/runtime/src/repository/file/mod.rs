//! File-based repository implementations.

mod config;

pub use config::FileConfigStore;
