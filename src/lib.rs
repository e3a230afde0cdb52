//! Caravel - layered configuration for project environments and caches.
//!
//! This library provides the core functionality for the `cvl` CLI tool:
//! a settings tree seeded from a fixed default schema, deep-merged user
//! overrides, environment-variable overrides, per-setting normalization,
//! and `{key}` placeholder interpolation between settings.

pub mod cli;
pub mod commands;
pub mod config;

/// Library-level error type for Caravel operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid value '{value}' for setting '{name}'")]
    InvalidValue { name: String, value: String },

    #[error("circular configuration reference involving '{0}'")]
    CircularReference(String),

    #[error("configuration reference '{{{0}}}' has no value")]
    UnresolvedReference(String),

    #[error("unknown configuration key '{0}'")]
    UnknownKey(String),

    #[error("No caches found")]
    NoCachesFound,
}

/// Result type alias for Caravel operations.
pub type Result<T> = std::result::Result<T, Error>;
