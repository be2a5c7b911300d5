//! Catalog errors.

use thiserror::Error;

use crate::persona::EngineError;

/// Errors that can occur while loading or querying a catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// YAML parsing or serialization failed.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON parsing or serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// File I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Catalog contents failed validation.
    #[error("Invalid catalog: {0}")]
    Validation(String),

    /// Lookup of an unknown id.
    #[error("{kind} not found: {id}")]
    NotFound {
        /// What was looked up ("persona", "block", ...).
        kind: &'static str,
        id: String,
    },
}

impl From<EngineError> for CatalogError {
    fn from(err: EngineError) -> Self {
        CatalogError::Validation(err.to_string())
    }
}
