//! Persona engine errors.

use thiserror::Error;

/// Errors raised by the persona engine on malformed input or invalid
/// working-set edits.
///
/// Empty-but-valid state (no blocks, no triggers, no keywords) is never an
/// error; those paths produce documented fallback outputs instead.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EngineError {
    /// A required field was absent or blank.
    #[error("Missing required field '{field}' in {context}")]
    MissingField {
        /// Field name.
        field: String,
        /// Where the field was expected.
        context: String,
    },

    /// A value was outside its documented domain.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The working set already holds the maximum number of blocks.
    #[error("Working set is full: {current} blocks active, limit {limit}")]
    CapacityExceeded {
        /// Blocks currently active.
        current: usize,
        /// Maximum allowed.
        limit: usize,
    },

    /// The block is already part of the working set.
    #[error("Block already active: {0}")]
    DuplicateBlock(String),

    /// The block is not part of the working set.
    #[error("Block not active: {0}")]
    BlockNotFound(String),
}

impl EngineError {
    /// Create a missing field error.
    pub fn missing_field(field: impl Into<String>, context: impl Into<String>) -> Self {
        EngineError::MissingField {
            field: field.into(),
            context: context.into(),
        }
    }

    /// Create a validation error.
    pub fn validation(msg: impl Into<String>) -> Self {
        EngineError::Validation(msg.into())
    }
}

/// Convenient Result alias for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_field_message() {
        let err = EngineError::missing_field("summary", "persona");
        assert_eq!(
            err.to_string(),
            "Missing required field 'summary' in persona"
        );
    }

    #[test]
    fn test_capacity_message() {
        let err = EngineError::CapacityExceeded { current: 4, limit: 4 };
        assert!(err.to_string().contains("limit 4"));
    }
}
