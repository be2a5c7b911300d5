//! Model collaborator — the one async boundary.
//!
//! The engine hands a composed system prompt and the user's message to a
//! [`ModelClient`] and gets the raw reply back. Failures are surfaced to the
//! caller as-is: no retry, no fallback text.

pub mod client;

use async_trait::async_trait;
use thiserror::Error;

pub use client::{ModelConfig, OpenAiCompatClient};

/// Errors from the language model call.
#[derive(Debug, Error)]
pub enum ModelError {
    /// Transport failure, including timeouts.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider answered with a non-success status.
    #[error("Model API returned {status}: {body}")]
    Status { status: u16, body: String },

    /// The provider answered 2xx without usable content.
    #[error("Malformed model response: {0}")]
    Malformed(String),

    /// Client is not configured (e.g. no API key).
    #[error("Model not configured: {0}")]
    NotConfigured(String),
}

/// Something that turns a system prompt plus a user message into a reply.
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Single completion call.
    async fn complete(&self, system_prompt: &str, user_message: &str) -> Result<String, ModelError>;

    /// Model identifier, for logs.
    fn model_name(&self) -> &str;
}
