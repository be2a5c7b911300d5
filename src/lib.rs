//! # Persona Engine
//!
//! Persona vector synthesis and evaluation: compiles a base persona and a
//! weighted set of essence vectors into one system prompt for a language
//! model, then scores the model's reply against the same vectors.
//!
//! - [`persona`]: the pure core (blocks, instruction compiler, intimacy,
//!   scenes, composer, evaluator)
//! - [`catalog`]: read-only block / value / persona tables from YAML or JSON
//! - [`model`]: the async model collaborator
//! - [`server`]: axum HTTP surface

pub mod catalog;
pub mod model;
pub mod persona;
pub mod server;

pub use catalog::{Catalog, CatalogError, CatalogLoader};
pub use model::{ModelClient, ModelError};
pub use persona::{
    evaluate, ActiveEssenceBlock, EngineError, EssenceBlock, EvaluationResult, PersonaPreset,
    PromptComposer, WorkingSet,
};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
