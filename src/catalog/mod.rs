//! Catalog — read-only tables of essence blocks, value nodes and personas.
//!
//! # Architecture
//!
//! ```text
//! catalogs/default.yaml (embedded)  +  *.yaml / *.yml / *.json on disk
//!   ↓  CatalogLoader::load_all()
//! Catalog { blocks, values, personas }   validated, ids unique
//!   ↓  Arc<Catalog>
//! PromptComposer / HTTP handlers (never mutated)
//! ```

pub mod catalog_def;
pub mod error;
pub mod loader;

// Re-exports
pub use catalog_def::Catalog;
pub use error::CatalogError;
pub use loader::{builtin, CatalogLoader};
