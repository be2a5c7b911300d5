//! Persona engine — essence vectors compiled into system prompts, and model
//! replies scored against the same vectors.
//!
//! Everything here is pure and synchronous. Catalog data comes in read-only,
//! conversation length is passed in by the caller, nothing is persisted.
//!
//! # Architecture
//!
//! ```text
//! EssenceBlock (catalog) ──activate──→ ActiveEssenceBlock { vector, role, influence }
//!                                        │   WorkingSet: add / promote / demote / rebalance
//!                                        ↓
//! PersonaPreset ─┬─ IntimacyProfile  (κ from message count, disruption penalty)
//!                ├─ Scene / Trigger  (at most one fires, priority order)
//!                └─ value chain      (+ ≤ 2 triggered catalog values)
//!                                        ↓
//!                                 PromptComposer::compose → system prompt
//!                                        ↓  (external model call)
//!                                 evaluate(reply, blocks) → EvaluationResult
//! ```

pub mod block;
pub mod composer;
pub mod error;
pub mod evaluator;
pub mod instruction;
pub mod intimacy;
pub mod preset;
pub mod scene;
pub mod signals;
pub mod vector;
pub mod working_set;

// Re-exports
pub use block::{validate_blocks, ActiveEssenceBlock, BlockRole, EssenceBlock};
pub use composer::{PromptComposer, GUARDRAILS, STYLE_CONTRACT};
pub use error::{EngineError, Result};
pub use evaluator::{evaluate, EvaluationResult};
pub use instruction::{compile_block_instruction, AXIS_THRESHOLD, STRONG_THRESHOLD};
pub use intimacy::{kappa, DisruptionPenalty, IntimacyProfile, IntimacyState, ModeBand, Modulation};
pub use preset::{PersonaPreset, PersonaTrigger, ValueChainEntry, ValueNode};
pub use scene::{
    detect_triggered_values, select_directive, select_scene, Directive, IntensityTier, Scene,
    SceneSelection, SceneTiers,
};
pub use signals::StructuralSignal;
pub use vector::{Axis, EssenceProperties, OperatorType, Vector3};
pub use working_set::{WorkingSet, MAIN_INFLUENCE, MAX_SUPPORTERS, SUPPORTER_POOL};
