//! Essence blocks — catalog entries and their activated, user-tunable copies.

use serde::{Deserialize, Serialize};

use super::error::{EngineError, Result};
use super::vector::{Axis, EssenceProperties, OperatorType, Vector3};

// ============================================================================
// Catalog block
// ============================================================================

/// A reusable, named bundle of directive text and a default 3-axis weight
/// vector describing one facet of persona behavior.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EssenceBlock {
    /// Catalog identifier (e.g. `"still_water"`).
    pub id: String,
    /// Grouping used by catalog browsers.
    #[serde(default)]
    pub category: String,
    /// Human-readable name.
    pub name: String,
    /// Directive text for the Objectivity axis.
    #[serde(default)]
    pub interpret_x: String,
    /// Directive text for the Subjectivity axis.
    #[serde(default)]
    pub interpret_y: String,
    /// Directive text for the Essence axis.
    #[serde(default)]
    pub interpret_z: String,
    /// Vector a freshly activated copy starts from.
    #[serde(default)]
    pub default_vector: Vector3,
    /// Free-text keywords expected in a faithful reply.
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub essence_properties: EssenceProperties,
    #[serde(default = "default_operator")]
    pub operator_type: OperatorType,
}

fn default_operator() -> OperatorType {
    OperatorType::Transform
}

impl EssenceBlock {
    /// Directive text for an axis.
    pub fn interpret(&self, axis: Axis) -> &str {
        match axis {
            Axis::X => &self.interpret_x,
            Axis::Y => &self.interpret_y,
            Axis::Z => &self.interpret_z,
        }
    }

    /// Check identity fields and numeric ranges.
    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(EngineError::missing_field("id", "essence block"));
        }
        if self.name.trim().is_empty() {
            return Err(EngineError::missing_field(
                "name",
                format!("essence block '{}'", self.id),
            ));
        }
        let ctx = format!("block '{}'", self.id);
        self.default_vector
            .validate(&format!("{}.defaultVector", ctx))?;
        self.essence_properties
            .validate(&format!("{}.essenceProperties", ctx))?;
        Ok(())
    }
}

// ============================================================================
// Activated block
// ============================================================================

/// Role an activated block holds in a composition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockRole {
    /// Dominates tone.
    Main,
    /// Adds coloring.
    Supporter,
}

/// A catalog block activated in a working set.
///
/// `vector` starts as a copy of the block's default and is edited by sliders;
/// `influence` is assigned by the working set's rebalance step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveEssenceBlock {
    #[serde(flatten)]
    pub block: EssenceBlock,
    pub vector: Vector3,
    pub role: BlockRole,
    pub influence: f32,
}

impl ActiveEssenceBlock {
    /// Activate a catalog block with its default vector.
    pub fn activate(block: EssenceBlock, role: BlockRole, influence: f32) -> Self {
        let vector = block.default_vector;
        Self {
            block,
            vector,
            role,
            influence: influence.clamp(0.0, 1.0),
        }
    }

    /// Catalog identifier of the underlying block.
    pub fn id(&self) -> &str {
        &self.block.id
    }

    /// Whether this block holds the main role.
    pub fn is_main(&self) -> bool {
        self.role == BlockRole::Main
    }

    /// Check the block plus its activation state.
    pub fn validate(&self) -> Result<()> {
        self.block.validate()?;
        self.vector
            .validate(&format!("block '{}'.vector", self.block.id))?;
        if !self.influence.is_finite() || !(0.0..=1.0).contains(&self.influence) {
            return Err(EngineError::validation(format!(
                "block '{}'.influence = {} is outside 0.0..1.0",
                self.block.id, self.influence
            )));
        }
        Ok(())
    }
}

/// Validate a caller-supplied block list against the composition invariants:
/// every block well-formed, at most one main, at most three supporters.
pub fn validate_blocks(blocks: &[ActiveEssenceBlock]) -> Result<()> {
    for b in blocks {
        b.validate()?;
    }
    let mains = blocks.iter().filter(|b| b.is_main()).count();
    if mains > 1 {
        return Err(EngineError::validation(format!(
            "{} blocks claim the main role; at most one is allowed",
            mains
        )));
    }
    let supporters = blocks.len() - mains;
    if supporters > super::working_set::MAX_SUPPORTERS {
        return Err(EngineError::CapacityExceeded {
            current: blocks.len(),
            limit: super::working_set::MAX_ACTIVE_BLOCKS,
        });
    }
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================
