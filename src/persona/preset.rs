//! Persona presets and the generic value catalog.
//!
//! A preset is immutable catalog data: the engine reads it, never writes it.
//! The only runtime field, [`ValueChainEntry::activated`], is ignored on input.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::error::{EngineError, Result};
use super::intimacy::IntimacyProfile;
use super::scene::Scene;
use super::vector::OperatorType;

/// Divisor applied to scene hits when a persona does not set its own.
pub const DEFAULT_SCENE_DIVISOR: f32 = 2.0;

/// One entry of a persona's value chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueChainEntry {
    pub id: String,
    pub name: String,
    /// Static priority strength in `[0, 1]`.
    pub weight: f32,
    /// Runtime-only; ignored on input.
    #[serde(default)]
    pub activated: bool,
}

/// A generic value node from the catalog, matched against user input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueNode {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub keywords: Vec<String>,
}

/// A keyword-conditioned reaction defined by a persona.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonaTrigger {
    /// Literal substrings; any one of them present fires the trigger.
    #[serde(default)]
    pub condition_keywords: Vec<String>,
    #[serde(default)]
    pub condition_desc: String,
    pub response_directive: String,
    #[serde(default = "default_operator")]
    pub preferred_operator: OperatorType,
}

fn default_operator() -> OperatorType {
    OperatorType::Transform
}

fn default_scene_divisor() -> f32 {
    DEFAULT_SCENE_DIVISOR
}

/// A persona: base tone, values, triggers, scenes and intimacy behavior.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonaPreset {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    /// Static base-tone description. Required; blank fails at compose time.
    #[serde(default, alias = "baseTone")]
    pub summary: String,
    #[serde(default)]
    pub value_chain: Vec<ValueChainEntry>,
    #[serde(default)]
    pub triggers: Vec<PersonaTrigger>,
    /// Scenes in priority order, highest first.
    #[serde(default)]
    pub scenes: Vec<Scene>,
    #[serde(default)]
    pub intimacy: IntimacyProfile,
    #[serde(default = "default_scene_divisor")]
    pub scene_divisor: f32,
}

impl PersonaPreset {
    /// A bare persona carrying only a summary, as sent by API callers.
    pub fn from_summary(summary: impl Into<String>) -> Self {
        Self {
            id: String::new(),
            name: String::new(),
            summary: summary.into(),
            value_chain: Vec::new(),
            triggers: Vec::new(),
            scenes: Vec::new(),
            intimacy: IntimacyProfile::default(),
            scene_divisor: DEFAULT_SCENE_DIVISOR,
        }
    }

    /// Display name, falling back to the id.
    pub fn display_name(&self) -> &str {
        if !self.name.trim().is_empty() {
            &self.name
        } else if !self.id.trim().is_empty() {
            &self.id
        } else {
            "Persona"
        }
    }

    /// Ids of the value-chain entries (the core set).
    pub fn core_value_ids(&self) -> HashSet<&str> {
        self.value_chain.iter().map(|v| v.id.as_str()).collect()
    }

    /// Value chain sorted by weight, heaviest first. Equal weights keep
    /// their chain order.
    pub fn core_values_by_weight(&self) -> Vec<&ValueChainEntry> {
        let mut values: Vec<&ValueChainEntry> = self.value_chain.iter().collect();
        values.sort_by(|a, b| {
            b.weight
                .partial_cmp(&a.weight)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        values
    }

    /// Check required fields and numeric ranges.
    pub fn validate(&self) -> Result<()> {
        let ctx = if self.id.is_empty() {
            "persona".to_string()
        } else {
            format!("persona '{}'", self.id)
        };
        if self.summary.trim().is_empty() {
            return Err(EngineError::missing_field("summary", ctx));
        }
        for v in &self.value_chain {
            if !v.weight.is_finite() || !(0.0..=1.0).contains(&v.weight) {
                return Err(EngineError::validation(format!(
                    "{}.valueChain['{}'].weight = {} is outside 0.0..1.0",
                    ctx, v.id, v.weight
                )));
            }
        }
        for t in &self.triggers {
            if t.response_directive.trim().is_empty() {
                return Err(EngineError::missing_field("responseDirective", format!("{} trigger", ctx)));
            }
        }
        if !self.scene_divisor.is_finite() || self.scene_divisor <= 0.0 {
            return Err(EngineError::validation(format!(
                "{}.sceneDivisor must be positive, got {}",
                ctx, self.scene_divisor
            )));
        }
        for scene in &self.scenes {
            scene.validate(&ctx)?;
        }
        self.intimacy.validate(&ctx)?;
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
