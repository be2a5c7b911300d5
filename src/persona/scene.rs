//! Scene and trigger selection.
//!
//! ```text
//!            ┌────────────── first scene (priority order) with hits > 0 ──┐
//!  Idle ─────┤                                                             ├─→ Fired { tier, stage line }
//!            └── no scene: first persona trigger whose keywords match ────→ Trigger
//! ```
//!
//! Scenes are mutually exclusive: once one fires, every lower-priority scene
//! is suppressed even if it matched too. Selection is a single pass with no
//! backtracking and always produces a result.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::error::{EngineError, Result};
use super::preset::{PersonaPreset, PersonaTrigger, ValueNode};
use super::signals::{keyword_hits, structural_boost, StructuralSignal};

/// Maximum number of triggered values added beyond the core set.
pub const MAX_TRIGGERED_VALUES: usize = 2;

// ============================================================================
// Scene data
// ============================================================================

/// Intensity bucket of a fired scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntensityTier {
    Low,
    Mid,
    High,
}

impl IntensityTier {
    /// Bucket a clamped intensity: `<0.34` low, `<0.67` mid, else high.
    pub fn from_intensity(intensity: f32) -> Self {
        if intensity < 0.34 {
            IntensityTier::Low
        } else if intensity < 0.67 {
            IntensityTier::Mid
        } else {
            IntensityTier::High
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            IntensityTier::Low => "low",
            IntensityTier::Mid => "mid",
            IntensityTier::High => "high",
        }
    }

    /// Tiers to try, nearest first, when this tier has no lines.
    fn search_order(&self) -> [IntensityTier; 3] {
        match self {
            IntensityTier::Low => [IntensityTier::Low, IntensityTier::Mid, IntensityTier::High],
            IntensityTier::Mid => [IntensityTier::Mid, IntensityTier::Low, IntensityTier::High],
            IntensityTier::High => [IntensityTier::High, IntensityTier::Mid, IntensityTier::Low],
        }
    }
}

/// Stage-direction lines per intensity tier.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SceneTiers {
    #[serde(default)]
    pub low: Vec<String>,
    #[serde(default)]
    pub mid: Vec<String>,
    #[serde(default)]
    pub high: Vec<String>,
}

impl SceneTiers {
    pub fn lines(&self, tier: IntensityTier) -> &[String] {
        match tier {
            IntensityTier::Low => &self.low,
            IntensityTier::Mid => &self.mid,
            IntensityTier::High => &self.high,
        }
    }
}

/// A persona-specific situational state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scene {
    pub id: String,
    #[serde(default)]
    pub name: String,
    /// Scene family, matched by intimacy modulations.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub family: Option<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
    /// Structural signals that each add a bounded hit.
    #[serde(default)]
    pub boosts: Vec<StructuralSignal>,
    #[serde(default)]
    pub tiers: SceneTiers,
    /// Behavior instruction shown alongside the stage line.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub directive: Option<String>,
}

impl Scene {
    /// Display name, falling back to the id.
    pub fn display_name(&self) -> &str {
        if self.name.trim().is_empty() {
            &self.id
        } else {
            &self.name
        }
    }

    /// Keyword hits in the lower-cased input plus structural boosts.
    pub fn hits(&self, input: &str, lowered: &str) -> u32 {
        keyword_hits(lowered, &self.keywords) + structural_boost(&self.boosts, input)
    }

    /// Stage line for `tier`, indexed by the input's length in UTF-16 code
    /// units (an astral emoji counts as two).
    ///
    /// An empty tier falls back to the nearest non-empty one.
    pub fn stage_line(&self, tier: IntensityTier, input: &str) -> Option<&str> {
        let len = input.encode_utf16().count();
        tier.search_order()
            .into_iter()
            .map(|t| self.tiers.lines(t))
            .find(|lines| !lines.is_empty())
            .map(|lines| lines[len % lines.len()].as_str())
    }

    pub(crate) fn validate(&self, context: &str) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(EngineError::missing_field("id", format!("{} scene", context)));
        }
        Ok(())
    }
}

// ============================================================================
// Selection
// ============================================================================

/// A scene that fired for this input.
#[derive(Debug, Clone, PartialEq)]
pub struct FiredScene<'a> {
    pub scene: &'a Scene,
    pub hits: u32,
    /// `clamp(hits / divisor, 0, 1)`.
    pub intensity: f32,
    pub tier: IntensityTier,
    pub stage_line: Option<&'a str>,
}

/// Outcome of scene selection.
#[derive(Debug, Clone, PartialEq)]
pub enum SceneSelection<'a> {
    Idle,
    Fired(FiredScene<'a>),
}

impl<'a> SceneSelection<'a> {
    pub fn is_idle(&self) -> bool {
        matches!(self, SceneSelection::Idle)
    }
}

/// Select at most one scene from `scenes` (priority order).
pub fn select_scene<'a>(scenes: &'a [Scene], input: &str, divisor: f32) -> SceneSelection<'a> {
    let lowered = input.to_lowercase();
    let divisor = if divisor > 0.0 { divisor } else { super::preset::DEFAULT_SCENE_DIVISOR };

    for scene in scenes {
        let hits = scene.hits(input, &lowered);
        if hits == 0 {
            continue;
        }
        let intensity = (hits as f32 / divisor).clamp(0.0, 1.0);
        let tier = IntensityTier::from_intensity(intensity);
        tracing::debug!(
            scene = %scene.id,
            hits,
            intensity,
            tier = tier.label(),
            "scene fired"
        );
        return SceneSelection::Fired(FiredScene {
            scene,
            hits,
            intensity,
            tier,
            stage_line: scene.stage_line(tier, input),
        });
    }

    SceneSelection::Idle
}

/// The situational directive chosen for a turn.
#[derive(Debug, Clone, PartialEq)]
pub enum Directive<'a> {
    Scene(FiredScene<'a>),
    Trigger(&'a PersonaTrigger),
}

/// First persona trigger (list order) whose condition keywords appear in the input.
pub fn match_trigger<'a>(triggers: &'a [PersonaTrigger], input: &str) -> Option<&'a PersonaTrigger> {
    let lowered = input.to_lowercase();
    triggers
        .iter()
        .find(|t| keyword_hits(&lowered, &t.condition_keywords) > 0)
}

/// Scene if one fires, otherwise the first matching trigger.
pub fn select_directive<'a>(persona: &'a PersonaPreset, input: &str) -> Option<Directive<'a>> {
    match select_scene(&persona.scenes, input, persona.scene_divisor) {
        SceneSelection::Fired(fired) => Some(Directive::Scene(fired)),
        SceneSelection::Idle => match_trigger(&persona.triggers, input).map(Directive::Trigger),
    }
}

/// A catalog value node matched against the input.
#[derive(Debug, Clone, PartialEq)]
pub struct TriggeredValue<'a> {
    pub node: &'a ValueNode,
    pub hits: u32,
}

/// Up to two non-core value nodes with the most keyword hits.
///
/// Ties keep catalog order.
pub fn detect_triggered_values<'a>(
    values: &'a [ValueNode],
    core_ids: &HashSet<&str>,
    input: &str,
) -> Vec<TriggeredValue<'a>> {
    let lowered = input.to_lowercase();
    let mut hits: Vec<TriggeredValue<'a>> = values
        .iter()
        .filter(|v| !core_ids.contains(v.id.as_str()))
        .map(|node| TriggeredValue {
            node,
            hits: keyword_hits(&lowered, &node.keywords),
        })
        .filter(|t| t.hits > 0)
        .collect();
    // stable: equal hits stay in catalog order
    hits.sort_by(|a, b| b.hits.cmp(&a.hits));
    hits.truncate(MAX_TRIGGERED_VALUES);
    hits
}

// ============================================================================
// Tests
// ============================================================================
