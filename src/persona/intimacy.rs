//! Intimacy Modulation — conversation length → κ → per-persona coefficients.
//!
//! The modulation pipeline:
//! ```text
//! messageCount ─→ κ = min(n / 30, 1) ─┬─ disruption? κ_eff = max(0, κ − c·intensity)
//!                                     └─ modulation m = a + b·κ_eff ─→ mode label + coefficient text
//! ```
//!
//! Coefficients are advisory text for the model, not enforced weights. The
//! disruption penalty lowers κ for the current turn only; nothing is stored.

use serde::{Deserialize, Serialize};

use super::error::{EngineError, Result};
use super::signals::disruption_intensity;

/// Message count at which κ saturates.
pub const KAPPA_SATURATION_MESSAGES: f32 = 30.0;

/// Intimacy scalar for a conversation length: `min(n / 30, 1)`.
pub fn kappa(message_count: u32) -> f32 {
    (message_count as f32 / KAPPA_SATURATION_MESSAGES).min(1.0)
}

// ============================================================================
// Persona-defined modulation
// ============================================================================

/// A labelled band of a modulation's coefficient range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModeBand {
    /// Lower bound (inclusive) of the coefficient for this mode.
    pub from: f32,
    /// Mode label shown in the prompt.
    pub label: String,
}

/// Linear modulation `m = a + b·κ` tied to one value node or scene family.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Modulation {
    /// Value node id or scene family this modulation colors.
    pub target: String,
    /// Trait name printed in the prompt (e.g. "playfulness").
    #[serde(rename = "trait")]
    pub trait_name: String,
    /// Intercept `a`.
    pub base: f32,
    /// Slope `b`.
    pub slope: f32,
    /// When set, the trait stays hidden until κ reaches this value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reveal_above: Option<f32>,
    /// Mode bands, any order.
    #[serde(default)]
    pub modes: Vec<ModeBand>,
}

impl Modulation {
    /// Coefficient at `kappa`, clamped into `[0, 1]`.
    pub fn coefficient(&self, kappa: f32) -> f32 {
        (self.base + self.slope * kappa).clamp(0.0, 1.0)
    }

    /// Whether the trait is visible at `kappa`.
    pub fn is_revealed(&self, kappa: f32) -> bool {
        self.reveal_above.map_or(true, |t| kappa >= t)
    }

    /// Label of the highest band whose lower bound the coefficient reaches.
    pub fn mode_label(&self, coefficient: f32) -> Option<&str> {
        self.modes
            .iter()
            .filter(|m| coefficient >= m.from)
            .max_by(|a, b| a.from.partial_cmp(&b.from).unwrap_or(std::cmp::Ordering::Equal))
            .map(|m| m.label.as_str())
    }
}

/// Penalty applied to κ when the input reads as tonal chaos.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisruptionPenalty {
    /// `c` in `penalty = c · intensity`.
    pub coefficient: f32,
    /// Persona-specific chaos keywords, on top of structural chaos markers.
    #[serde(default)]
    pub keywords: Vec<String>,
}

/// A persona's intimacy behavior.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntimacyProfile {
    #[serde(default)]
    pub modulations: Vec<Modulation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disruption: Option<DisruptionPenalty>,
}

impl IntimacyProfile {
    /// Reject thresholds outside `[0, 1]` and negative penalty coefficients.
    pub(crate) fn validate(&self, context: &str) -> Result<()> {
        for m in &self.modulations {
            if let Some(t) = m.reveal_above {
                if !t.is_finite() || !(0.0..=1.0).contains(&t) {
                    return Err(EngineError::validation(format!(
                        "{}.intimacy['{}'].revealAbove = {} is outside 0.0..1.0",
                        context, m.trait_name, t
                    )));
                }
            }
        }
        if let Some(penalty) = &self.disruption {
            if !penalty.coefficient.is_finite() || penalty.coefficient < 0.0 {
                return Err(EngineError::validation(format!(
                    "{}.intimacy.disruption.coefficient must be non-negative, got {}",
                    context, penalty.coefficient
                )));
            }
        }
        Ok(())
    }
}

// ============================================================================
// Evaluated state
// ============================================================================

/// Coarse familiarity stage derived from effective κ.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntimacyStage {
    Guarded,
    Familiar,
    Intimate,
}

impl IntimacyStage {
    fn from_kappa(kappa: f32) -> Self {
        if kappa < 0.34 {
            IntimacyStage::Guarded
        } else if kappa < 0.67 {
            IntimacyStage::Familiar
        } else {
            IntimacyStage::Intimate
        }
    }

    fn label(&self) -> &'static str {
        match self {
            IntimacyStage::Guarded => "guarded",
            IntimacyStage::Familiar => "familiar",
            IntimacyStage::Intimate => "intimate",
        }
    }
}

/// One modulation evaluated at the turn's effective κ.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModulatedCoefficient {
    pub target: String,
    pub trait_name: String,
    pub value: f32,
    pub mode: Option<String>,
}

/// Intimacy state for one turn.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IntimacyState {
    pub message_count: u32,
    /// κ from conversation length alone.
    pub kappa: f32,
    /// κ after the disruption penalty.
    pub effective_kappa: f32,
    /// Chaos intensity detected in this turn's input (0 without a penalty).
    pub disruption: f32,
    pub stage: IntimacyStage,
    /// Revealed modulations, in profile order.
    pub coefficients: Vec<ModulatedCoefficient>,
}

impl IntimacyProfile {
    /// Evaluate the profile for one turn.
    pub fn evaluate(&self, message_count: u32, input: &str) -> IntimacyState {
        let k = kappa(message_count);

        let (disruption, effective) = match &self.disruption {
            Some(penalty) => {
                let intensity = disruption_intensity(input, &penalty.keywords);
                let penalized = (k - penalty.coefficient * intensity).max(0.0);
                (intensity, penalized)
            }
            None => (0.0, k),
        };

        if disruption > 0.0 {
            tracing::debug!(
                kappa = k,
                effective_kappa = effective,
                disruption,
                "disruption penalty applied"
            );
        }

        let coefficients = self
            .modulations
            .iter()
            .filter(|m| m.is_revealed(effective))
            .map(|m| {
                let value = m.coefficient(effective);
                ModulatedCoefficient {
                    target: m.target.clone(),
                    trait_name: m.trait_name.clone(),
                    value,
                    mode: m.mode_label(value).map(str::to_string),
                }
            })
            .collect();

        IntimacyState {
            message_count,
            kappa: k,
            effective_kappa: effective,
            disruption,
            stage: IntimacyStage::from_kappa(effective),
            coefficients,
        }
    }
}

impl IntimacyState {
    /// Prompt lines describing this state.
    pub fn describe(&self) -> Vec<String> {
        let mut lines = vec![format!(
            "Intimacy: κ={:.2} ({}, {} messages exchanged)",
            self.effective_kappa,
            self.stage.label(),
            self.message_count,
        )];

        if self.disruption > 0.0 && self.effective_kappa < self.kappa {
            lines.push(format!(
                "Tonal disruption detected (intensity {:.2}): act less familiar than usual for this turn only.",
                self.disruption
            ));
        }

        for c in &self.coefficients {
            let mode = c
                .mode
                .as_deref()
                .map(|m| format!(" — mode: {}", m))
                .unwrap_or_default();
            lines.push(format!(
                "- {} [{}] coefficient {:.2}{}",
                c.trait_name, c.target, c.value, mode
            ));
        }

        lines
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn playful() -> Modulation {
        Modulation {
            target: "warmth".into(),
            trait_name: "playfulness".into(),
            base: 0.2,
            slope: 0.6,
            reveal_above: None,
            modes: vec![
                ModeBand { from: 0.0, label: "reserved".into() },
                ModeBand { from: 0.45, label: "teasing".into() },
            ],
        }
    }

    fn vulnerability() -> Modulation {
        Modulation {
            target: "ancient_loneliness".into(),
            trait_name: "vulnerability".into(),
            base: 0.0,
            slope: 1.0,
            reveal_above: Some(0.6),
            modes: vec![],
        }
    }

    #[test]
    fn test_kappa_fixed_points() {
        assert_eq!(kappa(0), 0.0);
        assert_eq!(kappa(15), 0.5);
        assert_eq!(kappa(30), 1.0);
        assert_eq!(kappa(60), 1.0);
    }

    #[test]
    fn test_kappa_non_decreasing() {
        let mut prev = kappa(0);
        for n in 1..100 {
            let k = kappa(n);
            assert!(k >= prev, "kappa({}) = {} < {}", n, k, prev);
            prev = k;
        }
    }

    #[test]
    fn test_linear_coefficient_and_modes() {
        let m = playful();
        assert!((m.coefficient(0.0) - 0.2).abs() < 1e-6);
        assert!((m.coefficient(1.0) - 0.8).abs() < 1e-6);
        assert_eq!(m.mode_label(m.coefficient(0.0)), Some("reserved"));
        assert_eq!(m.mode_label(m.coefficient(1.0)), Some("teasing"));
    }

    #[test]
    fn test_reveal_threshold_hides_trait() {
        let profile = IntimacyProfile {
            modulations: vec![playful(), vulnerability()],
            disruption: None,
        };
        let early = profile.evaluate(6, "hi");
        assert_eq!(early.coefficients.len(), 1);
        let late = profile.evaluate(24, "hi");
        assert_eq!(late.coefficients.len(), 2);
        assert_eq!(late.coefficients[1].trait_name, "vulnerability");
    }

    #[test]
    fn test_disruption_lowers_effective_kappa_floored() {
        let profile = IntimacyProfile {
            modulations: vec![playful()],
            disruption: Some(DisruptionPenalty {
                coefficient: 0.9,
                keywords: vec!["lol".into(), "whatever".into(), "random".into()],
            }),
        };
        let calm = profile.evaluate(30, "good evening");
        assert_eq!(calm.effective_kappa, 1.0);

        let chaotic = profile.evaluate(30, "lol whatever random");
        assert!((chaotic.effective_kappa - 0.1).abs() < 1e-5);
        assert_eq!(chaotic.kappa, 1.0);

        let early = profile.evaluate(3, "lol whatever random");
        assert_eq!(early.effective_kappa, 0.0);
    }

    #[test]
    fn test_validate_rejects_negative_disruption_coefficient() {
        let profile = IntimacyProfile {
            modulations: vec![playful()],
            disruption: Some(DisruptionPenalty {
                coefficient: -2.0,
                keywords: vec!["lol".into()],
            }),
        };
        assert!(matches!(
            profile.validate("persona 'k'"),
            Err(EngineError::Validation(ref msg)) if msg.contains("disruption.coefficient")
        ));

        let nan = IntimacyProfile {
            modulations: vec![],
            disruption: Some(DisruptionPenalty { coefficient: f32::NAN, keywords: vec![] }),
        };
        assert!(nan.validate("persona").is_err());
    }

    #[test]
    fn test_validate_reveal_threshold_range() {
        let mut hidden = vulnerability();
        hidden.reveal_above = Some(1.5);
        let profile = IntimacyProfile { modulations: vec![hidden], disruption: None };
        assert!(matches!(
            profile.validate("persona"),
            Err(EngineError::Validation(ref msg)) if msg.contains("revealAbove")
        ));

        let ok = IntimacyProfile {
            modulations: vec![playful(), vulnerability()],
            disruption: Some(DisruptionPenalty { coefficient: 0.0, keywords: vec![] }),
        };
        assert!(ok.validate("persona").is_ok());
    }

    #[test]
    fn test_describe_lines() {
        let profile = IntimacyProfile {
            modulations: vec![playful()],
            disruption: None,
        };
        let lines = profile.evaluate(15, "hello").describe();
        assert_eq!(lines[0], "Intimacy: κ=0.50 (familiar, 15 messages exchanged)");
        assert!(lines[1].contains("playfulness [warmth] coefficient 0.50 — mode: teasing"));
    }
}
