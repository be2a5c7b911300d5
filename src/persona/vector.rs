//! Three-axis essence vectors and the bipolar essence properties that ride
//! along with them.
//!
//! ```text
//! Vector3 { x: Objectivity, y: Subjectivity, z: Essence }   each in [0, 1]
//! EssenceProperties { temperature, distance, density, speed, brightness }   each in [-1, 1]
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

use super::error::{EngineError, Result};

// ============================================================================
// Axis
// ============================================================================

/// One of the three essence axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    /// Objectivity.
    X,
    /// Subjectivity.
    Y,
    /// Essence.
    Z,
}

impl Axis {
    /// All axes in canonical order.
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    /// Human-readable axis name.
    pub fn label(&self) -> &'static str {
        match self {
            Axis::X => "Objectivity",
            Axis::Y => "Subjectivity",
            Axis::Z => "Essence",
        }
    }

    /// Short tag used in headers.
    pub fn tag(&self) -> &'static str {
        match self {
            Axis::X => "X",
            Axis::Y => "Y",
            Axis::Z => "Z",
        }
    }
}

// ============================================================================
// Vector3
// ============================================================================

/// Advisory weights on the Objectivity / Subjectivity / Essence axes.
///
/// Components live in `[0, 1]` and need not sum to 1.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vector3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vector3 {
    /// Create a vector, clamping every component into `[0, 1]`.
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self {
            x: clamp_unit(x),
            y: clamp_unit(y),
            z: clamp_unit(z),
        }
    }

    /// The uniform fallback used when no axis attribution is possible.
    pub fn uniform_fallback() -> Self {
        Self {
            x: 0.33,
            y: 0.33,
            z: 0.33,
        }
    }

    /// Component for an axis.
    pub fn get(&self, axis: Axis) -> f32 {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
            Axis::Z => self.z,
        }
    }

    /// Set a component, clamped into `[0, 1]`.
    pub fn set(&mut self, axis: Axis, value: f32) {
        let v = clamp_unit(value);
        match axis {
            Axis::X => self.x = v,
            Axis::Y => self.y = v,
            Axis::Z => self.z = v,
        }
    }

    /// Sum of the three components.
    pub fn sum(&self) -> f32 {
        self.x + self.y + self.z
    }

    /// Dot product.
    pub fn dot(&self, other: &Self) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    /// Euclidean magnitude.
    pub fn magnitude(&self) -> f32 {
        self.dot(self).sqrt()
    }

    /// Cosine similarity in `[-1, 1]`; 0 when either side has zero magnitude.
    pub fn cosine_similarity(&self, other: &Self) -> f32 {
        let denom = self.magnitude() * other.magnitude();
        if denom == 0.0 {
            return 0.0;
        }
        (self.dot(other) / denom).clamp(-1.0, 1.0)
    }

    /// Reject components outside `[0, 1]` or non-finite values.
    pub fn validate(&self, context: &str) -> Result<()> {
        for axis in Axis::ALL {
            let v = self.get(axis);
            if !v.is_finite() || !(0.0..=1.0).contains(&v) {
                return Err(EngineError::validation(format!(
                    "{}.{} = {} is outside 0.0..1.0",
                    context,
                    axis.tag().to_lowercase(),
                    v
                )));
            }
        }
        Ok(())
    }
}

impl fmt::Display for Vector3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "X={:.2} Y={:.2} Z={:.2}", self.x, self.y, self.z)
    }
}

fn clamp_unit(v: f32) -> f32 {
    if v.is_nan() {
        0.0
    } else {
        v.clamp(0.0, 1.0)
    }
}

/// Influence-weighted average of `(weight, vector)` pairs.
///
/// Returns the zero vector when the total weight is zero.
pub fn weighted_average<'a, I>(items: I) -> Vector3
where
    I: IntoIterator<Item = (f32, &'a Vector3)>,
{
    let mut acc = (0.0_f32, 0.0_f32, 0.0_f32);
    let mut total = 0.0_f32;
    for (w, v) in items {
        acc.0 += w * v.x;
        acc.1 += w * v.y;
        acc.2 += w * v.z;
        total += w;
    }
    if total == 0.0 {
        return Vector3::default();
    }
    Vector3 {
        x: acc.0 / total,
        y: acc.1 / total,
        z: acc.2 / total,
    }
}

// ============================================================================
// Essence properties
// ============================================================================

/// Bipolar sensory qualities of a block, each in `[-1, 1]` when defined.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct EssenceProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub density: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brightness: Option<f32>,
}

/// (property name, negative pole, positive pole)
const PROPERTY_POLES: [(&str, &str, &str); 5] = [
    ("temperature", "cold", "warm"),
    ("distance", "close", "distant"),
    ("density", "sparse", "dense"),
    ("speed", "slow", "fast"),
    ("brightness", "dark", "bright"),
];

impl EssenceProperties {
    /// Defined properties in canonical order as `(name, value)`.
    pub fn defined(&self) -> Vec<(&'static str, f32)> {
        let values = [
            self.temperature,
            self.distance,
            self.density,
            self.speed,
            self.brightness,
        ];
        PROPERTY_POLES
            .iter()
            .zip(values)
            .filter_map(|((name, _, _), v)| v.map(|v| (*name, v)))
            .collect()
    }

    /// Render each defined property as `name: label (value)`.
    ///
    /// Positive values take the positive pole, negative the negative pole,
    /// zero reads as "neutral".
    pub fn describe(&self) -> Vec<String> {
        self.defined()
            .into_iter()
            .map(|(name, v)| format!("{}: {} ({:.1})", name, pole_label(name, v), v))
            .collect()
    }

    /// Reject defined values outside `[-1, 1]`.
    pub fn validate(&self, context: &str) -> Result<()> {
        for (name, v) in self.defined() {
            if !v.is_finite() || !(-1.0..=1.0).contains(&v) {
                return Err(EngineError::validation(format!(
                    "{}.{} = {} is outside -1.0..1.0",
                    context, name, v
                )));
            }
        }
        Ok(())
    }
}

fn pole_label(name: &str, value: f32) -> &'static str {
    let (_, neg, pos) = PROPERTY_POLES
        .iter()
        .find(|(n, _, _)| *n == name)
        .copied()
        .unwrap_or(("", "negative", "positive"));
    if value > 0.0 {
        pos
    } else if value < 0.0 {
        neg
    } else {
        "neutral"
    }
}

// ============================================================================
// Operator type
// ============================================================================

/// How a block acts on the base persona.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperatorType {
    /// Shift the persona's state.
    Transform,
    /// Admit the behavior only when its condition holds.
    Gate,
    /// Intensify what is already there.
    Amplify,
    /// Take the persona apart and rebuild it.
    Restructure,
}

impl OperatorType {
    /// Tag used in block headers.
    pub fn tag(&self) -> &'static str {
        match self {
            OperatorType::Transform => "transform",
            OperatorType::Gate => "gate",
            OperatorType::Amplify => "amplify",
            OperatorType::Restructure => "restructure",
        }
    }

    /// Fixed directive sentence for this operator.
    pub fn directive(&self) -> &'static str {
        match self {
            OperatorType::Transform => {
                "Operator TRANSFORM: shift the base persona's state toward this vector while keeping its identity recognizable."
            }
            OperatorType::Gate => {
                "Operator GATE: admit this behavior only when the conversation satisfies its condition; otherwise hold it back."
            }
            OperatorType::Amplify => {
                "Operator AMPLIFY: intensify the traits the base persona already shows along this vector."
            }
            OperatorType::Restructure => {
                "Operator RESTRUCTURE: deconstruct the base persona's default framing and rebuild it around this vector."
            }
        }
    }
}

impl fmt::Display for OperatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

// ============================================================================
// Tests
// ============================================================================
