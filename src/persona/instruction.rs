//! Instruction compiler — renders one activated block into directive text.
//!
//! # Example Output
//!
//! ```text
//! [Still Water] operator=transform | X=0.80 Y=0.10 Z=0.50 | influence=70%
//! Operator TRANSFORM: shift the base persona's state toward this vector while keeping its identity recognizable.
//! - X (Objectivity, strongly): observe facts with clinical precision
//! - Z (Essence, moderately): speak like still water under moonlight
//!   essence: temperature: cold (-0.4)
//! ```
//!
//! Axis values below [`AXIS_THRESHOLD`] are a dead zone: no line at all.

use super::block::ActiveEssenceBlock;
use super::vector::Axis;

/// Minimum axis value for a directive line to be emitted (inclusive).
pub const AXIS_THRESHOLD: f32 = 0.30;
/// Axis value at or above which a directive is labelled "strongly".
pub const STRONG_THRESHOLD: f32 = 0.70;

/// Compile a block into its directive text.
///
/// Pure; the output of one block never depends on any other block.
pub fn compile_block_instruction(block: &ActiveEssenceBlock) -> String {
    let mut lines = Vec::with_capacity(6);

    lines.push(format!(
        "[{}] operator={} | {} | influence={:.0}%",
        block.block.name,
        block.block.operator_type.tag(),
        block.vector,
        block.influence * 100.0,
    ));
    lines.push(block.block.operator_type.directive().to_string());

    for axis in Axis::ALL {
        if let Some(line) = axis_line(block, axis) {
            lines.push(line);
        }
    }

    lines.join("\n")
}

/// Directive line for one axis, or `None` inside the dead zone.
fn axis_line(block: &ActiveEssenceBlock, axis: Axis) -> Option<String> {
    let value = block.vector.get(axis);
    if value < AXIS_THRESHOLD {
        return None;
    }

    let mut line = format!(
        "- {} ({}, {}): {}",
        axis.tag(),
        axis.label(),
        strength_label(value),
        block.block.interpret(axis).trim(),
    );

    if axis == Axis::Z {
        let props = block.block.essence_properties.describe();
        if !props.is_empty() {
            line.push_str(&format!("\n  essence: {}", props.join(", ")));
        }
    }

    Some(line)
}

fn strength_label(value: f32) -> &'static str {
    if value >= STRONG_THRESHOLD {
        "strongly"
    } else {
        "moderately"
    }
}

// ============================================================================
// Tests
// ============================================================================
