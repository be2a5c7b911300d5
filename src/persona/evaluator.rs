//! Response evaluator — scores a model reply against the blocks that shaped it.
//!
//! Three measurements, all lexical:
//!
//! - **conflictIndex**: share of expected block keywords missing from the reply
//! - **axisBreakdown**: which axes' directive words surfaced, weighted by
//!   influence × axis value and normalized to sum 1
//! - **vectorDistance**: cosine between the intended (influence-weighted)
//!   vector and the observed breakdown
//!
//! Paraphrase, negation and stylistic mimicry without literal overlap are
//! invisible here.

use serde::{Deserialize, Serialize};

use super::block::ActiveEssenceBlock;
use super::vector::{weighted_average, Axis, Vector3};

/// Result of scoring one reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationResult {
    /// `1 − matched/expected`, 0 when nothing is expected.
    pub conflict_index: f32,
    /// Cosine similarity of intended vs observed, in `[-1, 1]`.
    pub vector_distance: f32,
    /// Observed axis shares; sums to 1.
    pub axis_breakdown: Vector3,
    /// Expected keywords found in the reply, in first-seen order.
    pub matched_keywords: Vec<String>,
    pub total_expected_keywords: usize,
}

/// Score `response` against `blocks`.
pub fn evaluate(response: &str, blocks: &[ActiveEssenceBlock]) -> EvaluationResult {
    let lowered = response.to_lowercase();

    let expected = expected_keywords(blocks);
    let matched: Vec<String> = expected
        .iter()
        .filter(|k| lowered.contains(k.as_str()))
        .cloned()
        .collect();
    let conflict_index = if expected.is_empty() {
        0.0
    } else {
        (1.0 - matched.len() as f32 / expected.len() as f32).max(0.0)
    };

    let axis_breakdown = axis_breakdown(&lowered, blocks);
    let intended = weighted_average(blocks.iter().map(|b| (b.influence, &b.vector)));
    let vector_distance = intended.cosine_similarity(&axis_breakdown);

    tracing::debug!(
        conflict_index,
        vector_distance,
        matched = matched.len(),
        expected = expected.len(),
        "response evaluated"
    );

    EvaluationResult {
        conflict_index,
        vector_distance,
        axis_breakdown,
        matched_keywords: matched,
        total_expected_keywords: expected.len(),
    }
}

/// Union of block keywords, case-folded and deduplicated in first-seen order.
fn expected_keywords(blocks: &[ActiveEssenceBlock]) -> Vec<String> {
    let mut seen = Vec::new();
    for k in blocks.iter().flat_map(|b| b.block.keywords.iter()) {
        let k = k.trim().to_lowercase();
        if !k.is_empty() && !seen.contains(&k) {
            seen.push(k);
        }
    }
    seen
}

/// Significant words of a directive: Hangul syllables and ASCII letters kept,
/// everything else removed before splitting (`self-aware` → `selfaware`),
/// single-character tokens discarded.
pub fn significant_words(text: &str) -> Vec<String> {
    let cleaned: String = text
        .chars()
        .filter(|c| c.is_ascii_alphabetic() || ('가'..='힣').contains(c) || c.is_whitespace())
        .collect();
    cleaned
        .split_whitespace()
        .filter(|w| w.chars().count() > 1)
        .map(str::to_lowercase)
        .collect()
}

fn axis_breakdown(lowered_response: &str, blocks: &[ActiveEssenceBlock]) -> Vector3 {
    let mut acc = [0.0_f32; 3];

    for block in blocks {
        let hits: Vec<usize> = Axis::ALL
            .iter()
            .map(|axis| {
                significant_words(block.block.interpret(*axis))
                    .iter()
                    .filter(|w| lowered_response.contains(w.as_str()))
                    .count()
            })
            .collect();
        let total: usize = hits.iter().sum();
        if total == 0 {
            continue;
        }
        for (i, axis) in Axis::ALL.iter().enumerate() {
            let share = hits[i] as f32 / total as f32;
            acc[i] += block.influence * block.vector.get(*axis) * share;
        }
    }

    let sum: f32 = acc.iter().sum();
    if sum <= 0.0 {
        return Vector3::uniform_fallback();
    }
    Vector3 {
        x: acc[0] / sum,
        y: acc[1] / sum,
        z: acc[2] / sum,
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persona::block::tests::sample_block;
    use crate::persona::block::BlockRole;

    fn main_block() -> ActiveEssenceBlock {
        ActiveEssenceBlock::activate(sample_block("still"), BlockRole::Main, 0.7)
    }

    #[test]
    fn test_empty_blocks_fallback() {
        let result = evaluate("hello there", &[]);
        assert_eq!(result.conflict_index, 0.0);
        assert_eq!(result.axis_breakdown, Vector3::uniform_fallback());
        assert_eq!(result.total_expected_keywords, 0);
        assert_eq!(result.vector_distance, 0.0);
    }

    #[test]
    fn test_single_block_half_conflict() {
        let result = evaluate("I feel calm tonight.", &[main_block()]);
        assert_eq!(result.matched_keywords, vec!["calm".to_string()]);
        assert_eq!(result.total_expected_keywords, 2);
        assert!((result.conflict_index - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_conflict_non_increasing_in_matches() {
        let blocks = [main_block()];
        let none = evaluate("nothing relevant", &blocks).conflict_index;
        let one = evaluate("calm", &blocks).conflict_index;
        let both = evaluate("calm stillness", &blocks).conflict_index;
        assert!(none >= one && one >= both);
        assert_eq!(both, 0.0);
    }

    #[test]
    fn test_keywords_case_folded_and_deduplicated() {
        let mut a = sample_block("a");
        a.keywords = vec!["Calm".into(), "calm".into()];
        let mut b = sample_block("b");
        b.keywords = vec!["CALM".into(), "Storm".into()];
        let blocks = vec![
            ActiveEssenceBlock::activate(a, BlockRole::Main, 0.7),
            ActiveEssenceBlock::activate(b, BlockRole::Supporter, 0.3),
        ];
        let result = evaluate("A STORM is coming", &blocks);
        assert_eq!(result.total_expected_keywords, 2);
        assert_eq!(result.matched_keywords, vec!["storm".to_string()]);
    }

    #[test]
    fn test_significant_words() {
        assert_eq!(
            significant_words("Speak, like a 고요한 물-결!"),
            vec!["speak", "like", "고요한", "물결"]
        );
        assert_eq!(significant_words("self-aware, don't"), vec!["selfaware", "dont"]);
    }

    #[test]
    fn test_hyphenated_directive_word_needs_whole_match() {
        let mut block = sample_block("mirror");
        block.interpret_x = "self-aware".to_string();
        let blocks = [ActiveEssenceBlock::activate(block, BlockRole::Main, 0.7)];

        // "self" (inside "myself") and "aware" alone are not "selfaware"
        let result = evaluate("I am aware of myself", &blocks);
        assert_eq!(result.axis_breakdown, Vector3::uniform_fallback());

        let result = evaluate("Selfaware, always.", &blocks);
        assert!((result.axis_breakdown.x - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_axis_breakdown_accumulates_across_blocks() {
        let mut still = sample_block("still");
        still.interpret_x = "observe facts".to_string();
        still.interpret_y = "personal feeling".to_string();
        still.interpret_z = "still water".to_string();

        let mut ember = sample_block("ember");
        ember.interpret_x = "measure carefully".to_string();
        ember.interpret_y = "tender warmth".to_string();
        ember.interpret_z = "ember glow".to_string();
        ember.default_vector = Vector3::new(0.0, 1.0, 0.0);

        let blocks = [
            ActiveEssenceBlock::activate(still, BlockRole::Main, 0.7),
            ActiveEssenceBlock::activate(ember, BlockRole::Supporter, 0.3),
        ];
        let result = evaluate("I observe facts, still water, and tender warmth.", &blocks);

        // still: x and z share hits 2/2 -> x 0.7*0.8*0.5 = 0.28, z 0.7*0.5*0.5 = 0.175
        // ember: y takes all hits      -> y 0.3*1.0*1.0 = 0.30
        let total = 0.28 + 0.30 + 0.175;
        let b = result.axis_breakdown;
        assert!((b.x - 0.28 / total).abs() < 1e-5);
        assert!((b.y - 0.30 / total).abs() < 1e-5);
        assert!((b.z - 0.175 / total).abs() < 1e-5);
        assert!((b.sum() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_hits_on_zero_components_fall_back_to_uniform() {
        let mut block = sample_block("flat");
        block.default_vector = Vector3::new(0.0, 0.1, 0.5);
        let blocks = [ActiveEssenceBlock::activate(block, BlockRole::Main, 0.7)];

        // only X words surface, and X carries no weight
        let result = evaluate("observe facts", &blocks);
        assert_eq!(result.axis_breakdown, Vector3::uniform_fallback());
    }

    #[test]
    fn test_axis_breakdown_sums_to_one() {
        let reply = "I observe the facts with precision; still water under moonlight.";
        let result = evaluate(reply, &[main_block()]);
        let b = result.axis_breakdown;
        assert!((b.sum() - 1.0).abs() < 1e-5);
        // Y words ("personal", "feeling", ...) never appear
        assert_eq!(b.y, 0.0);
        assert!(b.x > 0.0 && b.z > 0.0);
        assert!((-1.0..=1.0).contains(&result.vector_distance));
        assert!(result.vector_distance > 0.9);
    }

    #[test]
    fn test_no_axis_hits_is_uniform() {
        let result = evaluate("zzz", &[main_block()]);
        assert_eq!(result.axis_breakdown, Vector3::uniform_fallback());
    }

    #[test]
    fn test_camel_case_result() {
        let json = serde_json::to_value(evaluate("calm", &[main_block()])).unwrap();
        assert!(json.get("conflictIndex").is_some());
        assert!(json.get("axisBreakdown").is_some());
        assert!(json.get("totalExpectedKeywords").is_some());
    }
}
