//! Structural signals — keyword-independent patterns read off the raw input.
//!
//! Scenes use them as bounded hit boosts; the intimacy modulator uses the
//! chaos subset to measure tonal disruption.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static ELLIPSIS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\.{3,}|…").expect("ellipsis pattern is valid"));
static EXCLAMATION_CLUSTER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[!！]{2,}").expect("exclamation pattern is valid"));
static QUESTION_CLUSTER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[?？]{2,}").expect("question pattern is valid"));

/// Hit increment contributed by one matched structural signal.
pub const STRUCTURAL_BOOST: u32 = 1;

/// Chaos markers needed for full disruption intensity.
const CHAOS_SATURATION: f32 = 3.0;
/// Identical characters in a row that read as keyboard mashing.
const MASH_RUN: usize = 6;

/// A structural pattern in the user's message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StructuralSignal {
    /// Two or more ellipses (`...` or `…`).
    RepeatedEllipsis,
    /// A run of two or more exclamation marks.
    ExclamationCluster,
    /// A run of two or more question marks.
    QuestionCluster,
    /// Three or more emoji, or emoji making up a fifth of the visible text.
    EmojiDensity,
    /// Six or more identical characters in a row.
    KeyboardMash,
    /// Mostly upper-case Latin text.
    Shouting,
}

impl StructuralSignal {
    /// Signals that count toward tonal disruption.
    pub const CHAOS: [StructuralSignal; 3] = [
        StructuralSignal::KeyboardMash,
        StructuralSignal::Shouting,
        StructuralSignal::EmojiDensity,
    ];

    /// Whether this signal is present in `input`.
    pub fn detect(&self, input: &str) -> bool {
        match self {
            StructuralSignal::RepeatedEllipsis => ELLIPSIS.find_iter(input).count() >= 2,
            StructuralSignal::ExclamationCluster => EXCLAMATION_CLUSTER.is_match(input),
            StructuralSignal::QuestionCluster => QUESTION_CLUSTER.is_match(input),
            StructuralSignal::EmojiDensity => emoji_dense(input),
            StructuralSignal::KeyboardMash => longest_run(input) >= MASH_RUN,
            StructuralSignal::Shouting => shouting(input),
        }
    }
}

/// Total boost from `signals`, each contributing at most [`STRUCTURAL_BOOST`].
pub fn structural_boost(signals: &[StructuralSignal], input: &str) -> u32 {
    signals
        .iter()
        .filter(|s| s.detect(input))
        .count() as u32
        * STRUCTURAL_BOOST
}

/// Count literal keyword hits in an already lower-cased input.
///
/// Each keyword counts once no matter how often it appears.
pub fn keyword_hits(lowered_input: &str, keywords: &[String]) -> u32 {
    keywords
        .iter()
        .map(|k| k.trim().to_lowercase())
        .filter(|k| !k.is_empty() && lowered_input.contains(k.as_str()))
        .count() as u32
}

/// Disruption intensity in `[0, 1]` from chaos keywords plus chaos markers.
pub fn disruption_intensity(input: &str, chaos_keywords: &[String]) -> f32 {
    let lowered = input.to_lowercase();
    let markers = StructuralSignal::CHAOS
        .iter()
        .filter(|s| s.detect(input))
        .count() as u32;
    let hits = keyword_hits(&lowered, chaos_keywords) + markers;
    (hits as f32 / CHAOS_SATURATION).clamp(0.0, 1.0)
}

fn is_emoji(c: char) -> bool {
    matches!(c as u32,
        0x1F300..=0x1FAFF
        | 0x1F000..=0x1F2FF
        | 0x2600..=0x27BF)
}

fn emoji_dense(input: &str) -> bool {
    let visible = input.chars().filter(|c| !c.is_whitespace()).count();
    let emoji = input.chars().filter(|c| is_emoji(*c)).count();
    emoji >= 3 || (emoji >= 2 && visible > 0 && emoji as f32 / visible as f32 >= 0.2)
}

fn longest_run(input: &str) -> usize {
    let mut best = 0;
    let mut run = 0;
    let mut prev: Option<char> = None;
    for c in input.chars() {
        if c.is_whitespace() {
            prev = None;
            run = 0;
            continue;
        }
        if Some(c) == prev {
            run += 1;
        } else {
            run = 1;
            prev = Some(c);
        }
        best = best.max(run);
    }
    best
}

fn shouting(input: &str) -> bool {
    let letters: Vec<char> = input.chars().filter(|c| c.is_ascii_alphabetic()).collect();
    if letters.len() < 8 {
        return false;
    }
    let upper = letters.iter().filter(|c| c.is_ascii_uppercase()).count();
    upper as f32 / letters.len() as f32 >= 0.8
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repeated_ellipsis() {
        assert!(StructuralSignal::RepeatedEllipsis.detect("well... I guess…"));
        assert!(!StructuralSignal::RepeatedEllipsis.detect("well... fine"));
    }

    #[test]
    fn test_clusters() {
        assert!(StructuralSignal::ExclamationCluster.detect("let's go!!"));
        assert!(!StructuralSignal::ExclamationCluster.detect("go! go!"));
        assert!(StructuralSignal::QuestionCluster.detect("really??"));
    }

    #[test]
    fn test_emoji_density() {
        assert!(StructuralSignal::EmojiDensity.detect("🔥🔥🔥"));
        assert!(StructuralSignal::EmojiDensity.detect("hi 😀😀"));
        assert!(!StructuralSignal::EmojiDensity.detect("a long sentence with one 😀 in it"));
    }

    #[test]
    fn test_keyboard_mash_and_shouting() {
        assert!(StructuralSignal::KeyboardMash.detect("aaaaaaaa what"));
        assert!(!StructuralSignal::KeyboardMash.detect("aaa bbb"));
        assert!(StructuralSignal::Shouting.detect("WHY ARE YOU LIKE THIS"));
        assert!(!StructuralSignal::Shouting.detect("OK fine"));
    }

    #[test]
    fn test_structural_boost_is_bounded_per_signal() {
        let signals = [
            StructuralSignal::ExclamationCluster,
            StructuralSignal::QuestionCluster,
        ];
        // Many clusters still count once per signal.
        assert_eq!(structural_boost(&signals, "!! !! !! ?? ??"), 2);
        assert_eq!(structural_boost(&signals, "calm"), 0);
    }

    #[test]
    fn test_keyword_hits_case_folded() {
        let kws = vec!["Sword".to_string(), "duel".to_string(), "".to_string()];
        assert_eq!(keyword_hits("raise your sword for the duel", &kws), 2);
    }

    #[test]
    fn test_disruption_intensity() {
        let chaos = vec!["lol".to_string(), "random".to_string()];
        assert_eq!(disruption_intensity("good evening", &chaos), 0.0);
        let mid = disruption_intensity("lol so random", &chaos);
        assert!((mid - 2.0 / 3.0).abs() < 1e-6);
        assert_eq!(
            disruption_intensity("LOL RANDOM STUFF HAHAHAHA 🤪🤪🤪 zzzzzzzz", &chaos),
            1.0
        );
    }
}
