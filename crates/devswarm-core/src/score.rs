use crate::registry::AgentProfile;
use crate::types::{ComplexityTier, CostTier, SpeedTier};

// Weights of the additive matching heuristic. Task-type hits dominate;
// language/framework hits are secondary; strength phrases contribute per
// matched word.
const TASK_TYPE_WEIGHT: f64 = 10.0;
const LANGUAGE_WEIGHT: f64 = 5.0;
const FRAMEWORK_WEIGHT: f64 = 5.0;
const STRENGTH_WORD_WEIGHT: f64 = 2.0;

const SIMPLE_HINTS: &[&str] = &["simple", "quick", "basic", "standard"];
const COMPLEX_HINTS: &[&str] = &["complex", "advanced", "sophisticated"];
const BUDGET_HINTS: &[&str] = &["prototype", "demo", "test"];

/// Score how well an agent profile matches a task description.
///
/// All checks are case-insensitive substring containment against the
/// lowercased description. Substring (not whole-word) semantics are load-
/// bearing compatibility behavior: short keywords can match inside unrelated
/// words. Pure and deterministic; the result is always >= 0.
pub fn match_score(task_description: &str, profile: &AgentProfile) -> f64 {
    let desc = task_description.to_lowercase();
    let mut score = 0.0;

    for task_type in &profile.task_types {
        if desc.contains(task_type.as_str()) {
            score += TASK_TYPE_WEIGHT;
        }
    }

    for language in &profile.languages {
        if desc.contains(language.as_str()) {
            score += LANGUAGE_WEIGHT;
        }
    }

    for framework in &profile.frameworks {
        // "all" is a wildcard marker, never a keyword.
        if framework != "all" && desc.contains(framework.as_str()) {
            score += FRAMEWORK_WEIGHT;
        }
    }

    for strength in &profile.strengths {
        let matched_words = strength
            .to_lowercase()
            .split_whitespace()
            .filter(|word| desc.contains(word))
            .count();
        score += matched_words as f64 * STRENGTH_WORD_WEIGHT;
    }

    // Speed preference for simple tasks.
    if contains_any(&desc, SIMPLE_HINTS) {
        match profile.speed {
            SpeedTier::Fastest => score += 3.0,
            SpeedTier::Fast => score += 2.0,
            _ => {}
        }
    }

    // Complexity matching.
    if contains_any(&desc, COMPLEX_HINTS) && profile.complexity == ComplexityTier::High {
        score += 3.0;
    }

    // Cost consideration for non-critical tasks.
    if contains_any(&desc, BUDGET_HINTS) {
        match profile.cost {
            CostTier::Free => score += 2.0,
            CostTier::Low => score += 1.0,
            _ => {}
        }
    }

    score
}

pub(crate) fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| haystack.contains(n))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
