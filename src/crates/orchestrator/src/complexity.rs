//! Complexity classification and complexity→effort routing (spec.md §4.5
//! step 2).

use crate::config::EffortRoutingConfig;
use thinking::Effort;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Complexity {
    Simple,
    Standard,
    Complex,
}

const COMPLEX_KEYWORDS: &[&str] = &[
    "debug",
    "design",
    "trade-off",
    "tradeoff",
    "research",
    "step-by-step",
    "step by step",
    "refactor",
    "architecture",
    "why does",
    "investigate",
];

const SIMPLE_KEYWORDS: &[&str] = &[
    "hi",
    "hello",
    "hey",
    "thanks",
    "thank you",
    "what is",
    "what's",
    "define",
];

/// Ordered pattern list: complex keywords dominate, then simple keywords,
/// then a length heuristic, defaulting to `standard`.
pub fn classify(message: &str) -> Complexity {
    let lower = message.to_lowercase();

    if COMPLEX_KEYWORDS.iter().any(|kw| lower.contains(kw)) {
        return Complexity::Complex;
    }
    if SIMPLE_KEYWORDS.iter().any(|kw| lower.contains(kw)) {
        return Complexity::Simple;
    }

    let len = message.chars().count();
    if len < 50 {
        Complexity::Simple
    } else if len > 500 {
        Complexity::Complex
    } else {
        Complexity::Standard
    }
}

pub fn effort_for(complexity: Complexity, config: &EffortRoutingConfig) -> Effort {
    if !config.enabled {
        return Effort::default();
    }
    match complexity {
        Complexity::Simple => config.simple_effort,
        Complexity::Standard => config.standard_effort,
        Complexity::Complex => config.complex_effort,
    }
}
