//! `MemoryEntry` and the enums describing where it lives and where it came
//! from.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Which tier of the hierarchy an entry currently lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    MainContext,
    RecallStorage,
    ArchivalStorage,
}

/// What produced an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    UserInput,
    ThinkingNode,
    DecisionPoint,
    Metacognitive,
    KnowledgeBase,
    Compaction,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryEntry {
    pub id: Uuid,
    pub tier: Tier,
    pub content: String,
    pub importance: f64,
    pub last_accessed_at: DateTime<Utc>,
    pub access_count: u32,
    pub source: Source,
    pub source_id: Option<Uuid>,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// Clamp a raw importance value into `[0, 1]`.
pub fn clamp_importance(importance: f64) -> f64 {
    importance.clamp(0.0, 1.0)
}

/// `ceil(charLength / 4)`, the deterministic token estimator used
/// throughout this crate (spec §4.3).
pub fn estimate_tokens(text: &str) -> usize {
    text.chars().count().div_ceil(4)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_bounds_importance() {
        assert_eq!(clamp_importance(-0.5), 0.0);
        assert_eq!(clamp_importance(1.5), 1.0);
        assert_eq!(clamp_importance(0.42), 0.42);
    }

    #[test]
    fn token_estimate_rounds_up() {
        assert_eq!(estimate_tokens(""), 0);
        assert_eq!(estimate_tokens("abcd"), 1);
        assert_eq!(estimate_tokens("abcde"), 2);
    }
}
