//! Effort levels and the budgeted-mode token table.

use serde::{Deserialize, Serialize};

/// A coarse budget hint shaping provider thinking depth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Effort {
    Low,
    Medium,
    High,
    Max,
}

impl Effort {
    /// Explicit token budget used in `ThinkingMode::Budgeted`.
    pub fn budget_tokens(&self) -> u32 {
        match self {
            Effort::Low => 5_000,
            Effort::Medium => 10_000,
            Effort::High => 20_000,
            Effort::Max => 50_000,
        }
    }
}

impl Default for Effort {
    fn default() -> Self {
        Effort::Medium
    }
}

impl std::fmt::Display for Effort {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Effort::Low => write!(f, "low"),
            Effort::Medium => write!(f, "medium"),
            Effort::High => write!(f, "high"),
            Effort::Max => write!(f, "max"),
        }
    }
}

/// How the engine negotiates thinking depth with the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThinkingMode {
    /// Preferred: effort is a hint, the provider decides the budget.
    Adaptive,
    /// Legacy: an explicit token budget derived from effort.
    Budgeted,
}

impl Default for ThinkingMode {
    fn default() -> Self {
        ThinkingMode::Adaptive
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn budget_table_matches_spec() {
        assert_eq!(Effort::Low.budget_tokens(), 5_000);
        assert_eq!(Effort::Medium.budget_tokens(), 10_000);
        assert_eq!(Effort::High.budget_tokens(), 20_000);
        assert_eq!(Effort::Max.budget_tokens(), 50_000);
    }

    #[test]
    fn effort_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Effort::Max).unwrap(), "\"max\"");
    }
}
