//! `BranchStyle` — the closed set of reasoning postures a fork can run.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Canonical order used whenever styles must be sorted or tie-broken.
pub const CANONICAL_ORDER: [BranchStyle; 4] = [
    BranchStyle::Conservative,
    BranchStyle::Aggressive,
    BranchStyle::Balanced,
    BranchStyle::Contrarian,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BranchStyle {
    Conservative,
    Aggressive,
    Balanced,
    Contrarian,
}

impl BranchStyle {
    pub fn all() -> Vec<BranchStyle> {
        CANONICAL_ORDER.to_vec()
    }

    /// Position in `CANONICAL_ORDER`, used for tie-breaking.
    pub fn canonical_rank(self) -> usize {
        CANONICAL_ORDER.iter().position(|s| *s == self).unwrap_or(usize::MAX)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BranchStyle::Conservative => "conservative",
            BranchStyle::Aggressive => "aggressive",
            BranchStyle::Balanced => "balanced",
            BranchStyle::Contrarian => "contrarian",
        }
    }

    /// Parses a style tag from provider output, defaulting to the safest
    /// variant (`balanced`) on anything unrecognised.
    pub fn parse_safe(raw: &str) -> BranchStyle {
        match raw.trim().to_lowercase().as_str() {
            "conservative" => BranchStyle::Conservative,
            "aggressive" => BranchStyle::Aggressive,
            "contrarian" => BranchStyle::Contrarian,
            _ => BranchStyle::Balanced,
        }
    }
}

impl fmt::Display for BranchStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_order_matches_the_fixed_sequence() {
        let ranks: Vec<usize> = BranchStyle::all().iter().map(|s| s.canonical_rank()).collect();
        assert_eq!(ranks, vec![0, 1, 2, 3]);
    }

    #[test]
    fn parse_safe_defaults_to_balanced() {
        assert_eq!(BranchStyle::parse_safe("garbage"), BranchStyle::Balanced);
        assert_eq!(BranchStyle::parse_safe("Aggressive"), BranchStyle::Aggressive);
    }
}
