//! Value types returned by `fork`, `debate`, and the steering actions.

use crate::style::BranchStyle;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgreementLevel {
    Full,
    Partial,
    None,
}

impl AgreementLevel {
    pub fn parse_safe(raw: &str) -> AgreementLevel {
        match raw.trim().to_lowercase().as_str() {
            "full" => AgreementLevel::Full,
            "none" => AgreementLevel::None,
            _ => AgreementLevel::Partial,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Significance {
    High,
    Medium,
    Low,
}

impl Significance {
    pub fn parse_safe(raw: &str) -> Significance {
        match raw.trim().to_lowercase().as_str() {
            "high" => Significance::High,
            "low" => Significance::Low,
            _ => Significance::Medium,
        }
    }
}

/// One branch's outcome. A failed branch (`error.is_some()`) always has
/// `confidence == 0.0` and empty `key_insights`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForkBranchResult {
    pub style: BranchStyle,
    pub conclusion: String,
    pub confidence: f64,
    pub key_insights: Vec<String>,
    pub risks: Vec<String>,
    pub opportunities: Vec<String>,
    pub assumptions: Vec<String>,
    pub tokens: u32,
    pub duration_ms: u64,
    pub error: Option<String>,
}

impl ForkBranchResult {
    pub fn failed(style: BranchStyle, error: impl Into<String>, duration_ms: u64) -> Self {
        Self {
            style,
            conclusion: String::new(),
            confidence: 0.0,
            key_insights: Vec::new(),
            risks: Vec::new(),
            opportunities: Vec::new(),
            assumptions: Vec::new(),
            tokens: 0,
            duration_ms,
            error: Some(error.into()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConvergencePoint {
    pub topic: String,
    pub agreement: AgreementLevel,
    pub styles: Vec<BranchStyle>,
    pub summary: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StylePosition {
    pub style: BranchStyle,
    pub position: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DivergencePoint {
    pub topic: String,
    pub positions: Vec<StylePosition>,
    pub significance: Significance,
    pub recommendation: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendedApproach {
    pub style: BranchStyle,
    pub rationale: String,
    pub confidence: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThinkForkResult {
    pub query: String,
    pub branches: Vec<ForkBranchResult>,
    pub convergence_points: Vec<ConvergencePoint>,
    pub divergence_points: Vec<DivergencePoint>,
    pub meta_insight: String,
    pub recommended_approach: Option<RecommendedApproach>,
    pub total_tokens: u32,
    pub total_duration_ms: u64,
    pub errors: Vec<String>,
    pub fallback_prompts_used: Vec<BranchStyle>,
    pub applied_human_guidance: Vec<BranchStyle>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebateRoundEntry {
    pub style: BranchStyle,
    pub round: u32,
    pub response: String,
    pub confidence: f64,
    pub position_changed: bool,
    pub key_counterpoints: Vec<String>,
    pub concessions: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebateResult {
    pub query: String,
    pub rounds: Vec<DebateRoundEntry>,
    pub consensus: Option<String>,
    pub consensus_confidence: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SteeringActionKind {
    Expand,
    Merge,
    Challenge,
    Refork,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SteeringResult {
    pub action: SteeringActionKind,
    pub result: String,
    pub confidence: f64,
    pub key_insights: Vec<String>,
    pub tokens_used: u32,
    pub duration_ms: u64,
}
