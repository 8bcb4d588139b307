//! The closed streaming event set emitted to clients (spec §6).
//!
//! Events are JSON objects; the transport adapter (out of scope here, see
//! SPEC_FULL.md §1) is responsible for framing them as `data: ...\n\n` lines
//! over SSE and interleaving `: heartbeat` comments. This module only
//! defines the closed set of `type` values and their payloads.

use crate::style::{AgreementLevel, BranchStyle, Significance, StreamMode};
use serde::{Deserialize, Serialize};

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

/// Priority clients can use to decide what to surface immediately versus
/// what to batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum EventPriority {
    Low = 0,
    Normal = 1,
    High = 2,
}

/// The complete closed set of streaming event types.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum StreamEvent {
    #[serde(rename = "fork:start")]
    ForkStart { styles: Vec<BranchStyle>, mode: StreamMode },

    #[serde(rename = "branch:start")]
    BranchStart {
        style: BranchStyle,
        index: u32,
        total: u32,
    },

    #[serde(rename = "branch:complete")]
    BranchComplete {
        style: BranchStyle,
        conclusion: String,
        confidence: f64,
        key_insights: Vec<String>,
        risks: Vec<String>,
        opportunities: Vec<String>,
        assumptions: Vec<String>,
    },

    #[serde(rename = "branch:error")]
    BranchError { style: BranchStyle, error: String },

    #[serde(rename = "comparison:start")]
    ComparisonStart,

    #[serde(rename = "comparison:complete")]
    ComparisonComplete {
        convergence_points: Vec<ConvergencePoint>,
        divergence_points: Vec<DivergencePoint>,
        meta_insight: String,
        recommended_approach: Option<RecommendedApproach>,
    },

    #[serde(rename = "debate:start")]
    DebateStart { total_rounds: u32 },

    #[serde(rename = "debate:entry_start")]
    DebateEntryStart { round: u32, style: BranchStyle },

    #[serde(rename = "debate:entry_complete")]
    DebateEntryComplete {
        round: u32,
        style: BranchStyle,
        response: String,
        confidence: f64,
        position_changed: bool,
        key_counterpoints: Vec<String>,
        concessions: Vec<String>,
    },

    #[serde(rename = "debate:round_complete")]
    DebateRoundComplete { round: u32 },

    #[serde(rename = "done")]
    Done {
        result: serde_json::Value,
        analysis_id: Option<String>,
        correlation_id: String,
        degraded: bool,
        persistence_error: Option<String>,
    },

    #[serde(rename = "error")]
    Error {
        code: String,
        message: String,
        recoverable: bool,
        correlation_id: String,
    },
}

impl StreamEvent {
    /// The wire `type` value for this event.
    pub fn event_type(&self) -> &'static str {
        match self {
            StreamEvent::ForkStart { .. } => "fork:start",
            StreamEvent::BranchStart { .. } => "branch:start",
            StreamEvent::BranchComplete { .. } => "branch:complete",
            StreamEvent::BranchError { .. } => "branch:error",
            StreamEvent::ComparisonStart => "comparison:start",
            StreamEvent::ComparisonComplete { .. } => "comparison:complete",
            StreamEvent::DebateStart { .. } => "debate:start",
            StreamEvent::DebateEntryStart { .. } => "debate:entry_start",
            StreamEvent::DebateEntryComplete { .. } => "debate:entry_complete",
            StreamEvent::DebateRoundComplete { .. } => "debate:round_complete",
            StreamEvent::Done { .. } => "done",
            StreamEvent::Error { .. } => "error",
        }
    }

    pub fn priority(&self) -> EventPriority {
        match self {
            StreamEvent::BranchError { .. } | StreamEvent::Error { .. } => EventPriority::High,
            StreamEvent::Done { .. }
            | StreamEvent::BranchComplete { .. }
            | StreamEvent::ComparisonComplete { .. }
            | StreamEvent::DebateEntryComplete { .. }
            | StreamEvent::DebateRoundComplete { .. } => EventPriority::Normal,
            _ => EventPriority::Low,
        }
    }

    /// Whether this event type may appear more than once per round (used by
    /// consumers asserting the causal ordering in SPEC_FULL.md §5).
    pub fn is_terminal(&self) -> bool {
        matches!(self, StreamEvent::Done { .. } | StreamEvent::Error { .. })
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Render as an SSE `data: ...` line, terminated by a blank line.
    pub fn to_sse(&self) -> Result<String, serde_json::Error> {
        Ok(format!("data: {}\n\n", self.to_json()?))
    }
}

/// A heartbeat comment line. Carries no `type` and no semantics; emitted at
/// a fixed cadence (≤ 15s) to keep the transport connection alive.
pub const HEARTBEAT_LINE: &str = ": heartbeat\n\n";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fork_start_serializes_with_tag() {
        let event = StreamEvent::ForkStart {
            styles: vec![BranchStyle::Conservative, BranchStyle::Aggressive],
            mode: StreamMode::Fork,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "fork:start");
        assert_eq!(json["data"]["mode"], "fork");
    }

    #[test]
    fn branch_error_has_high_priority() {
        let event = StreamEvent::BranchError {
            style: BranchStyle::Aggressive,
            error: "boom".into(),
        };
        assert_eq!(event.priority(), EventPriority::High);
        assert_eq!(event.event_type(), "branch:error");
    }

    #[test]
    fn done_and_error_are_terminal() {
        let done = StreamEvent::Done {
            result: serde_json::json!({}),
            analysis_id: None,
            correlation_id: "abc".into(),
            degraded: false,
            persistence_error: None,
        };
        assert!(done.is_terminal());

        let comparison_start = StreamEvent::ComparisonStart;
        assert!(!comparison_start.is_terminal());
    }

    #[test]
    fn sse_rendering_is_newline_terminated() {
        let event = StreamEvent::DebateStart { total_rounds: 3 };
        let sse = event.to_sse().unwrap();
        assert!(sse.starts_with("data: "));
        assert!(sse.ends_with("\n\n"));
    }
}
