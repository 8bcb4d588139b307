//! `ThinkingNode` and the structured-reasoning types it may carry.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What produced a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeType {
    Thinking,
    Compaction,
    ForkBranch,
}

/// The tag a structured reasoning step is classified under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    Analysis,
    Hypothesis,
    Evaluation,
    Consideration,
    Conclusion,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReasoningStep {
    pub kind: StepKind,
    pub text: String,
    pub confidence: f64,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct TokenUsage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThinkingNode {
    pub id: Uuid,
    pub session_id: Uuid,
    pub reasoning: String,
    pub input_query: Option<String>,
    pub response: Option<String>,
    pub confidence: f64,
    pub structured_reasoning: Option<Vec<ReasoningStep>>,
    pub node_type: NodeType,
    pub token_usage: TokenUsage,
    pub parent_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}
