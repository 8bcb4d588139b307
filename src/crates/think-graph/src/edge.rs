//! `ReasoningEdge` — directed, typed links between thinking nodes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeKind {
    Influences,
    Supports,
    Refines,
    Contradicts,
    Supersedes,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReasoningEdge {
    pub id: Uuid,
    pub source_id: Uuid,
    pub target_id: Uuid,
    pub kind: EdgeKind,
    pub weight: f64,
    pub metadata: Option<Value>,
    pub created_at: DateTime<Utc>,
}
