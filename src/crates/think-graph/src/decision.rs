//! `DecisionPoint` — a recorded fork in a node's reasoning path.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alternative {
    pub path: String,
    pub reason_rejected: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionPoint {
    pub id: Uuid,
    pub node_id: Uuid,
    pub step_number: u32,
    pub description: String,
    pub chosen_path: String,
    pub alternatives: Vec<Alternative>,
    pub confidence: f64,
    pub reasoning_excerpt: Option<String>,
}
