//! The value `Orchestrator::process` returns — always `Ok`, even when the
//! underlying provider call failed (spec.md §7: raw error text never
//! escapes to the client, so failures surface as a terminal `degraded`
//! result rather than `Err`).

use serde::Serialize;
use think_graph::PersistenceIssue;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize)]
pub struct OrchestratorResult {
    pub session_id: Uuid,
    pub response: String,
    /// Set when a graph/memory persistence call reported an issue; the
    /// conversational turn still completed, just without full durability.
    pub degraded: bool,
    pub persistence_issues: Vec<PersistenceIssue>,
    pub analysis_id: Option<String>,
    pub correlation_id: String,
}

impl OrchestratorResult {
    pub fn new(session_id: Uuid, response: impl Into<String>, correlation_id: impl Into<String>) -> Self {
        Self {
            session_id,
            response: response.into(),
            degraded: false,
            persistence_issues: Vec::new(),
            analysis_id: None,
            correlation_id: correlation_id.into(),
        }
    }

    pub fn with_analysis_id(mut self, analysis_id: impl Into<String>) -> Self {
        self.analysis_id = Some(analysis_id.into());
        self
    }

    pub fn merge_persist_outcome(&mut self, degraded: bool, issues: Vec<PersistenceIssue>) {
        if degraded {
            self.degraded = true;
        }
        self.persistence_issues.extend(issues);
    }
}
