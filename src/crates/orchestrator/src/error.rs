//! Orchestrator error taxonomy (spec.md §7).

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("session not found: {0}")]
    SessionNotFound(Uuid),

    #[error("tool call missing: {0}")]
    ToolMissing(String),

    #[error(transparent)]
    Provider(#[from] thinking::ThinkingError),

    #[error(transparent)]
    Graph(#[from] think_graph::GraphError),

    #[error(transparent)]
    Memory(#[from] memory_hierarchy::MemoryError),

    #[error(transparent)]
    Fork(#[from] think_fork::ForkError),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, OrchestratorError>;
