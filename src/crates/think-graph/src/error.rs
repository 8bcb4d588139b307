//! Error types for graph operations.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, GraphError>;

#[derive(Debug, Error)]
pub enum GraphError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("node not found: {0}")]
    NodeNotFound(uuid::Uuid),

    #[error("an internal storage invariant was violated: {0}")]
    Internal(String),
}
