//! Error types for fork/debate operations.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ForkError>;

#[derive(Debug, Error)]
pub enum ForkError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error(transparent)]
    Engine(#[from] thinking::ThinkingError),

    #[error("prompt override file: {0}")]
    PromptFile(#[from] utils::UtilsError),
}
