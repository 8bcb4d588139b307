//! Concurrent multi-style reasoning (fork), adversarial debate between
//! styles, and human-driven post-fork steering.
//!
//! A fork runs the same query through several fixed reasoning postures
//! (`BranchStyle`) concurrently, then synthesises where they agree and
//! disagree. A debate takes the fork's initial positions and runs them
//! through further rounds where each style responds to the others'
//! current positions, checking for consensus after each round.

pub mod branch;
pub mod coerce;
pub mod compare;
pub mod debate;
pub mod engine;
pub mod error;
pub mod options;
pub mod prompts;
pub mod style;
pub mod tools;
pub mod types;
pub mod steering;

pub use engine::ThinkForkEngine;
pub use error::{ForkError, Result};
pub use options::{DebateOptions, ForkOptions};
pub use prompts::{EmbeddedPromptRegistry, FileOverridePromptRegistry, OverridePromptRegistry, PromptRegistry};
pub use style::BranchStyle;
pub use types::{
    AgreementLevel, ConvergencePoint, DebateResult, DebateRoundEntry, DivergencePoint,
    ForkBranchResult, RecommendedApproach, Significance, SteeringActionKind, SteeringResult,
    StylePosition, ThinkForkResult,
};
