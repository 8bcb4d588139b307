//! The persisted graph of thinking nodes, reasoning edges, and decision
//! points for a session.
//!
//! `ThinkGraph::persist_thinking_node` is the single write path: it
//! coalesces raw thinking blocks into a node, detects any embedded
//! structured-reasoning section, computes confidence, and reports exactly
//! which of (node, decision points, parent edge) succeeded. Traversal
//! (`get_incoming`/`get_outgoing`/`get_chain`/`search`) is pure reads.

mod decision;
mod edge;
mod error;
mod graph;
mod node;
mod parse;

pub use decision::{Alternative, DecisionPoint};
pub use edge::{EdgeKind, ReasoningEdge};
pub use error::{GraphError, Result};
pub use graph::{PersistOutcome, PersistenceIssue, ThinkGraph};
pub use node::{NodeType, ReasoningStep, StepKind, ThinkingNode, TokenUsage};
