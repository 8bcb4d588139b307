//! Session control loop tying together the thinking provider, the fork/
//! debate engine, the thinking-graph store, and the per-session memory
//! hierarchy.
//!
//! `Orchestrator::process` is the single entry point for a conversational
//! turn: it gates on the session's token budget, classifies the message's
//! complexity to pick an effort level, retrieves knowledge-context
//! snippets, makes the routing call to the provider, and persists the
//! resulting thinking node (degrading rather than failing on persistence
//! errors). `Orchestrator::fork`/`debate` expose the concurrent reasoning
//! engine directly, pairing each result with the ordered transport events
//! a streaming caller would emit.

pub mod complexity;
pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod registry;
pub mod result;
pub mod sanitize;
pub mod session;
pub mod tools;

pub use complexity::{classify, effort_for, Complexity};
pub use config::{EffortRoutingConfig, EngineConfig, TokenBudgetConfig};
pub use engine::Orchestrator;
pub use error::{OrchestratorError, Result};
pub use registry::{NoopHydrator, SessionEntry, SessionHydrator, SessionRegistry};
pub use result::OrchestratorResult;
pub use sanitize::sanitize_provider_error;
pub use session::{BudgetEvent, Session, SessionStatus};
pub use tools::{create_task_plan, route_to_agent, RoutingDecision, TaskPlan};
