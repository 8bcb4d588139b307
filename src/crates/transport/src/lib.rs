//! Streaming event protocol types emitted by the orchestrator to clients.
//!
//! This crate defines only the closed `StreamEvent` set and its payload
//! types (spec §6). The HTTP/SSE transport that frames and delivers these
//! events is an external collaborator, specified only at this interface
//! (SPEC_FULL.md §1) and is not implemented here.

pub mod event;
pub mod style;

pub use event::{
    ConvergencePoint, DivergencePoint, EventPriority, RecommendedApproach, StreamEvent,
    StylePosition, HEARTBEAT_LINE,
};
pub use style::{AgreementLevel, BranchStyle, Significance, StreamMode};
