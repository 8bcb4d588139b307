//! Abstract LLM thinking provider contract and the adapter normalising it.
//!
//! This crate defines `ThinkingProvider`, the boundary between the
//! reasoning engine and whatever model endpoint actually exposes extended
//! thinking, and `ThinkingEngine`, the thin adapter that normalises
//! streaming/non-streaming calls, parses responses into typed
//! [`ThinkingBlock`]s, and restores per-call effort overrides even on error.
//!
//! The core never hosts an LLM itself; callers provide a `ThinkingProvider`
//! implementation for their endpoint (remote API, local model, mock for
//! tests).

pub mod block;
pub mod effort;
pub mod engine;
pub mod error;
pub mod message;
pub mod provider;
pub mod tools;
pub mod usage;

pub use block::ThinkingBlock;
pub use effort::{Effort, ThinkingMode};
pub use engine::{replay_as_stream, EngineRequest, ThinkingEngine};
pub use error::{Result, ThinkingError};
pub use message::{Message, MessageRole};
pub use provider::{StreamEvent, StreamSink, ThinkRequest, ThinkResult, ThinkingProvider};
pub use tools::{ToolCall, ToolDefinition};
pub use usage::UsageMetadata;
