//! The `ThinkingProvider` trait — the abstract LLM transport this crate
//! orchestrates but never implements.
//!
//! # Architecture philosophy
//!
//! This crate is an orchestration layer, not an LLM client. It defines the
//! contract; callers supply an implementation for whichever model endpoint
//! they actually talk to. The core never hosts an LLM itself (see
//! SPEC_FULL.md §1 Non-goals).
//!
//! # Example implementation
//!
//! ```rust,ignore
//! use thinking::{ThinkingProvider, ThinkRequest, ThinkResult};
//! use async_trait::async_trait;
//!
//! struct MyProvider { api_key: String }
//!
//! #[async_trait]
//! impl ThinkingProvider for MyProvider {
//!     async fn think(&self, request: ThinkRequest) -> thinking::Result<ThinkResult> {
//!         todo!("call the remote model and parse its blocks")
//!     }
//!     fn clone_box(&self) -> Box<dyn ThinkingProvider> {
//!         Box::new(MyProvider { api_key: self.api_key.clone() })
//!     }
//! }
//! ```

use crate::block::ThinkingBlock;
use crate::effort::Effort;
use crate::error::{Result, ThinkingError};
use crate::message::Message;
use crate::tools::ToolDefinition;
use crate::usage::UsageMetadata;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A `think` call's inputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThinkRequest {
    pub system_prompt: String,
    pub messages: Vec<Message>,
    pub tools: Option<Vec<ToolDefinition>>,
    pub effort: Effort,
    pub streaming: bool,
    /// Explicit output cap, independent of the effort/budget mapping.
    pub max_tokens: Option<u32>,
}

impl ThinkRequest {
    pub fn new(system_prompt: impl Into<String>, messages: Vec<Message>, effort: Effort) -> Self {
        Self {
            system_prompt: system_prompt.into(),
            messages,
            tools: None,
            effort,
            streaming: false,
            max_tokens: None,
        }
    }

    pub fn with_tools(mut self, tools: Vec<ToolDefinition>) -> Self {
        self.tools = Some(tools);
        self
    }

    pub fn with_streaming(mut self, streaming: bool) -> Self {
        self.streaming = streaming;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Validate the request against the provider contract (spec §4.1):
    /// messages must be non-empty.
    pub fn validate(&self) -> Result<()> {
        if self.messages.is_empty() {
            return Err(ThinkingError::InvalidInput(
                "messages must be non-empty".to_string(),
            ));
        }
        for tool in self.tools.iter().flatten() {
            if !tool.parameters.get("type").map(|t| t == "object").unwrap_or(false) {
                return Err(ThinkingError::InvalidInput(format!(
                    "tool '{}' parameters must be a JSON-Schema object type",
                    tool.name
                )));
            }
        }
        Ok(())
    }
}

/// A completed `think` call's outputs: ordered content blocks plus usage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThinkResult {
    pub content: Vec<ThinkingBlock>,
    pub usage: UsageMetadata,
    /// Whether the provider performed a server-side compaction during the call.
    pub compacted: bool,
}

impl ThinkResult {
    pub fn new(content: Vec<ThinkingBlock>, usage: UsageMetadata) -> Self {
        let compacted = content.iter().any(ThinkingBlock::is_compaction);
        Self {
            content,
            usage,
            compacted,
        }
    }

    pub fn thinking_blocks(&self) -> impl Iterator<Item = &ThinkingBlock> {
        self.content.iter().filter(|b| b.is_thinking())
    }

    pub fn text_blocks(&self) -> impl Iterator<Item = &ThinkingBlock> {
        self.content.iter().filter(|b| b.is_text())
    }

    pub fn tool_uses(&self) -> impl Iterator<Item = &ThinkingBlock> {
        self.content.iter().filter(|b| b.is_tool_use())
    }

    pub fn compactions(&self) -> impl Iterator<Item = &ThinkingBlock> {
        self.content.iter().filter(|b| b.is_compaction())
    }

    /// Concatenated text of every `Text` block, in order.
    pub fn final_text(&self) -> String {
        self.text_blocks()
            .filter_map(ThinkingBlock::reasoning_text_or_text)
            .collect::<Vec<_>>()
            .join("")
    }
}

// small helper kept local to avoid growing ThinkingBlock's public surface
// with a method only ThinkResult needs.
trait TextExtract {
    fn reasoning_text_or_text(&self) -> Option<&str>;
}

impl TextExtract for ThinkingBlock {
    fn reasoning_text_or_text(&self) -> Option<&str> {
        match self {
            ThinkingBlock::Text { text } => Some(text),
            _ => None,
        }
    }
}

/// Streaming delta events forwarded while a `think` call is in flight.
///
/// Streaming never reorders blocks: deltas for a given block arrive before
/// the next block's deltas begin.
#[derive(Debug, Clone)]
pub enum StreamEvent {
    ThinkingDelta { text: String },
    TextDelta { text: String },
    Compaction { summary: String },
}

/// Sink deltas are forwarded to while a streaming `think` call is in flight.
pub type StreamSink = tokio::sync::mpsc::UnboundedSender<StreamEvent>;

/// Abstract LLM transport: takes a system prompt, messages, optional tools,
/// and an effort level; returns ordered content blocks plus usage.
///
/// Implementations must be `Send + Sync` so they can be shared as
/// `Arc<dyn ThinkingProvider>` across concurrently-running fork branches.
#[async_trait]
pub trait ThinkingProvider: Send + Sync {
    /// Run a complete (non-streaming) think call.
    async fn think(&self, request: ThinkRequest) -> Result<ThinkResult>;

    /// Run a streaming think call, forwarding deltas to `sink` as they
    /// arrive. Implementations must still accumulate and return the final
    /// `ThinkResult` so the non-streaming contract always holds.
    ///
    /// Default implementation falls back to non-streaming and emits no
    /// deltas; providers that support real streaming should override it.
    async fn think_streaming(
        &self,
        request: ThinkRequest,
        _sink: StreamSink,
    ) -> Result<ThinkResult> {
        self.think(request).await
    }

    /// Clone this provider into a boxed trait object, enabling
    /// `Clone for Box<dyn ThinkingProvider>`.
    fn clone_box(&self) -> Box<dyn ThinkingProvider>;
}

impl Clone for Box<dyn ThinkingProvider> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_rejects_empty_messages() {
        let req = ThinkRequest::new("sys", vec![], Effort::Low);
        assert!(req.validate().is_err());
    }

    #[test]
    fn request_accepts_non_empty_messages() {
        let req = ThinkRequest::new("sys", vec![Message::user("hi")], Effort::Low);
        assert!(req.validate().is_ok());
    }

    #[test]
    fn request_rejects_non_object_tool_schema() {
        let tool = ToolDefinition::new("t", "d", serde_json::json!({"type": "string"}));
        let req =
            ThinkRequest::new("sys", vec![Message::user("hi")], Effort::Low).with_tools(vec![tool]);
        assert!(req.validate().is_err());
    }

    #[test]
    fn result_partitions_blocks_by_kind() {
        let result = ThinkResult::new(
            vec![
                ThinkingBlock::Thinking {
                    text: "reasoning".into(),
                    signature: None,
                },
                ThinkingBlock::Text {
                    text: "answer".into(),
                },
            ],
            UsageMetadata::new(10, 5, 20),
        );
        assert_eq!(result.thinking_blocks().count(), 1);
        assert_eq!(result.text_blocks().count(), 1);
        assert_eq!(result.final_text(), "answer");
        assert!(!result.compacted);
    }

    #[test]
    fn result_detects_compaction() {
        let result = ThinkResult::new(
            vec![ThinkingBlock::Compaction {
                summary: "condensed".into(),
            }],
            UsageMetadata::default(),
        );
        assert!(result.compacted);
    }
}
