//! `ThinkingEngine` — a thin adapter over `ThinkingProvider` that normalises
//! streaming/non-streaming calls and restores the effort override after
//! every call, even on error.

use crate::block::ThinkingBlock;
use crate::effort::{Effort, ThinkingMode};
use crate::error::Result;
use crate::error::ThinkingError;
use crate::message::Message;
use crate::provider::{StreamEvent, StreamSink, ThinkRequest, ThinkResult, ThinkingProvider};
use crate::tools::ToolDefinition;
use parking_lot::RwLock;
use std::sync::Arc;
use std::time::Duration;
use tooling::async_utils::timeout::{with_timeout, TimeoutError};
use tracing::{debug, warn};

/// Per-call provider timeout. The effective timeout is set by the transport
/// layer, on the order of 300-800 seconds depending on endpoint; the engine
/// enforces a single fixed upper bound rather than deriving one from effort,
/// since effort is a thinking-depth hint, not a network-latency budget.
const PROVIDER_CALL_TIMEOUT: Duration = Duration::from_secs(600);

/// Request shape accepted by `ThinkingEngine::think`. Unlike `ThinkRequest`,
/// effort is optional here: `None` means "use the engine's current default".
#[derive(Debug, Clone)]
pub struct EngineRequest {
    pub system_prompt: String,
    pub messages: Vec<Message>,
    pub tools: Option<Vec<ToolDefinition>>,
    pub effort: Option<Effort>,
    pub max_tokens: Option<u32>,
}

impl EngineRequest {
    pub fn new(system_prompt: impl Into<String>, messages: Vec<Message>) -> Self {
        Self {
            system_prompt: system_prompt.into(),
            messages,
            tools: None,
            effort: None,
            max_tokens: None,
        }
    }

    pub fn with_tools(mut self, tools: Vec<ToolDefinition>) -> Self {
        self.tools = Some(tools);
        self
    }

    pub fn with_effort(mut self, effort: Effort) -> Self {
        self.effort = Some(effort);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }
}

/// Restores the engine's default effort when dropped, even if the call that
/// temporarily overrode it panics or returns an error.
struct EffortGuard<'a> {
    default_effort: &'a RwLock<Effort>,
    original: Effort,
}

impl Drop for EffortGuard<'_> {
    fn drop(&mut self) {
        *self.default_effort.write() = self.original;
    }
}

/// Adapter over a `ThinkingProvider` that parses responses into typed
/// blocks and normalises the streaming/non-streaming contract.
pub struct ThinkingEngine {
    provider: Arc<dyn ThinkingProvider>,
    mode: ThinkingMode,
    default_effort: RwLock<Effort>,
}

impl ThinkingEngine {
    pub fn new(provider: Arc<dyn ThinkingProvider>, mode: ThinkingMode, default_effort: Effort) -> Self {
        Self {
            provider,
            mode,
            default_effort: RwLock::new(default_effort),
        }
    }

    pub fn mode(&self) -> ThinkingMode {
        self.mode
    }

    pub fn default_effort(&self) -> Effort {
        *self.default_effort.read()
    }

    /// Run a non-streaming think call, normalising `EngineRequest` into a
    /// provider-level `ThinkRequest`. Bounded by `PROVIDER_CALL_TIMEOUT`: a
    /// provider that doesn't return in time surfaces
    /// `ThinkingError::TimedOut` rather than hanging the caller.
    pub async fn think(&self, request: EngineRequest) -> Result<ThinkResult> {
        let (think_request, _guard) = self.build_request(request, false);
        think_request.validate()?;
        debug!(effort = %think_request.effort, mode = ?self.mode, "dispatching think call");
        with_timeout(PROVIDER_CALL_TIMEOUT, self.provider.think(think_request))
            .await
            .map_err(Self::map_timeout)
    }

    /// Run a streaming think call. Deltas are forwarded to `sink` in block
    /// order; the accumulated `ThinkResult` is still returned so callers
    /// that ignore streaming get the same contract as `think`. Subject to
    /// the same per-call timeout as `think`.
    pub async fn think_streaming(
        &self,
        request: EngineRequest,
        sink: StreamSink,
    ) -> Result<ThinkResult> {
        let (think_request, _guard) = self.build_request(request, true);
        think_request.validate()?;
        debug!(effort = %think_request.effort, mode = ?self.mode, "dispatching streaming think call");
        with_timeout(PROVIDER_CALL_TIMEOUT, self.provider.think_streaming(think_request, sink))
            .await
            .map_err(Self::map_timeout)
    }

    /// Collapse a `TimeoutError<ThinkingError>` back into a plain
    /// `ThinkingError`, converting an elapsed deadline into `TimedOut`.
    fn map_timeout(err: TimeoutError<ThinkingError>) -> ThinkingError {
        match err {
            TimeoutError::OperationFailed(inner) => inner,
            TimeoutError::Timeout(duration) => {
                ThinkingError::TimedOut(format!("provider call exceeded {:?}", duration))
            }
        }
    }

    fn build_request(
        &self,
        request: EngineRequest,
        streaming: bool,
    ) -> (ThinkRequest, Option<EffortGuard<'_>>) {
        let guard = request.effort.map(|override_effort| {
            let original = *self.default_effort.read();
            *self.default_effort.write() = override_effort;
            EffortGuard {
                default_effort: &self.default_effort,
                original,
            }
        });
        let effort = *self.default_effort.read();

        let max_tokens = request.max_tokens.or_else(|| {
            matches!(self.mode, ThinkingMode::Budgeted).then(|| effort.budget_tokens())
        });

        let mut think_request = ThinkRequest::new(request.system_prompt, request.messages, effort)
            .with_streaming(streaming);
        if let Some(tools) = request.tools {
            think_request = think_request.with_tools(tools);
        }
        if let Some(max_tokens) = max_tokens {
            think_request = think_request.with_max_tokens(max_tokens);
        }

        (think_request, guard)
    }
}

/// Replay buffered deltas from a `ThinkResult` as if they had streamed, for
/// callers that want a uniform event stream regardless of whether the
/// underlying provider call actually streamed.
pub fn replay_as_stream(result: &ThinkResult, sink: &StreamSink) {
    for block in &result.content {
        let event = match block {
            ThinkingBlock::Thinking { text, .. } => Some(StreamEvent::ThinkingDelta { text: text.clone() }),
            ThinkingBlock::Text { text } => Some(StreamEvent::TextDelta { text: text.clone() }),
            ThinkingBlock::Compaction { summary } => {
                Some(StreamEvent::Compaction { summary: summary.clone() })
            }
            ThinkingBlock::Redacted { .. } | ThinkingBlock::ToolUse { .. } => None,
        };
        if let Some(event) = event {
            if sink.send(event).is_err() {
                warn!("stream sink closed while replaying buffered result");
                return;
            }
        }
    }
}
