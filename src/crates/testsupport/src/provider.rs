//! `MockThinkingProvider` — a scriptable `ThinkingProvider` double, in the
//! style of a `MockChatModel` test double (one fixed response per instance,
//! `clone_box` returning an independent clone sharing the same state).

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use thinking::{Result, ThinkRequest, ThinkResult, ThinkingBlock, ThinkingError, ThinkingProvider, UsageMetadata};

/// One scripted outcome: a canned result, or an error to return instead.
/// `ThinkingError` doesn't derive `Clone` (it wraps a `serde_json::Error`),
/// so this type clones by reconstructing the variant, collapsing
/// `Serialization` into `Other` since that payload can't be cloned either.
pub enum Scripted {
    Ok(ThinkResult),
    Err(ThinkingError),
}

impl Clone for Scripted {
    fn clone(&self) -> Self {
        match self {
            Scripted::Ok(result) => Scripted::Ok(result.clone()),
            Scripted::Err(error) => Scripted::Err(clone_thinking_error(error)),
        }
    }
}

fn clone_thinking_error(error: &ThinkingError) -> ThinkingError {
    match error {
        ThinkingError::InvalidInput(s) => ThinkingError::InvalidInput(s.clone()),
        ThinkingError::RateLimited(s) => ThinkingError::RateLimited(s.clone()),
        ThinkingError::AuthFailed(s) => ThinkingError::AuthFailed(s.clone()),
        ThinkingError::TimedOut(s) => ThinkingError::TimedOut(s.clone()),
        ThinkingError::Overloaded(s) => ThinkingError::Overloaded(s.clone()),
        ThinkingError::TransientOther(s) => ThinkingError::TransientOther(s.clone()),
        ThinkingError::PermanentOther(s) => ThinkingError::PermanentOther(s.clone()),
        ThinkingError::ToolMissing(s) => ThinkingError::ToolMissing(s.clone()),
        ThinkingError::Serialization(err) => ThinkingError::Other(err.to_string()),
        ThinkingError::Other(s) => ThinkingError::Other(s.clone()),
    }
}

/// What to hand back for a `think` call that doesn't match any per-style
/// rule and has nothing left in the default queue.
enum Fallback {
    Repeat(Scripted),
    Exhausted,
}

impl Clone for Fallback {
    fn clone(&self) -> Self {
        match self {
            Fallback::Repeat(scripted) => Fallback::Repeat(scripted.clone()),
            Fallback::Exhausted => Fallback::Exhausted,
        }
    }
}

/// A `ThinkingProvider` whose responses are scripted ahead of time, either
/// per matched branch style (substring match against `system_prompt`, the
/// only style signal a provider ever sees — see `think_fork::prompts`) or
/// as a plain FIFO queue for callers that don't care about style routing
/// (the orchestrator's own routing call, single-shot tests).
pub struct MockThinkingProvider {
    default_queue: Arc<Mutex<VecDeque<Scripted>>>,
    style_rules: Arc<Mutex<Vec<(&'static str, Scripted)>>>,
    style_sequences: Arc<Mutex<HashMap<&'static str, VecDeque<Scripted>>>>,
    fallback: Fallback,
    calls: Arc<Mutex<Vec<ThinkRequest>>>,
}

impl Clone for MockThinkingProvider {
    fn clone(&self) -> Self {
        Self {
            default_queue: self.default_queue.clone(),
            style_rules: self.style_rules.clone(),
            style_sequences: self.style_sequences.clone(),
            fallback: self.fallback.clone(),
            calls: self.calls.clone(),
        }
    }
}

impl MockThinkingProvider {
    pub fn new() -> Self {
        Self {
            default_queue: Arc::new(Mutex::new(VecDeque::new())),
            style_rules: Arc::new(Mutex::new(Vec::new())),
            style_sequences: Arc::new(Mutex::new(HashMap::new())),
            fallback: Fallback::Exhausted,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Always returns `text` as a single `Text` block for any call that
    /// doesn't match a style rule, with no queue exhaustion.
    pub fn always_text(text: impl Into<String>, output_tokens: u32) -> Self {
        let mut provider = Self::new();
        provider.fallback = Fallback::Repeat(Scripted::Ok(text_result(text, output_tokens)));
        provider
    }

    /// Queues one response to be returned per call, in order.
    pub fn with_queued_response(self, result: ThinkResult) -> Self {
        self.default_queue.lock().push_back(Scripted::Ok(result));
        self
    }

    pub fn with_queued_error(self, error: ThinkingError) -> Self {
        self.default_queue.lock().push_back(Scripted::Err(error));
        self
    }

    /// Scripts the response returned whenever `system_prompt` matches the
    /// given branch style's embedded prompt (checked after any style
    /// sequence, before the default queue).
    pub fn with_style_response(self, style: think_fork::BranchStyle, result: ThinkResult) -> Self {
        self.style_rules.lock().push((style_key(style), Scripted::Ok(result)));
        self
    }

    pub fn with_style_error(self, style: think_fork::BranchStyle, error: ThinkingError) -> Self {
        self.style_rules.lock().push((style_key(style), Scripted::Err(error)));
        self
    }

    /// Scripts a per-style sequence of responses consumed one-per-call, for
    /// debate rounds where a style's answer needs to change round over
    /// round (e.g. confidence climbing toward consensus). Checked before
    /// `with_style_response`'s fixed rule; once exhausted, falls through to
    /// it.
    pub fn with_style_sequence(self, style: think_fork::BranchStyle, results: Vec<ThinkResult>) -> Self {
        let queue: VecDeque<Scripted> = results.into_iter().map(Scripted::Ok).collect();
        self.style_sequences.lock().insert(debate_round_key(style), queue);
        self
    }

    /// All requests this provider instance (or any clone sharing its
    /// `Arc`s) has received, in call order.
    pub fn calls(&self) -> Vec<ThinkRequest> {
        self.calls.lock().clone()
    }

    fn resolve(&self, request: &ThinkRequest) -> Scripted {
        // Fork branches carry their style in the system prompt (see
        // `think_fork::prompts`) and are matched against it alone: the
        // comparison call's messages echo every style's conclusion as a
        // "### <style>" heading, so matching against message text there
        // would misfire. Debate rounds share one fixed system prompt and
        // carry the style only in the exact phrase
        // "your previous position (<style>" (see
        // `think_fork::debate::build_debate_prompt`), which is specific
        // enough not to collide with the comparison prompt's headings.
        let system_prompt_lower = request.system_prompt.to_lowercase();
        let mut messages_haystack = String::new();
        for message in &request.messages {
            messages_haystack.push('\n');
            messages_haystack.push_str(&message.content.to_lowercase());
        }

        {
            let mut sequences = self.style_sequences.lock();
            for (key, queue) in sequences.iter_mut() {
                if messages_haystack.contains(key) {
                    if let Some(scripted) = queue.pop_front() {
                        return scripted;
                    }
                    break;
                }
            }
        }
        for (key, scripted) in self.style_rules.lock().iter() {
            if system_prompt_lower.contains(key) {
                return scripted.clone();
            }
        }
        if let Some(scripted) = self.default_queue.lock().pop_front() {
            return scripted;
        }
        match &self.fallback {
            Fallback::Repeat(scripted) => scripted.clone(),
            Fallback::Exhausted => {
                Scripted::Err(ThinkingError::PermanentOther("mock provider queue exhausted".to_string()))
            }
        }
    }
}

impl Default for MockThinkingProvider {
    fn default() -> Self {
        Self::new()
    }
}

fn style_key(style: think_fork::BranchStyle) -> &'static str {
    match style {
        think_fork::BranchStyle::Conservative => "conservative",
        think_fork::BranchStyle::Aggressive => "aggressive",
        think_fork::BranchStyle::Balanced => "balanced",
        // The embedded contrarian prompt reads "You reason contrarily:
        // ...", which doesn't contain the substring "contrarian".
        think_fork::BranchStyle::Contrarian => "contrari",
    }
}

/// A per-style anchor matching `build_debate_prompt`'s "Your
/// previous position (<style>): ..." line exactly, so a debate-round
/// sequence lookup can't be triggered by the comparison call's "### style"
/// headings (which merely echo the style name).
fn debate_round_key(style: think_fork::BranchStyle) -> &'static str {
    match style {
        think_fork::BranchStyle::Conservative => "your previous position (conservative",
        think_fork::BranchStyle::Aggressive => "your previous position (aggressive",
        think_fork::BranchStyle::Balanced => "your previous position (balanced",
        think_fork::BranchStyle::Contrarian => "your previous position (contrarian",
    }
}

/// Convenience constructor for a single `Text` block response.
pub fn text_result(text: impl Into<String>, output_tokens: u32) -> ThinkResult {
    ThinkResult::new(vec![ThinkingBlock::Text { text: text.into() }], UsageMetadata::new(20, output_tokens, 0))
}

/// Convenience constructor for a `record_conclusion`-shaped tool-use
/// response, the tool `think_fork::branch::run_branch` looks for.
pub fn conclusion_result(
    conclusion: &str,
    confidence: f64,
    key_insights: &[&str],
    output_tokens: u32,
) -> ThinkResult {
    let input = serde_json::json!({
        "conclusion": conclusion,
        "confidence": confidence,
        "key_insights": key_insights,
        "risks": [],
        "opportunities": [],
        "assumptions": [],
    });
    ThinkResult::new(
        vec![ThinkingBlock::ToolUse { name: "record_conclusion".to_string(), input }],
        UsageMetadata::new(20, output_tokens, 0),
    )
}

/// Convenience constructor for a `record_debate_response`-shaped tool-use
/// response, the tool `think_fork::debate::run_round_entry` looks for.
pub fn debate_response_result(
    response: &str,
    confidence: f64,
    position_changed: bool,
    key_counterpoints: &[&str],
    concessions: &[&str],
    output_tokens: u32,
) -> ThinkResult {
    let input = serde_json::json!({
        "response": response,
        "confidence": confidence,
        "position_changed": position_changed,
        "key_counterpoints": key_counterpoints,
        "concessions": concessions,
    });
    ThinkResult::new(
        vec![ThinkingBlock::ToolUse { name: "record_debate_response".to_string(), input }],
        UsageMetadata::new(20, output_tokens, 0),
    )
}

/// Convenience constructor for a `create_task_plan`-shaped tool-use
/// response, the tool `orchestrator::tools::extract_task_plan` looks for.
pub fn task_plan_result(goal: &str, tasks: &[&str], output_tokens: u32) -> ThinkResult {
    let input = serde_json::json!({ "goal": goal, "tasks": tasks });
    ThinkResult::new(
        vec![ThinkingBlock::ToolUse { name: "create_task_plan".to_string(), input }],
        UsageMetadata::new(20, output_tokens, 0),
    )
}

/// Convenience constructor for a `record_comparison`-shaped tool-use
/// response, the tool `think_fork::compare::run_comparison` looks for.
/// `recommended_style` is one of the four canonical style names
/// (`"conservative"`, `"aggressive"`, `"balanced"`, `"contrarian"`).
pub fn comparison_result(
    convergence_topic: &str,
    meta_insight: &str,
    recommended_style: &str,
    recommended_rationale: &str,
    recommended_confidence: f64,
    output_tokens: u32,
) -> ThinkResult {
    let input = serde_json::json!({
        "convergence_points": [{
            "topic": convergence_topic,
            "agreement": "partial",
            "styles": ["conservative", "aggressive", "balanced", "contrarian"],
            "summary": convergence_topic,
        }],
        "divergence_points": [],
        "meta_insight": meta_insight,
        "recommended_approach": {
            "style": recommended_style,
            "rationale": recommended_rationale,
            "confidence": recommended_confidence,
        },
    });
    ThinkResult::new(
        vec![ThinkingBlock::ToolUse { name: "record_comparison".to_string(), input }],
        UsageMetadata::new(20, output_tokens, 0),
    )
}

#[async_trait]
impl ThinkingProvider for MockThinkingProvider {
    async fn think(&self, request: ThinkRequest) -> Result<ThinkResult> {
        self.calls.lock().push(request.clone());
        match self.resolve(&request) {
            Scripted::Ok(result) => Ok(result),
            Scripted::Err(error) => Err(error),
        }
    }

    fn clone_box(&self) -> Box<dyn ThinkingProvider> {
        Box::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use thinking::{Effort, Message};

    #[tokio::test]
    async fn style_rules_take_priority_over_the_default_queue() {
        let provider = MockThinkingProvider::new()
            .with_style_response(think_fork::BranchStyle::Aggressive, text_result("aggressive answer", 5))
            .with_queued_response(text_result("default answer", 5));

        let request = ThinkRequest::new(
            "You reason aggressively: favour high-upside options.",
            vec![Message::user("q")],
            Effort::Low,
        );
        let result = provider.think(request).await.unwrap();
        assert_eq!(result.final_text(), "aggressive answer");
    }

    #[tokio::test]
    async fn exhausted_queue_returns_a_permanent_error() {
        let provider = MockThinkingProvider::new();
        let request = ThinkRequest::new("sys", vec![Message::user("q")], Effort::Low);
        let result = provider.think(request).await;
        assert!(matches!(result, Err(ThinkingError::PermanentOther(_))));
    }

    #[tokio::test]
    async fn calls_are_recorded_in_order() {
        let provider = MockThinkingProvider::always_text("ok", 5);
        provider.think(ThinkRequest::new("sys", vec![Message::user("first")], Effort::Low)).await.unwrap();
        provider.think(ThinkRequest::new("sys", vec![Message::user("second")], Effort::Low)).await.unwrap();
        let calls = provider.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].messages[0].content, "first");
        assert_eq!(calls[1].messages[0].content, "second");
    }

    #[tokio::test]
    async fn style_sequence_is_consumed_in_order_and_is_independent_of_the_fork_style_rule() {
        let provider = MockThinkingProvider::new()
            .with_style_response(think_fork::BranchStyle::Aggressive, text_result("fork answer", 5))
            .with_style_sequence(
                think_fork::BranchStyle::Aggressive,
                vec![text_result("round one", 5), text_result("round two", 5)],
            )
            .with_queued_response(text_result("default answer", 5));

        // Fork call: style only in the system prompt, no style words in the
        // user message, so the sequence (matched against messages) must not
        // fire here.
        let fork_request =
            ThinkRequest::new("You reason aggressively: favour high-upside options.", vec![Message::user("q")], Effort::Low);
        let result = provider.think(fork_request).await.unwrap();
        assert_eq!(result.final_text(), "fork answer");

        // Debate rounds: fixed system prompt, style only in the message.
        let round_request =
            ThinkRequest::new("debate system prompt", vec![Message::user("Your previous position (aggressive): x")], Effort::Low);
        let first = provider.think(round_request.clone()).await.unwrap();
        assert_eq!(first.final_text(), "round one");
        let second = provider.think(round_request.clone()).await.unwrap();
        assert_eq!(second.final_text(), "round two");

        // Sequence exhausted: the fixed style rule only matches system
        // prompts that carry the style text, which a debate round's never
        // does, so this falls through to the default queue instead.
        let third = provider.think(round_request).await.unwrap();
        assert_eq!(third.final_text(), "default answer");
    }
}
