//! Execution of a single fork branch.

use crate::coerce::{coerce_confidence, coerce_string, coerce_string_array};
use crate::options::ForkOptions;
use crate::prompts::{resolve_prompt, PromptRegistry};
use crate::style::BranchStyle;
use crate::tools::record_conclusion;
use crate::types::ForkBranchResult;
use std::sync::Arc;
use std::time::Instant;
use thinking::{EngineRequest, Message, ThinkingEngine, ThinkingProvider};

/// Fixed delimiters composing a branch's user message: guidance block (if
/// any), then additional context (if any), then the query itself.
pub fn compose_user_message(guidance: Option<&str>, additional_context: Option<&str>, query: &str) -> String {
    let mut parts = Vec::new();
    if let Some(guidance) = guidance {
        parts.push(format!("=== HUMAN GUIDANCE ===\n{guidance}"));
    }
    if let Some(context) = additional_context {
        parts.push(format!("=== ADDITIONAL CONTEXT ===\n{context}"));
    }
    parts.push(format!("=== QUERY ===\n{query}"));
    parts.join("\n\n")
}

/// Outcome of building and dispatching a single branch, including whether
/// the embedded prompt fallback fired and whether human guidance applied.
pub struct BranchOutcome {
    pub result: ForkBranchResult,
    pub used_fallback_prompt: bool,
    pub applied_guidance: bool,
}

pub async fn run_branch(
    provider: Arc<dyn ThinkingProvider>,
    registry: &dyn PromptRegistry,
    style: BranchStyle,
    query: &str,
    options: &ForkOptions,
) -> BranchOutcome {
    let (system_prompt, used_fallback_prompt) = resolve_prompt(registry, style);
    let guidance = options.branch_guidance.get(&style).map(String::as_str);
    let applied_guidance = guidance.is_some();
    let user_message = compose_user_message(guidance, options.additional_context.as_deref(), query);

    let engine = ThinkingEngine::new(provider, thinking::ThinkingMode::Adaptive, options.effort);
    let request = EngineRequest::new(system_prompt, vec![Message::user(user_message)])
        .with_tools(vec![record_conclusion()])
        .with_effort(options.effort);

    let started = Instant::now();
    let outcome = match engine.think(request).await {
        Ok(think_result) => {
            let duration_ms = started.elapsed().as_millis() as u64;
            let tokens = think_result.usage.total_tokens;
            parse_branch_result(style, think_result, tokens, duration_ms)
        }
        Err(err) => ForkBranchResult::failed(style, err.to_string(), started.elapsed().as_millis() as u64),
    };

    BranchOutcome {
        result: outcome,
        used_fallback_prompt,
        applied_guidance,
    }
}

fn parse_branch_result(
    style: BranchStyle,
    think_result: thinking::ThinkResult,
    tokens: u32,
    duration_ms: u64,
) -> ForkBranchResult {
    let tool_call = think_result.tool_uses().find_map(|block| match block {
        thinking::ThinkingBlock::ToolUse { name, input } if name == "record_conclusion" => Some(input),
        _ => None,
    });

    let Some(input) = tool_call else {
        return ForkBranchResult::failed(style, "Model did not provide structured conclusion", duration_ms);
    };

    ForkBranchResult {
        style,
        conclusion: coerce_string(input.get("conclusion"), ""),
        confidence: coerce_confidence(input.get("confidence")),
        key_insights: coerce_string_array(input.get("key_insights")),
        risks: coerce_string_array(input.get("risks")),
        opportunities: coerce_string_array(input.get("opportunities")),
        assumptions: coerce_string_array(input.get("assumptions")),
        tokens,
        duration_ms,
        error: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compose_message_includes_only_supplied_sections() {
        let message = compose_user_message(None, None, "the query");
        assert_eq!(message, "=== QUERY ===\nthe query");

        let full = compose_user_message(Some("be careful"), Some("extra facts"), "the query");
        assert!(full.contains("=== HUMAN GUIDANCE ===\nbe careful"));
        assert!(full.contains("=== ADDITIONAL CONTEXT ===\nextra facts"));
        assert!(full.ends_with("=== QUERY ===\nthe query"));
    }
}
