//! Post-fork, human-driven steering actions.

use crate::error::{ForkError, Result};
use crate::style::BranchStyle;
use crate::types::{SteeringActionKind, SteeringResult};
use std::sync::Arc;
use std::time::Instant;
use thinking::{Effort, EngineRequest, Message, ThinkingEngine, ThinkingProvider};

const STEERING_SYSTEM_PROMPT: &str = "You continue a prior line of reasoning in response to explicit human direction.";

async fn run_steering_call(
    provider: Arc<dyn ThinkingProvider>,
    effort: Effort,
    action: SteeringActionKind,
    prompt: String,
) -> Result<SteeringResult> {
    let engine = ThinkingEngine::new(provider, thinking::ThinkingMode::Adaptive, effort);
    let request = EngineRequest::new(STEERING_SYSTEM_PROMPT, vec![Message::user(prompt)]).with_effort(effort);

    let started = Instant::now();
    let think_result = engine.think(request).await?;
    let duration_ms = started.elapsed().as_millis() as u64;

    let key_insights: Vec<String> = think_result
        .text_blocks()
        .filter_map(|b| match b {
            thinking::ThinkingBlock::Text { text } => Some(text.clone()),
            _ => None,
        })
        .collect();

    Ok(SteeringResult {
        action,
        result: think_result.final_text(),
        confidence: 0.5,
        key_insights,
        tokens_used: think_result.usage.total_tokens,
        duration_ms,
    })
}

pub async fn expand(
    provider: Arc<dyn ThinkingProvider>,
    effort: Effort,
    style: BranchStyle,
    prior_conclusion: &str,
    direction: Option<&str>,
) -> Result<SteeringResult> {
    let prompt = match direction {
        Some(direction) => format!(
            "As the {style} reasoning style, expand on this conclusion with a focus on: {direction}\n\nPrior conclusion: {prior_conclusion}"
        ),
        None => format!("As the {style} reasoning style, expand on this conclusion in more depth:\n\n{prior_conclusion}"),
    };
    run_steering_call(provider, effort, SteeringActionKind::Expand, prompt).await
}

pub async fn merge(
    provider: Arc<dyn ThinkingProvider>,
    effort: Effort,
    styles: &[(BranchStyle, String)],
    focus: Option<&str>,
) -> Result<SteeringResult> {
    if styles.len() < 2 {
        return Err(ForkError::InvalidInput("merge requires at least two styles".to_string()));
    }
    let positions = styles
        .iter()
        .map(|(style, conclusion)| format!("- {style}: {conclusion}"))
        .collect::<Vec<_>>()
        .join("\n");
    let prompt = match focus {
        Some(focus) => format!("Synthesise a single merged conclusion from these positions, focusing on {focus}:\n{positions}"),
        None => format!("Synthesise a single merged conclusion from these positions:\n{positions}"),
    };
    run_steering_call(provider, effort, SteeringActionKind::Merge, prompt).await
}

pub async fn challenge(
    provider: Arc<dyn ThinkingProvider>,
    effort: Effort,
    style: BranchStyle,
    prior_conclusion: &str,
    challenge_text: &str,
) -> Result<SteeringResult> {
    let prompt = format!(
        "As the {style} reasoning style, respond to this challenge to your conclusion.\n\nYour conclusion: {prior_conclusion}\n\nChallenge: {challenge_text}"
    );
    run_steering_call(provider, effort, SteeringActionKind::Challenge, prompt).await
}

pub async fn refork(
    provider: Arc<dyn ThinkingProvider>,
    effort: Effort,
    style: BranchStyle,
    prior_conclusion: &str,
    new_context: &str,
) -> Result<SteeringResult> {
    let prompt = format!(
        "As the {style} reasoning style, reconsider your conclusion in light of new context.\n\nPrior conclusion: {prior_conclusion}\n\nNew context: {new_context}"
    );
    run_steering_call(provider, effort, SteeringActionKind::Refork, prompt).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use thinking::{ThinkRequest, ThinkResult, ThinkingBlock, UsageMetadata};

    #[derive(Clone)]
    struct StubProvider;

    #[async_trait]
    impl ThinkingProvider for StubProvider {
        async fn think(&self, _request: ThinkRequest) -> thinking::Result<ThinkResult> {
            Ok(ThinkResult::new(
                vec![ThinkingBlock::Text { text: "merged view".into() }],
                UsageMetadata::new(10, 5, 0),
            ))
        }

        fn clone_box(&self) -> Box<dyn ThinkingProvider> {
            Box::new(self.clone())
        }
    }

    #[tokio::test]
    async fn merge_rejects_fewer_than_two_styles() {
        let provider: Arc<dyn ThinkingProvider> = Arc::new(StubProvider);
        let styles = vec![(BranchStyle::Conservative, "conclusion".to_string())];
        let result = merge(provider, Effort::Medium, &styles, None).await;
        assert!(matches!(result, Err(ForkError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn merge_with_two_styles_returns_result_text() {
        let provider: Arc<dyn ThinkingProvider> = Arc::new(StubProvider);
        let styles = vec![
            (BranchStyle::Conservative, "be careful".to_string()),
            (BranchStyle::Aggressive, "go big".to_string()),
        ];
        let result = merge(provider, Effort::Medium, &styles, Some("risk")).await.unwrap();
        assert_eq!(result.result, "merged view");
        assert_eq!(result.action, SteeringActionKind::Merge);
    }
}
