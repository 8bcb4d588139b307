//! End-to-end scenarios driven through `Orchestrator`, fixtures from
//! `testsupport::scenarios`.

use orchestrator::{EngineConfig, Orchestrator};
use std::sync::Arc;
use testsupport::scenarios;
use thinking::{Effort, ThinkingProvider};
use think_fork::{DebateOptions, ForkOptions};
use uuid::Uuid;

#[tokio::test]
async fn simple_greeting_gets_a_direct_response_at_low_effort() {
    let (query, provider) = scenarios::simple_greeting();
    let provider: Arc<dyn ThinkingProvider> = Arc::new(provider);
    let orchestrator = Orchestrator::new(provider, EngineConfig::default());

    let result = orchestrator.process(Uuid::new_v4(), &query).await.unwrap();
    assert_eq!(result.response, "Hello! How can I help?");
    assert!(!result.degraded);
    assert!(result.persistence_issues.is_empty());
}

#[tokio::test]
async fn complex_query_is_routed_at_max_effort_with_planning_tools() {
    let (query, provider) = scenarios::complex_debug_query();
    let mock = provider.clone();
    let provider: Arc<dyn ThinkingProvider> = Arc::new(provider);
    let orchestrator = Orchestrator::new(provider, EngineConfig::default());

    orchestrator.process(Uuid::new_v4(), &query).await.unwrap();

    let calls = mock.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].effort, Effort::Max);
    let tool_names: Vec<&str> = calls[0].tools.as_ref().unwrap().iter().map(|t| t.name.as_str()).collect();
    assert!(tool_names.contains(&"create_task_plan"));
}

#[tokio::test]
async fn four_style_fork_reports_every_branch_and_a_recommendation() {
    let (query, provider) = scenarios::four_style_fork_all_succeed();
    let provider: Arc<dyn ThinkingProvider> = Arc::new(provider);
    let orchestrator = Orchestrator::new(provider, EngineConfig::default());

    let (result, events) = orchestrator.fork(&query, &ForkOptions::new()).await.unwrap();

    assert_eq!(result.branches.len(), 4);
    assert!(result.errors.is_empty());
    assert!(result.recommended_approach.is_some());

    // First event opens the fork, last event closes the comparison.
    assert!(matches!(events.first(), Some(transport::StreamEvent::ForkStart { .. })));
    assert!(matches!(events.last(), Some(transport::StreamEvent::ComparisonComplete { .. })));
}

#[tokio::test]
async fn branch_failure_still_yields_a_recommendation_from_survivors() {
    let (query, provider) = scenarios::branch_failure_mid_fork();
    let provider: Arc<dyn ThinkingProvider> = Arc::new(provider);
    let orchestrator = Orchestrator::new(provider, EngineConfig::default());

    let (result, events) = orchestrator.fork(&query, &ForkOptions::new()).await.unwrap();

    assert_eq!(result.branches.len(), 4);
    assert_eq!(result.errors.len(), 1);
    assert!(result.recommended_approach.is_some());
    assert!(events.iter().any(|event| matches!(event, transport::StreamEvent::BranchError { .. })));
}

#[tokio::test]
async fn debate_reaches_consensus_when_confidence_climbs_and_settles() {
    let (query, provider) = scenarios::debate_converges();
    let provider: Arc<dyn ThinkingProvider> = Arc::new(provider);
    let orchestrator = Orchestrator::new(provider, EngineConfig::default());

    let (result, events) = orchestrator.debate(&query, &DebateOptions::new(2)).await.unwrap();

    // Two rounds across four styles, flattened into one list.
    assert_eq!(result.rounds.len(), 8);
    assert!(result.consensus.is_some());
    assert!(events.iter().any(|event| matches!(event, transport::StreamEvent::DebateRoundComplete { .. })));
}

#[tokio::test]
async fn budget_exhaustion_short_circuits_before_any_further_provider_call() {
    let mut config = EngineConfig::default();
    config.token_budget.max_session_output_tokens = 10;
    config.token_budget.warn_at_percent = 50.0;

    let (query, provider) = scenarios::budget_exhausted_mid_session();
    let mock = provider.clone();
    let provider: Arc<dyn ThinkingProvider> = Arc::new(provider);
    let orchestrator = Orchestrator::new(provider, config);
    let session_id = Uuid::new_v4();

    let first = orchestrator.process(session_id, &query).await.unwrap();
    assert_eq!(first.response, "first answer");

    // Budget is now exhausted (50 >= 10). A second call must short-circuit
    // on the budget gate rather than reach the provider: the mock's queue
    // is already empty, so any further call would surface its own
    // "queue exhausted" error instead of the budget message.
    let second = orchestrator.process(session_id, "second message").await.unwrap();
    assert!(second.response.to_lowercase().contains("budget"));
    assert_eq!(mock.calls().len(), 1);
}
