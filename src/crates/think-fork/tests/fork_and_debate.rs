//! Integration tests exercising `ThinkForkEngine` directly (no
//! `Orchestrator` in the loop), fixtures from `testsupport::scenarios`
//! and the standalone builders in `testsupport::provider`.

use std::sync::Arc;
use testsupport::{comparison_result, conclusion_result, debate_response_result, scenarios};
use think_fork::{BranchStyle, DebateOptions, ForkError, ForkOptions, ThinkForkEngine};
use thinking::ThinkingProvider;

fn engine_for(provider: testsupport::MockThinkingProvider) -> ThinkForkEngine {
    let provider: Arc<dyn ThinkingProvider> = Arc::new(provider);
    ThinkForkEngine::new(provider)
}

#[tokio::test]
async fn fork_with_all_four_styles_succeeding_produces_a_recommendation() {
    let (query, provider) = scenarios::four_style_fork_all_succeed();
    let engine = engine_for(provider);

    let result = engine.fork(&query, &ForkOptions::new()).await.unwrap();

    assert_eq!(result.branches.len(), 4);
    assert!(result.errors.is_empty());
    assert!(result.recommended_approach.is_some());
    assert_eq!(result.recommended_approach.unwrap().style, BranchStyle::Balanced);
}

#[tokio::test]
async fn a_failed_branch_is_recorded_with_zero_confidence_and_no_insights() {
    let (query, provider) = scenarios::branch_failure_mid_fork();
    let engine = engine_for(provider);

    let result = engine.fork(&query, &ForkOptions::new()).await.unwrap();

    assert_eq!(result.branches.len(), 4);
    assert_eq!(result.errors.len(), 1);
    let failed = result.branches.iter().find(|b| b.style == BranchStyle::Aggressive).unwrap();
    assert!(failed.error.is_some());
    assert_eq!(failed.confidence, 0.0);
    assert!(failed.key_insights.is_empty());
}

#[tokio::test]
async fn a_single_surviving_branch_is_trivially_its_own_recommendation() {
    let provider = testsupport::MockThinkingProvider::new()
        .with_style_response(BranchStyle::Conservative, conclusion_result("Stay the course.", 0.7, &["low risk"], 30))
        .with_style_error(BranchStyle::Aggressive, thinking::ThinkingError::RateLimited("429".to_string()))
        .with_style_error(BranchStyle::Balanced, thinking::ThinkingError::RateLimited("429".to_string()))
        .with_style_error(BranchStyle::Contrarian, thinking::ThinkingError::RateLimited("429".to_string()));
    let engine = engine_for(provider);

    let result = engine.fork("Should we pivot?", &ForkOptions::new()).await.unwrap();

    assert_eq!(result.errors.len(), 3);
    let recommended = result.recommended_approach.unwrap();
    assert_eq!(recommended.style, BranchStyle::Conservative);
    assert_eq!(recommended.confidence, 0.7);
    assert_eq!(result.convergence_points.len(), 1);
    assert!(result.divergence_points.is_empty());
}

#[tokio::test]
async fn comparison_failure_falls_back_to_the_basic_meta_insight_and_tie_break_rule() {
    // No comparison response queued: the comparison call's queue is
    // empty, so it surfaces the mock's exhausted-queue error and
    // `synthesise` falls back rather than propagating it. With no
    // comparison output to draw a recommendation from, the tie-break rule
    // (highest confidence, ties by canonical order) picks one instead of
    // leaving callers with nothing.
    let query = "Should we pivot B2C to B2B?";
    let provider = testsupport::MockThinkingProvider::new()
        .with_style_response(BranchStyle::Conservative, conclusion_result("Stay B2C.", 0.6, &["sales cycle risk"], 40))
        .with_style_response(BranchStyle::Aggressive, conclusion_result("Pivot now.", 0.8, &["bigger deals"], 42))
        .with_style_response(BranchStyle::Balanced, conclusion_result("Pilot both.", 0.7, &["de-risked rollout"], 38))
        .with_style_response(BranchStyle::Contrarian, conclusion_result("Stay focused.", 0.5, &["brand dilution"], 35));
    let engine = engine_for(provider);

    let result = engine.fork(query, &ForkOptions::new()).await.unwrap();

    assert_eq!(result.branches.len(), 4);
    let recommended = result.recommended_approach.unwrap();
    assert_eq!(recommended.style, BranchStyle::Aggressive);
    assert_eq!(recommended.confidence, 0.8);
    assert!(!result.meta_insight.is_empty());
}

#[tokio::test]
async fn an_explicit_single_style_is_rejected() {
    let provider = testsupport::MockThinkingProvider::new();
    let engine = engine_for(provider);

    let err = engine.fork("a query", &ForkOptions::new().with_styles(vec![BranchStyle::Balanced])).await.unwrap_err();
    assert!(matches!(err, ForkError::InvalidInput(_)));
}

#[tokio::test]
async fn an_empty_query_is_rejected_before_any_provider_call() {
    let provider = testsupport::MockThinkingProvider::new();
    let mock = provider.clone();
    let engine = engine_for(provider);

    let err = engine.fork("   ", &ForkOptions::new()).await.unwrap_err();
    assert!(matches!(err, ForkError::InvalidInput(_)));
    assert!(mock.calls().is_empty());
}

#[tokio::test]
async fn debate_converges_to_a_high_confidence_consensus_by_round_two() {
    let (query, provider) = scenarios::debate_converges();
    let engine = engine_for(provider);

    let result = engine.debate(&query, &DebateOptions::new(2)).await.unwrap();

    assert_eq!(result.rounds.len(), 8);
    let consensus = result.consensus.unwrap();
    assert!(consensus.contains("phased"));
    assert!(result.consensus_confidence.unwrap() >= 0.7);
}

#[tokio::test]
async fn a_debate_that_keeps_moving_position_reports_no_consensus() {
    let provider = testsupport::MockThinkingProvider::new()
        .with_style_response(BranchStyle::Conservative, conclusion_result("Stay B2C.", 0.5, &[], 20))
        .with_style_response(BranchStyle::Aggressive, conclusion_result("Pivot now.", 0.5, &[], 20))
        .with_style_response(BranchStyle::Balanced, conclusion_result("Pilot both.", 0.5, &[], 20))
        .with_style_response(BranchStyle::Contrarian, conclusion_result("Stay focused.", 0.5, &[], 20))
        .with_style_sequence(
            BranchStyle::Conservative,
            vec![debate_response_result("Still holding out.", 0.55, true, &["noted"], &[], 15)],
        )
        .with_style_sequence(
            BranchStyle::Aggressive,
            vec![debate_response_result("Still pushing to pivot.", 0.55, true, &["noted"], &[], 15)],
        )
        .with_style_sequence(
            BranchStyle::Balanced,
            vec![debate_response_result("Leaning toward a pilot.", 0.55, true, &["noted"], &[], 15)],
        )
        .with_style_sequence(
            BranchStyle::Contrarian,
            vec![debate_response_result("Still unconvinced.", 0.55, true, &["noted"], &[], 15)],
        );
    let engine = engine_for(provider);

    let result = engine.debate("Should we pivot B2C to B2B?", &DebateOptions::new(1)).await.unwrap();

    assert_eq!(result.rounds.len(), 4);
    assert!(result.consensus.is_none());
}

#[tokio::test]
async fn debate_rounds_outside_the_one_to_five_range_are_rejected() {
    let provider = testsupport::MockThinkingProvider::new();
    let engine = engine_for(provider);

    let err = engine.debate("a query", &DebateOptions::new(6)).await.unwrap_err();
    assert!(matches!(err, ForkError::InvalidInput(_)));
}

#[tokio::test]
async fn a_trivial_comparison_helper_builds_a_parseable_recommendation() {
    // Smoke-checks `comparison_result`'s payload shape directly against a
    // two-branch fork so the helper's field names stay honest even when
    // no scenario in `testsupport::scenarios` exercises it standalone.
    let provider = testsupport::MockThinkingProvider::new()
        .with_style_response(BranchStyle::Conservative, conclusion_result("Stay put.", 0.6, &["low risk"], 20))
        .with_style_response(BranchStyle::Aggressive, conclusion_result("Move fast.", 0.8, &["big upside"], 20))
        .with_queued_response(comparison_result(
            "both branches agree the market is shifting",
            "aggressive and conservative diverge mainly on timing",
            "aggressive",
            "the upside outweighs the risk here",
            0.8,
            20,
        ));
    let engine = engine_for(provider);

    let result = engine.fork("Should we move fast?", &ForkOptions::new().with_styles(vec![BranchStyle::Conservative, BranchStyle::Aggressive])).await.unwrap();

    let recommended = result.recommended_approach.unwrap();
    assert_eq!(recommended.style, BranchStyle::Aggressive);
    assert_eq!(recommended.confidence, 0.8);
    assert_eq!(result.convergence_points.len(), 1);
}
