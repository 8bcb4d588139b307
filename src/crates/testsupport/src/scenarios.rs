//! Builders for the end-to-end scenarios named in spec.md §8, each
//! returning a `MockThinkingProvider` pre-scripted to drive that scenario.
//! Assertions live in each crate's own `tests/` directory; these builders
//! only own the fixture setup so it isn't duplicated across suites.

use crate::provider::{comparison_result, conclusion_result, debate_response_result, task_plan_result, text_result, MockThinkingProvider};
use thinking::ThinkingError;

/// Scenario 1: a simple greeting. One cheap response, low token cost.
pub fn simple_greeting() -> (String, MockThinkingProvider) {
    ("Hi".to_string(), MockThinkingProvider::always_text("Hello! How can I help?", 8))
}

/// Scenario 2: a complex debug query that should produce a `TaskPlan` via
/// `create_task_plan`.
pub fn complex_debug_query() -> (String, MockThinkingProvider) {
    let query = "Debug and refactor this pipeline for lower latency, step by step.".to_string();
    let provider = MockThinkingProvider::new().with_queued_response(task_plan_result(
        "reduce pipeline latency",
        &["profile the hot path", "remove redundant serialization", "re-measure"],
        120,
    ));
    (query, provider)
}

/// Scenario 3: all four styles succeed on a pivot question.
pub fn four_style_fork_all_succeed() -> (String, MockThinkingProvider) {
    let query = "Should we pivot B2C to B2B?".to_string();
    let provider = MockThinkingProvider::new()
        .with_style_response(
            think_fork::BranchStyle::Conservative,
            conclusion_result("Stay B2C; B2B requires capabilities we lack.", 0.6, &["sales cycle risk"], 40),
        )
        .with_style_response(
            think_fork::BranchStyle::Aggressive,
            conclusion_result("Pivot now; B2B contracts dwarf B2C revenue per customer.", 0.8, &["bigger deals"], 42),
        )
        .with_style_response(
            think_fork::BranchStyle::Balanced,
            conclusion_result("Pilot B2B alongside B2C before committing fully.", 0.7, &["de-risked rollout"], 38),
        )
        .with_style_response(
            think_fork::BranchStyle::Contrarian,
            conclusion_result("The B2C base is the real asset; don't dilute focus.", 0.5, &["brand dilution"], 35),
        )
        .with_queued_response(comparison_result(
            "all styles agree B2B carries more revenue per deal",
            "the aggressive and balanced branches converge on piloting B2B",
            "balanced",
            "a piloted rollout captures the aggressive branch's upside without the contrarian branch's brand risk",
            0.75,
            45,
        ));
    (query, provider)
}

/// Scenario 4: the aggressive branch fails with a rate limit; the other
/// three still succeed and comparison still runs (>= 2 survivors).
pub fn branch_failure_mid_fork() -> (String, MockThinkingProvider) {
    let query = "Should we pivot B2C to B2B?".to_string();
    let provider = MockThinkingProvider::new()
        .with_style_response(
            think_fork::BranchStyle::Conservative,
            conclusion_result("Stay B2C for now.", 0.6, &["sales cycle risk"], 40),
        )
        .with_style_error(think_fork::BranchStyle::Aggressive, ThinkingError::RateLimited("429".to_string()))
        .with_style_response(
            think_fork::BranchStyle::Balanced,
            conclusion_result("Pilot both channels.", 0.7, &["de-risked rollout"], 38),
        )
        .with_style_response(
            think_fork::BranchStyle::Contrarian,
            conclusion_result("Don't dilute the B2C brand.", 0.5, &["brand dilution"], 35),
        )
        .with_queued_response(comparison_result(
            "the surviving branches agree a phased rollout is lowest-risk",
            "three of four branches favour a phased B2B pilot",
            "balanced",
            "the balanced branch's phased pilot is the only position all three survivors can live with",
            0.7,
            42,
        ));
    (query, provider)
}

/// Scenario 5: a debate that converges by round two. `debate()` first runs
/// a fork to establish initial positions (`record_conclusion`, below
/// threshold), then drives two rounds of `record_debate_response` per
/// style: round one still moves position, round two settles above the
/// 0.7 consensus threshold with no further change.
pub fn debate_converges() -> (String, MockThinkingProvider) {
    let query = "Should we pivot B2C to B2B?".to_string();
    let provider = MockThinkingProvider::new()
        .with_style_response(
            think_fork::BranchStyle::Conservative,
            conclusion_result("Stay B2C for now.", 0.55, &["sales cycle risk"], 30),
        )
        .with_style_response(
            think_fork::BranchStyle::Aggressive,
            conclusion_result("Pivot to B2B.", 0.6, &["bigger deals"], 30),
        )
        .with_style_response(
            think_fork::BranchStyle::Balanced,
            conclusion_result("Pilot both.", 0.65, &["de-risked rollout"], 30),
        )
        .with_style_response(
            think_fork::BranchStyle::Contrarian,
            conclusion_result("Don't dilute the brand.", 0.55, &["brand dilution"], 30),
        )
        .with_style_sequence(
            think_fork::BranchStyle::Conservative,
            vec![
                debate_response_result("Conceding some ground on timing.", 0.68, true, &["bigger deals are real"], &["timing could work"], 25),
                debate_response_result("A phased B2B pilot alongside B2C is acceptable.", 0.75, false, &[], &["agree on phased rollout"], 22),
            ],
        )
        .with_style_sequence(
            think_fork::BranchStyle::Aggressive,
            vec![
                debate_response_result("Still favour pivoting, but a pilot first is reasonable.", 0.72, true, &["sales cycle risk is real"], &["accept a pilot phase"], 25),
                debate_response_result("A phased B2B pilot alongside B2C is acceptable.", 0.78, false, &[], &["agree on phased rollout"], 22),
            ],
        )
        .with_style_sequence(
            think_fork::BranchStyle::Balanced,
            vec![
                debate_response_result("The pilot framing is gaining consensus.", 0.74, false, &[], &[], 20),
                debate_response_result("A phased B2B pilot alongside B2C is acceptable.", 0.8, false, &[], &[], 20),
            ],
        )
        .with_style_sequence(
            think_fork::BranchStyle::Contrarian,
            vec![
                debate_response_result("Conceding that a bounded pilot wouldn't dilute the brand.", 0.66, true, &["bigger deals are real"], &["a bounded pilot is low-risk"], 25),
                debate_response_result("A phased B2B pilot alongside B2C is acceptable.", 0.72, false, &[], &["agree on phased rollout"], 22),
            ],
        );
    (query, provider)
}

/// Scenario 6: a session that reaches its output-token budget mid-session.
/// One response queued: the caller's first `process` call consumes it and
/// pushes cumulative usage to (or past) a small configured cap; a second
/// call must short-circuit on the budget gate before reaching the provider
/// at all, whose queue is now empty so an unintended provider call fails
/// loudly instead of silently succeeding.
pub fn budget_exhausted_mid_session() -> (String, MockThinkingProvider) {
    let query = "first message".to_string();
    let provider = MockThinkingProvider::new().with_queued_response(text_result("first answer", 50));
    (query, provider)
}

/// A plain single-response provider for tests that just need *a* response,
/// with no scenario semantics attached.
pub fn trivial_response(text: &str) -> MockThinkingProvider {
    MockThinkingProvider::always_text(text, 10)
}
