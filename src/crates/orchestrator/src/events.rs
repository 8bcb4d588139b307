//! Conversions from `think_fork`'s domain enums/results to `transport`'s
//! wire-level `StreamEvent`s, and the helpers that turn a completed
//! `ThinkForkResult`/`DebateResult` into the event sequence spec.md §5/§6
//! describe: "within a fork result, branches appear in caller-specified
//! order, not completion order."

use think_fork::{
    AgreementLevel as EngineAgreement, BranchStyle as EngineStyle, ConvergencePoint as EngineConvergence,
    DebateResult, DivergencePoint as EngineDivergence, RecommendedApproach as EngineRecommendation,
    Significance as EngineSignificance, StylePosition as EngineStylePosition, ThinkForkResult,
};
use transport::{
    AgreementLevel as WireAgreement, BranchStyle as WireStyle, ConvergencePoint as WireConvergence,
    DivergencePoint as WireDivergence, RecommendedApproach as WireRecommendation, Significance as WireSignificance,
    StreamEvent, StreamMode, StylePosition as WireStylePosition,
};

fn style_to_wire(style: EngineStyle) -> WireStyle {
    match style {
        EngineStyle::Conservative => WireStyle::Conservative,
        EngineStyle::Aggressive => WireStyle::Aggressive,
        EngineStyle::Balanced => WireStyle::Balanced,
        EngineStyle::Contrarian => WireStyle::Contrarian,
    }
}

fn agreement_to_wire(agreement: EngineAgreement) -> WireAgreement {
    match agreement {
        EngineAgreement::Full => WireAgreement::Full,
        EngineAgreement::Partial => WireAgreement::Partial,
        EngineAgreement::None => WireAgreement::None,
    }
}

fn significance_to_wire(significance: EngineSignificance) -> WireSignificance {
    match significance {
        EngineSignificance::High => WireSignificance::High,
        EngineSignificance::Medium => WireSignificance::Medium,
        EngineSignificance::Low => WireSignificance::Low,
    }
}

fn convergence_to_wire(point: &EngineConvergence) -> WireConvergence {
    WireConvergence {
        topic: point.topic.clone(),
        agreement: agreement_to_wire(point.agreement),
        styles: point.styles.iter().copied().map(style_to_wire).collect(),
        summary: point.summary.clone(),
    }
}

fn style_position_to_wire(position: &EngineStylePosition) -> WireStylePosition {
    WireStylePosition { style: style_to_wire(position.style), position: position.position.clone() }
}

fn divergence_to_wire(point: &EngineDivergence) -> WireDivergence {
    WireDivergence {
        topic: point.topic.clone(),
        positions: point.positions.iter().map(style_position_to_wire).collect(),
        significance: significance_to_wire(point.significance),
        recommendation: point.recommendation.clone(),
    }
}

fn recommendation_to_wire(recommendation: &EngineRecommendation) -> WireRecommendation {
    WireRecommendation {
        style: style_to_wire(recommendation.style),
        rationale: recommendation.rationale.clone(),
        confidence: recommendation.confidence,
    }
}

/// Builds the `fork:start` .. `comparison:complete` event sequence for a
/// completed fork, in style order (spec.md §5 causal ordering guarantee).
pub fn fork_events(result: &ThinkForkResult) -> Vec<StreamEvent> {
    let mut events = Vec::with_capacity(result.branches.len() * 2 + 2);
    let styles: Vec<WireStyle> = result.branches.iter().map(|b| style_to_wire(b.style)).collect();
    let total = result.branches.len() as u32;

    events.push(StreamEvent::ForkStart { styles, mode: StreamMode::Fork });

    for (index, branch) in result.branches.iter().enumerate() {
        let style = style_to_wire(branch.style);
        events.push(StreamEvent::BranchStart { style, index: index as u32, total });
        if let Some(error) = &branch.error {
            events.push(StreamEvent::BranchError { style, error: error.clone() });
        } else {
            events.push(StreamEvent::BranchComplete {
                style,
                conclusion: branch.conclusion.clone(),
                confidence: branch.confidence,
                key_insights: branch.key_insights.clone(),
                risks: branch.risks.clone(),
                opportunities: branch.opportunities.clone(),
                assumptions: branch.assumptions.clone(),
            });
        }
    }

    events.push(StreamEvent::ComparisonStart);
    events.push(StreamEvent::ComparisonComplete {
        convergence_points: result.convergence_points.iter().map(convergence_to_wire).collect(),
        divergence_points: result.divergence_points.iter().map(divergence_to_wire).collect(),
        meta_insight: result.meta_insight.clone(),
        recommended_approach: result.recommended_approach.as_ref().map(recommendation_to_wire),
    });

    events
}

/// Builds the `debate:start` .. `debate:round_complete` event sequence,
/// grouping entries by round in the order rounds actually ran.
pub fn debate_events(result: &DebateResult) -> Vec<StreamEvent> {
    let total_rounds = result.rounds.iter().map(|entry| entry.round).max().unwrap_or(0);
    let mut events = Vec::with_capacity(result.rounds.len() * 2 + 1);
    events.push(StreamEvent::DebateStart { total_rounds });

    let mut current_round = None;
    for entry in &result.rounds {
        if current_round != Some(entry.round) {
            if let Some(finished) = current_round {
                events.push(StreamEvent::DebateRoundComplete { round: finished });
            }
            current_round = Some(entry.round);
        }
        let style = style_to_wire(entry.style);
        events.push(StreamEvent::DebateEntryStart { round: entry.round, style });
        events.push(StreamEvent::DebateEntryComplete {
            round: entry.round,
            style,
            response: entry.response.clone(),
            confidence: entry.confidence,
            position_changed: entry.position_changed,
            key_counterpoints: entry.key_counterpoints.clone(),
            concessions: entry.concessions.clone(),
        });
    }
    if let Some(finished) = current_round {
        events.push(StreamEvent::DebateRoundComplete { round: finished });
    }

    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use think_fork::ForkBranchResult;

    #[test]
    fn fork_events_preserve_branch_order_and_bracket_with_comparison() {
        let result = ThinkForkResult {
            query: "q".into(),
            branches: vec![
                ForkBranchResult {
                    style: EngineStyle::Contrarian,
                    conclusion: "c".into(),
                    confidence: 0.5,
                    key_insights: vec![],
                    risks: vec![],
                    opportunities: vec![],
                    assumptions: vec![],
                    tokens: 10,
                    duration_ms: 5,
                    error: None,
                },
                ForkBranchResult::failed(EngineStyle::Conservative, "boom", 3),
            ],
            convergence_points: vec![],
            divergence_points: vec![],
            meta_insight: "meta".into(),
            recommended_approach: None,
            total_tokens: 10,
            total_duration_ms: 8,
            errors: vec!["boom".into()],
            fallback_prompts_used: vec![],
            applied_human_guidance: vec![],
        };

        let events = fork_events(&result);
        assert!(matches!(events[0], StreamEvent::ForkStart { .. }));
        assert!(matches!(
            events[1],
            StreamEvent::BranchStart { style: WireStyle::Contrarian, index: 0, .. }
        ));
        assert!(matches!(events[2], StreamEvent::BranchComplete { style: WireStyle::Contrarian, .. }));
        assert!(matches!(
            events[3],
            StreamEvent::BranchStart { style: WireStyle::Conservative, index: 1, .. }
        ));
        assert!(matches!(events[4], StreamEvent::BranchError { style: WireStyle::Conservative, .. }));
        assert!(matches!(events.last(), Some(StreamEvent::ComparisonComplete { .. })));
    }
}
