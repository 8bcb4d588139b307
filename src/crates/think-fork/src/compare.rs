//! The comparison call (convergence/divergence synthesis) and the
//! basic-meta-insight fallback used when comparison cannot run.

use crate::coerce::{coerce_bool, coerce_confidence, coerce_string, coerce_string_array};
use crate::style::BranchStyle;
use crate::tools::record_comparison;
use crate::types::{AgreementLevel, ConvergencePoint, DivergencePoint, ForkBranchResult, RecommendedApproach, Significance, StylePosition};
use std::sync::Arc;
use thinking::{Effort, EngineRequest, Message, ThinkingEngine, ThinkingProvider};

const COMPARISON_SYSTEM_PROMPT: &str = "You compare several independent analyses of the same question and \
identify where they converge, where they diverge, and which approach you would recommend.";

fn build_comparison_prompt(branches: &[ForkBranchResult]) -> String {
    let mut sections = Vec::new();
    for branch in branches {
        sections.push(format!(
            "### {}\nConclusion: {}\nKey insights: {}\nRisks: {}\nOpportunities: {}\nAssumptions: {}",
            branch.style,
            branch.conclusion,
            branch.key_insights.join("; "),
            branch.risks.join("; "),
            branch.opportunities.join("; "),
            branch.assumptions.join("; "),
        ));
    }
    sections.join("\n\n")
}

pub struct ComparisonOutcome {
    pub convergence_points: Vec<ConvergencePoint>,
    pub divergence_points: Vec<DivergencePoint>,
    pub meta_insight: String,
    pub recommended_approach: Option<RecommendedApproach>,
    pub tokens: u32,
}

pub async fn run_comparison(
    provider: Arc<dyn ThinkingProvider>,
    effort: Effort,
    branches: &[ForkBranchResult],
) -> thinking::Result<ComparisonOutcome> {
    let engine = ThinkingEngine::new(provider, thinking::ThinkingMode::Adaptive, effort);
    let request = EngineRequest::new(COMPARISON_SYSTEM_PROMPT, vec![Message::user(build_comparison_prompt(branches))])
        .with_tools(vec![record_comparison()])
        .with_effort(effort);

    let think_result = engine.think(request).await?;
    let tokens = think_result.usage.total_tokens;

    let input = think_result.tool_uses().find_map(|block| match block {
        thinking::ThinkingBlock::ToolUse { name, input } if name == "record_comparison" => Some(input),
        _ => None,
    });

    let Some(input) = input else {
        return Ok(ComparisonOutcome {
            convergence_points: Vec::new(),
            divergence_points: Vec::new(),
            meta_insight: basic_meta_insight(branches),
            recommended_approach: fallback_recommended_approach(branches),
            tokens,
        });
    };

    let convergence_points = input
        .get("convergence_points")
        .and_then(|v| v.as_array())
        .map(|items| {
            items
                .iter()
                .map(|item| ConvergencePoint {
                    topic: coerce_string(item.get("topic"), ""),
                    agreement: AgreementLevel::parse_safe(&coerce_string(item.get("agreement"), "partial")),
                    styles: coerce_string_array(item.get("styles")).iter().map(|s| BranchStyle::parse_safe(s)).collect(),
                    summary: coerce_string(item.get("summary"), ""),
                })
                .collect()
        })
        .unwrap_or_default();

    let divergence_points = input
        .get("divergence_points")
        .and_then(|v| v.as_array())
        .map(|items| {
            items
                .iter()
                .map(|item| DivergencePoint {
                    topic: coerce_string(item.get("topic"), ""),
                    positions: item
                        .get("positions")
                        .and_then(|v| v.as_array())
                        .map(|positions| {
                            positions
                                .iter()
                                .map(|p| StylePosition {
                                    style: BranchStyle::parse_safe(&coerce_string(p.get("style"), "balanced")),
                                    position: coerce_string(p.get("position"), ""),
                                })
                                .collect()
                        })
                        .unwrap_or_default(),
                    significance: Significance::parse_safe(&coerce_string(item.get("significance"), "medium")),
                    recommendation: item.get("recommendation").and_then(|v| v.as_str()).map(str::to_string),
                })
                .collect()
        })
        .unwrap_or_default();

    let recommended_approach = input
        .get("recommended_approach")
        .map(|r| RecommendedApproach {
            style: BranchStyle::parse_safe(&coerce_string(r.get("style"), "balanced")),
            rationale: coerce_string(r.get("rationale"), ""),
            confidence: coerce_confidence(r.get("confidence")),
        })
        .or_else(|| fallback_recommended_approach(branches));

    let meta_insight = input
        .get("meta_insight")
        .and_then(|v| v.as_str())
        .map(str::to_string)
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| basic_meta_insight(branches));

    let _ = coerce_bool;

    Ok(ComparisonOutcome {
        convergence_points,
        divergence_points,
        meta_insight,
        recommended_approach,
        tokens,
    })
}

/// §4.4 step 5: synthesise a meta-insight when comparison cannot run or
/// fails.
pub fn basic_meta_insight(branches: &[ForkBranchResult]) -> String {
    let successful: Vec<&ForkBranchResult> = branches.iter().filter(|b| b.error.is_none()).collect();
    if successful.is_empty() {
        return "all branches failed".to_string();
    }

    let avg_confidence = successful.iter().map(|b| b.confidence).sum::<f64>() / successful.len() as f64;
    let all_high = successful.iter().all(|b| b.confidence >= 0.7);
    let all_low = successful.iter().all(|b| b.confidence < 0.4);

    if all_high {
        "robust answer".to_string()
    } else if all_low {
        "significant uncertainty".to_string()
    } else {
        format!(
            "mixed confidence (avg {:.0}%), consider exploring divergence",
            avg_confidence * 100.0
        )
    }
}

/// Tie-break recommended-approach style selection: higher confidence first,
/// then canonical style order (spec.md §4.4 "Ordering & tie-breaks").
pub fn pick_recommended_style(branches: &[ForkBranchResult]) -> Option<BranchStyle> {
    branches
        .iter()
        .filter(|b| b.error.is_none())
        .max_by(|a, b| {
            a.confidence
                .partial_cmp(&b.confidence)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| b.style.canonical_rank().cmp(&a.style.canonical_rank()))
        })
        .map(|b| b.style)
}

/// Fall back to the tie-break rule when the provider's `record_comparison`
/// tool use omits `recommended_approach` entirely (call failed, or the
/// model didn't invoke the tool): deterministically pick the
/// highest-confidence surviving branch rather than leaving callers with no
/// recommendation at all.
pub(crate) fn fallback_recommended_approach(branches: &[ForkBranchResult]) -> Option<RecommendedApproach> {
    let style = pick_recommended_style(branches)?;
    let branch = branches.iter().find(|b| b.style == style)?;
    Some(RecommendedApproach {
        style,
        rationale: format!("highest-confidence surviving branch ({:.2})", branch.confidence),
        confidence: branch.confidence,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn branch(style: BranchStyle, confidence: f64) -> ForkBranchResult {
        ForkBranchResult {
            style,
            conclusion: "c".into(),
            confidence,
            key_insights: vec![],
            risks: vec![],
            opportunities: vec![],
            assumptions: vec![],
            tokens: 0,
            duration_ms: 0,
            error: None,
        }
    }

    #[test]
    fn all_high_confidence_yields_robust_answer() {
        let branches = vec![branch(BranchStyle::Conservative, 0.8), branch(BranchStyle::Balanced, 0.9)];
        assert_eq!(basic_meta_insight(&branches), "robust answer");
    }

    #[test]
    fn all_low_confidence_yields_significant_uncertainty() {
        let branches = vec![branch(BranchStyle::Conservative, 0.2), branch(BranchStyle::Balanced, 0.1)];
        assert_eq!(basic_meta_insight(&branches), "significant uncertainty");
    }

    #[test]
    fn mixed_confidence_reports_average() {
        let branches = vec![branch(BranchStyle::Conservative, 0.9), branch(BranchStyle::Balanced, 0.1)];
        assert_eq!(basic_meta_insight(&branches), "mixed confidence (avg 50%), consider exploring divergence");
    }

    #[test]
    fn zero_successful_branches_reports_all_failed() {
        let mut failed = branch(BranchStyle::Conservative, 0.0);
        failed.error = Some("boom".into());
        assert_eq!(basic_meta_insight(&[failed]), "all branches failed");
    }

    #[test]
    fn tie_breaks_by_canonical_order() {
        let branches = vec![branch(BranchStyle::Contrarian, 0.8), branch(BranchStyle::Conservative, 0.8)];
        assert_eq!(pick_recommended_style(&branches), Some(BranchStyle::Conservative));
    }
}
