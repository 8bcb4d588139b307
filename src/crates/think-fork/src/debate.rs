//! Adversarial debate rounds between fork branches.

use crate::coerce::{coerce_bool, coerce_confidence, coerce_string, coerce_string_array};
use crate::style::BranchStyle;
use crate::tools::record_debate_response;
use crate::types::DebateRoundEntry;
use std::collections::HashMap;
use std::sync::Arc;
use thinking::{Effort, EngineRequest, Message, ThinkingEngine, ThinkingProvider};

#[derive(Debug, Clone)]
pub struct Position {
    pub conclusion: String,
    pub confidence: f64,
}

const DEBATE_SYSTEM_PROMPT: &str =
    "You are defending your prior conclusion against other reasoning styles. Respond to their \
     positions directly: concede where they are right, counter where you disagree, and update \
     your confidence honestly.";

fn build_debate_prompt(style: BranchStyle, own_position: &Position, others: &HashMap<BranchStyle, Position>) -> String {
    let mut others_desc = others
        .iter()
        .filter(|(s, _)| **s != style)
        .map(|(s, p)| format!("- {s}: {} (confidence {:.2})", p.conclusion, p.confidence))
        .collect::<Vec<_>>();
    others_desc.sort();

    format!(
        "Your previous position ({style}): {} (confidence {:.2})\n\nOther branches' current positions:\n{}",
        own_position.conclusion,
        own_position.confidence,
        others_desc.join("\n")
    )
}

/// Runs a single style's debate-round call.
pub async fn run_round_entry(
    provider: Arc<dyn ThinkingProvider>,
    effort: Effort,
    style: BranchStyle,
    round: u32,
    own_position: &Position,
    others: &HashMap<BranchStyle, Position>,
) -> DebateRoundEntry {
    let engine = ThinkingEngine::new(provider, thinking::ThinkingMode::Adaptive, effort);
    let prompt = build_debate_prompt(style, own_position, others);
    let request = EngineRequest::new(DEBATE_SYSTEM_PROMPT, vec![Message::user(prompt)])
        .with_tools(vec![record_debate_response()])
        .with_effort(effort);

    match engine.think(request).await {
        Ok(think_result) => parse_round_entry(style, round, think_result, own_position),
        Err(_) => fallback_entry(style, round, own_position),
    }
}

fn parse_round_entry(
    style: BranchStyle,
    round: u32,
    think_result: thinking::ThinkResult,
    own_position: &Position,
) -> DebateRoundEntry {
    let input = think_result.tool_uses().find_map(|block| match block {
        thinking::ThinkingBlock::ToolUse { name, input } if name == "record_debate_response" => Some(input),
        _ => None,
    });

    let Some(input) = input else {
        return fallback_entry(style, round, own_position);
    };

    DebateRoundEntry {
        style,
        round,
        response: coerce_string(input.get("response"), ""),
        confidence: coerce_confidence(input.get("confidence")),
        position_changed: coerce_bool(input.get("position_changed")),
        key_counterpoints: coerce_string_array(input.get("key_counterpoints")),
        concessions: coerce_string_array(input.get("concessions")),
    }
}

/// §7 "Debate rounds produce a fallback entry with the previous confidence
/// and empty counterpoints if a round call fails."
fn fallback_entry(style: BranchStyle, round: u32, own_position: &Position) -> DebateRoundEntry {
    DebateRoundEntry {
        style,
        round,
        response: own_position.conclusion.clone(),
        confidence: own_position.confidence,
        position_changed: false,
        key_counterpoints: Vec::new(),
        concessions: Vec::new(),
    }
}

/// §4.4 step 4: all final confidences >= 0.7, no `position_changed` in the
/// last round, and at least one surviving style.
pub fn check_consensus(final_positions: &HashMap<BranchStyle, Position>, last_round: &[DebateRoundEntry]) -> Option<(String, f64)> {
    if final_positions.is_empty() {
        return None;
    }
    let all_high = final_positions.values().all(|p| p.confidence >= 0.7);
    let any_changed = last_round.iter().any(|entry| entry.position_changed);
    if !all_high || any_changed {
        return None;
    }

    let mut styles: Vec<&BranchStyle> = final_positions.keys().collect();
    styles.sort_by_key(|s| s.canonical_rank());
    let consensus = styles
        .iter()
        .map(|s| format!("{s}: {}", final_positions[*s].conclusion))
        .collect::<Vec<_>>()
        .join(" | ");
    let mean_confidence = final_positions.values().map(|p| p.confidence).sum::<f64>() / final_positions.len() as f64;
    Some((consensus, mean_confidence))
}
