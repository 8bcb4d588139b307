//! Heuristic extraction of a structured-reasoning section from free-form
//! thinking text: either an embedded JSON payload, or a fallback scan over
//! `Step N: KIND` markers.

use crate::decision::{Alternative, DecisionPoint};
use crate::node::{ReasoningStep, StepKind};
use regex::Regex;
use serde::Deserialize;
use std::sync::OnceLock;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
struct RawAlternative {
    path: String,
    #[serde(rename = "reasonRejected")]
    reason_rejected: String,
}

#[derive(Debug, Deserialize)]
struct RawDecisionPoint {
    #[serde(rename = "stepNumber")]
    step_number: u32,
    description: String,
    #[serde(rename = "chosenPath")]
    chosen_path: String,
    #[serde(default)]
    alternatives: Vec<RawAlternative>,
    confidence: f64,
    #[serde(rename = "reasoningExcerpt")]
    reasoning_excerpt: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawStep {
    kind: StepKind,
    text: String,
    confidence: f64,
}

#[derive(Debug, Deserialize)]
struct RawStructured {
    steps: Vec<RawStep>,
    #[serde(default)]
    decision_points: Vec<RawDecisionPoint>,
}

pub struct ParsedStructure {
    pub steps: Vec<ReasoningStep>,
    pub decision_points: Vec<DecisionPoint>,
}

fn json_fence() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)```(?:json)?\s*(\{.*?\})\s*```").unwrap())
}

fn step_marker() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?im)^(?:step\s+\d+|#{1,3})\s*[:.\-]?\s*(analysis|hypothesis|evaluation|consideration|conclusion)\b\s*[:.\-]?\s*",
        )
        .unwrap()
    })
}

fn confidence_suffix() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\(confidence:\s*([01](?:\.\d+)?)\)").unwrap())
}

fn step_kind_from_word(word: &str) -> StepKind {
    match word.to_lowercase().as_str() {
        "analysis" => StepKind::Analysis,
        "hypothesis" => StepKind::Hypothesis,
        "evaluation" => StepKind::Evaluation,
        "consideration" => StepKind::Consideration,
        _ => StepKind::Conclusion,
    }
}

/// Attempt to find and parse a fenced JSON structured-reasoning payload.
fn try_parse_json(reasoning: &str, node_id: Uuid) -> Option<ParsedStructure> {
    let captures = json_fence().captures(reasoning)?;
    let payload = captures.get(1)?.as_str();
    let raw: RawStructured = serde_json::from_str(payload).ok()?;

    let steps = raw
        .steps
        .into_iter()
        .map(|s| ReasoningStep {
            kind: s.kind,
            text: s.text,
            confidence: s.confidence.clamp(0.0, 1.0),
        })
        .collect();

    let decision_points = raw
        .decision_points
        .into_iter()
        .map(|d| DecisionPoint {
            id: node_id,
            node_id,
            step_number: d.step_number,
            description: d.description,
            chosen_path: d.chosen_path,
            alternatives: d
                .alternatives
                .into_iter()
                .map(|a| Alternative {
                    path: a.path,
                    reason_rejected: a.reason_rejected,
                })
                .collect(),
            confidence: d.confidence.clamp(0.0, 1.0),
            reasoning_excerpt: d.reasoning_excerpt,
        })
        .collect();

    Some(ParsedStructure { steps, decision_points })
}

/// Fall back to scanning for `Step N: KIND` / heading markers. No inline
/// decision points are recoverable from this path.
fn try_parse_headings(reasoning: &str) -> Option<ParsedStructure> {
    let marker = step_marker();
    let matches: Vec<_> = marker.find_iter(reasoning).collect();
    if matches.is_empty() {
        return None;
    }

    let mut steps = Vec::new();
    for (idx, m) in matches.iter().enumerate() {
        let captures = marker.captures(&reasoning[m.start()..m.end()])?;
        let kind = step_kind_from_word(captures.get(1)?.as_str());

        let body_start = m.end();
        let body_end = matches.get(idx + 1).map(|n| n.start()).unwrap_or(reasoning.len());
        let mut body = reasoning[body_start..body_end].trim().to_string();

        let confidence = confidence_suffix()
            .captures(&body)
            .and_then(|c| c.get(1)?.as_str().parse::<f64>().ok())
            .unwrap_or(0.5);
        body = confidence_suffix().replace(&body, "").trim().to_string();

        steps.push(ReasoningStep {
            kind,
            text: body,
            confidence: confidence.clamp(0.0, 1.0),
        });
    }

    Some(ParsedStructure {
        steps,
        decision_points: Vec::new(),
    })
}

/// Try the JSON path first, then the heading-marker heuristic. Returns
/// `None` if neither detects a structured section.
pub fn detect_structure(reasoning: &str, node_id: Uuid) -> Option<ParsedStructure> {
    try_parse_json(reasoning, node_id).or_else(|| try_parse_headings(reasoning))
}

/// Overall node confidence from §4.2 step 2: final conclusion step's
/// confidence if present, else mean of all step confidences, else 0.5.
pub fn derive_confidence(steps: Option<&[ReasoningStep]>) -> f64 {
    let Some(steps) = steps else {
        return 0.5;
    };
    if steps.is_empty() {
        return 0.5;
    }

    let confidence = steps
        .iter()
        .rev()
        .find(|s| s.kind == StepKind::Conclusion)
        .map(|s| s.confidence)
        .unwrap_or_else(|| steps.iter().map(|s| s.confidence).sum::<f64>() / steps.len() as f64);

    confidence.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_payload_is_parsed() {
        let reasoning = r#"Some preamble.
```json
{"steps": [{"kind": "analysis", "text": "looked at the data", "confidence": 0.6}, {"kind": "conclusion", "text": "ship it", "confidence": 0.9}], "decision_points": []}
```
"#;
        let parsed = detect_structure(reasoning, Uuid::new_v4()).unwrap();
        assert_eq!(parsed.steps.len(), 2);
        assert_eq!(derive_confidence(Some(&parsed.steps)), 0.9);
    }

    #[test]
    fn heading_markers_are_parsed_with_confidence_suffix() {
        let reasoning = "Step 1: Analysis: looked at latency numbers (confidence: 0.4)\nStep 2: Conclusion: reduce batch size (confidence: 0.8)";
        let parsed = detect_structure(reasoning, Uuid::new_v4()).unwrap();
        assert_eq!(parsed.steps.len(), 2);
        assert_eq!(parsed.steps[1].kind, StepKind::Conclusion);
        assert_eq!(derive_confidence(Some(&parsed.steps)), 0.8);
    }

    #[test]
    fn unstructured_text_detects_nothing() {
        let reasoning = "Just a plain paragraph of reasoning with no markers.";
        assert!(detect_structure(reasoning, Uuid::new_v4()).is_none());
        assert_eq!(derive_confidence(None), 0.5);
    }

    #[test]
    fn mean_is_used_when_no_conclusion_step_present() {
        let steps = vec![
            ReasoningStep { kind: StepKind::Analysis, text: "a".into(), confidence: 0.4 },
            ReasoningStep { kind: StepKind::Hypothesis, text: "b".into(), confidence: 0.6 },
        ];
        assert_eq!(derive_confidence(Some(&steps)), 0.5);
    }
}
