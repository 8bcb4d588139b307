//! The three canonical tool schemas exposed to the provider during fork
//! and debate calls (spec.md §6).

use serde_json::json;
use thinking::ToolDefinition;

pub fn record_conclusion() -> ToolDefinition {
    ToolDefinition::new(
        "record_conclusion",
        "Record this branch's conclusion, confidence, and supporting analysis.",
        json!({
            "type": "object",
            "properties": {
                "conclusion": {"type": "string"},
                "confidence": {"type": "number"},
                "key_insights": {"type": "array", "items": {"type": "string"}},
                "risks": {"type": "array", "items": {"type": "string"}},
                "opportunities": {"type": "array", "items": {"type": "string"}},
                "assumptions": {"type": "array", "items": {"type": "string"}}
            },
            "required": ["conclusion", "confidence", "key_insights"]
        }),
    )
}

pub fn record_comparison() -> ToolDefinition {
    ToolDefinition::new(
        "record_comparison",
        "Record the convergence and divergence between all branch conclusions.",
        json!({
            "type": "object",
            "properties": {
                "convergence_points": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "properties": {
                            "topic": {"type": "string"},
                            "agreement": {"type": "string"},
                            "styles": {"type": "array", "items": {"type": "string"}},
                            "summary": {"type": "string"}
                        }
                    }
                },
                "divergence_points": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "properties": {
                            "topic": {"type": "string"},
                            "positions": {
                                "type": "array",
                                "items": {
                                    "type": "object",
                                    "properties": {
                                        "style": {"type": "string"},
                                        "position": {"type": "string"}
                                    }
                                }
                            },
                            "significance": {"type": "string"},
                            "recommendation": {"type": "string"}
                        }
                    }
                },
                "meta_insight": {"type": "string"},
                "recommended_approach": {
                    "type": "object",
                    "properties": {
                        "style": {"type": "string"},
                        "rationale": {"type": "string"},
                        "confidence": {"type": "number"}
                    }
                }
            },
            "required": ["convergence_points", "divergence_points", "meta_insight"]
        }),
    )
}

pub fn record_debate_response() -> ToolDefinition {
    ToolDefinition::new(
        "record_debate_response",
        "Record this style's response to the other branches' current positions for this debate round.",
        json!({
            "type": "object",
            "properties": {
                "response": {"type": "string"},
                "confidence": {"type": "number"},
                "position_changed": {"type": "boolean"},
                "key_counterpoints": {"type": "array", "items": {"type": "string"}},
                "concessions": {"type": "array", "items": {"type": "string"}}
            },
            "required": ["response", "confidence", "position_changed"]
        }),
    )
}
