//! `ThinkingBlock`, the provider's unit of ordered output content.

use serde::{Deserialize, Serialize};

/// One piece of ordered content returned by a `think` call.
///
/// Ordering of blocks within a response is preserved and meaningful: callers
/// must not resort or otherwise reshuffle a `Vec<ThinkingBlock>`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ThinkingBlock {
    /// Visible intermediate reasoning.
    Thinking {
        text: String,
        signature: Option<String>,
    },
    /// Intermediate reasoning the provider declined to reveal.
    Redacted { opaque: String },
    /// Final-answer text.
    Text { text: String },
    /// A tool invocation requested by the model.
    ToolUse {
        name: String,
        input: serde_json::Value,
    },
    /// Server-side context compaction, surfaced inline.
    Compaction { summary: String },
}

impl ThinkingBlock {
    /// Estimated token length of this block's textual payload.
    ///
    /// Uses the same `ceil(len / 4)` estimator as `MemoryHierarchy` (spec
    /// §4.3); a redacted block counts at its encoded (opaque) length since
    /// its true length is not observable (see DESIGN.md open question 1).
    pub fn estimated_tokens(&self) -> usize {
        let len = match self {
            ThinkingBlock::Thinking { text, .. } => text.len(),
            ThinkingBlock::Redacted { opaque } => opaque.len(),
            ThinkingBlock::Text { text } => text.len(),
            ThinkingBlock::ToolUse { input, .. } => input.to_string().len(),
            ThinkingBlock::Compaction { summary } => summary.len(),
        };
        len.div_ceil(4)
    }

    pub fn is_thinking(&self) -> bool {
        matches!(self, ThinkingBlock::Thinking { .. } | ThinkingBlock::Redacted { .. })
    }

    pub fn is_text(&self) -> bool {
        matches!(self, ThinkingBlock::Text { .. })
    }

    pub fn is_tool_use(&self) -> bool {
        matches!(self, ThinkingBlock::ToolUse { .. })
    }

    pub fn is_compaction(&self) -> bool {
        matches!(self, ThinkingBlock::Compaction { .. })
    }

    /// The reasoning text carried by a thinking block, if any.
    pub fn reasoning_text(&self) -> Option<&str> {
        match self {
            ThinkingBlock::Thinking { text, .. } => Some(text),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn estimated_tokens_rounds_up() {
        let block = ThinkingBlock::Text {
            text: "a".repeat(5),
        };
        assert_eq!(block.estimated_tokens(), 2);
    }

    #[test]
    fn redacted_counts_at_opaque_length() {
        let block = ThinkingBlock::Redacted {
            opaque: "x".repeat(8),
        };
        assert_eq!(block.estimated_tokens(), 2);
    }

    #[test]
    fn kind_predicates() {
        let thinking = ThinkingBlock::Thinking {
            text: "step one".into(),
            signature: None,
        };
        assert!(thinking.is_thinking());
        assert!(!thinking.is_text());

        let redacted = ThinkingBlock::Redacted {
            opaque: "abc".into(),
        };
        assert!(redacted.is_thinking());
    }

    #[test]
    fn ordering_is_preserved_in_a_vec() {
        let blocks = vec![
            ThinkingBlock::Thinking {
                text: "first".into(),
                signature: None,
            },
            ThinkingBlock::Text {
                text: "second".into(),
            },
        ];
        assert!(blocks[0].is_thinking());
        assert!(blocks[1].is_text());
    }

    #[test]
    fn serializes_with_tagged_kind() {
        let block = ThinkingBlock::ToolUse {
            name: "record_conclusion".into(),
            input: serde_json::json!({"confidence": 0.8}),
        };
        let json = serde_json::to_value(&block).unwrap();
        assert_eq!(json["kind"], "tool_use");
        assert_eq!(json["name"], "record_conclusion");
    }
}
