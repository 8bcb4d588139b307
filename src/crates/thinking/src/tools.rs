//! Tool schemas exposed to the provider.
//!
//! `ToolDefinition` follows the JSON-Schema subset the provider contract
//! accepts: object type, named properties, typed items (spec §4.1).

use serde::{Deserialize, Serialize};

/// A tool the provider may invoke during a `think` call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    /// JSON-Schema object describing the tool's input shape.
    pub parameters: serde_json::Value,
}

impl ToolDefinition {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: serde_json::Value,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters,
        }
    }
}

/// A tool invocation requested by the provider, already parsed off a
/// `ThinkingBlock::ToolUse`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    pub name: String,
    pub input: serde_json::Value,
}
