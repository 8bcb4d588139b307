//! Token-usage accounting returned alongside every `think` call.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct UsageMetadata {
    pub input_tokens: u32,
    pub output_tokens: u32,
    pub thinking_tokens: u32,
    pub total_tokens: u32,
}

impl UsageMetadata {
    pub fn new(input_tokens: u32, output_tokens: u32, thinking_tokens: u32) -> Self {
        Self {
            input_tokens,
            output_tokens,
            thinking_tokens,
            total_tokens: input_tokens + output_tokens + thinking_tokens,
        }
    }
}
