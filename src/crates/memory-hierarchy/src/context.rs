//! `MainContext` — the slice of memory always visible to the provider.

use crate::entry::{estimate_tokens, MemoryEntry};
use serde::{Deserialize, Serialize};

/// Facts split by whose perspective they were recorded from.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CoreMemory {
    pub human: Vec<String>,
    pub agent: Vec<String>,
}

impl CoreMemory {
    fn estimated_tokens(&self) -> usize {
        self.human
            .iter()
            .chain(self.agent.iter())
            .map(|s| estimate_tokens(s))
            .sum()
    }
}

/// Snapshot of everything sent to the provider as context, plus its token
/// accounting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MainContext {
    pub system_prompt: String,
    pub core_memory: CoreMemory,
    pub working_memory: Vec<MemoryEntry>,
    pub estimated_tokens: usize,
    pub max_tokens: usize,
}

impl MainContext {
    pub fn compute(
        system_prompt: &str,
        core_memory: &CoreMemory,
        working_memory: &[MemoryEntry],
        max_tokens: usize,
    ) -> Self {
        let working_tokens: usize = working_memory
            .iter()
            .map(|entry| estimate_tokens(&entry.content))
            .sum();
        let estimated_tokens =
            estimate_tokens(system_prompt) + core_memory.estimated_tokens() + working_tokens;

        Self {
            system_prompt: system_prompt.to_string(),
            core_memory: core_memory.clone(),
            working_memory: working_memory.to_vec(),
            estimated_tokens,
            max_tokens,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::{Source, Tier};
    use chrono::Utc;
    use uuid::Uuid;

    #[test]
    fn computes_token_total_across_all_parts() {
        let core = CoreMemory {
            human: vec!["likes rust".into()],
            agent: vec![],
        };
        let entry = MemoryEntry {
            id: Uuid::new_v4(),
            tier: Tier::MainContext,
            content: "abcdefgh".into(),
            importance: 0.5,
            last_accessed_at: Utc::now(),
            access_count: 0,
            source: Source::UserInput,
            source_id: None,
            tags: vec![],
            created_at: Utc::now(),
        };
        let context = MainContext::compute("sys", &core, &[entry], 8_000);
        assert_eq!(context.estimated_tokens, estimate_tokens("sys") + 3 + 2);
    }
}
