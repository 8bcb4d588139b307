//! Configuration for a `MemoryHierarchy` instance.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryConfig {
    pub max_main_context_tokens: usize,
    pub recall_window_size: usize,
    pub eviction_threshold: f64,
    pub self_managed: bool,
    pub summarize_on_eviction: bool,
    pub search_threshold: f64,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            max_main_context_tokens: 8_000,
            recall_window_size: 50,
            eviction_threshold: 0.5,
            self_managed: true,
            summarize_on_eviction: false,
            search_threshold: 0.0,
        }
    }
}

impl MemoryConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_main_context_tokens(mut self, tokens: usize) -> Self {
        self.max_main_context_tokens = tokens;
        self
    }

    pub fn with_recall_window_size(mut self, size: usize) -> Self {
        self.recall_window_size = size;
        self
    }

    pub fn with_eviction_threshold(mut self, threshold: f64) -> Self {
        self.eviction_threshold = threshold;
        self
    }

    pub fn with_self_managed(mut self, self_managed: bool) -> Self {
        self.self_managed = self_managed;
        self
    }

    pub fn with_summarize_on_eviction(mut self, summarize: bool) -> Self {
        self.summarize_on_eviction = summarize;
        self
    }

    pub fn with_search_threshold(mut self, threshold: f64) -> Self {
        self.search_threshold = threshold;
        self
    }

    /// 80% of `max_main_context_tokens`, the auto-eviction watermark.
    pub fn eviction_watermark(&self) -> usize {
        (self.max_main_context_tokens as f64 * 0.8) as usize
    }
}
