//! `MemoryHierarchy` — three-tier memory with paging, eviction, promotion,
//! and keyword+tag+recency+importance retrieval.

use crate::config::MemoryConfig;
use crate::context::{CoreMemory, MainContext};
use crate::entry::{clamp_importance, estimate_tokens, MemoryEntry, Source, Tier};
use crate::error::{MemoryError, Result};
use crate::stats::MemoryStats;
use chrono::Utc;
use std::collections::VecDeque;
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

/// Section of core memory targeted by `core_memory_append`/`core_memory_replace`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoreMemorySection {
    Human,
    Agent,
}

pub type EvictionCallback = Box<dyn Fn(&[MemoryEntry]) + Send + Sync>;
pub type PromotionCallback = Box<dyn Fn(&[MemoryEntry]) + Send + Sync>;
pub type StatsCallback = Box<dyn Fn(&MemoryStats) + Send + Sync>;

struct Counters {
    total_inserts: u64,
    total_searches: u64,
    total_evictions: u64,
    total_promotions: u64,
}

impl Default for Counters {
    fn default() -> Self {
        Self {
            total_inserts: 0,
            total_searches: 0,
            total_evictions: 0,
            total_promotions: 0,
        }
    }
}

/// A full snapshot of a hierarchy's state, used to hydrate a fresh instance
/// (e.g. after restoring a session from a persistent store).
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct MemorySnapshot {
    pub system_prompt: String,
    pub core_memory: CoreMemory,
    pub working_memory: Vec<MemoryEntry>,
    pub recall: Vec<MemoryEntry>,
    pub archival: Vec<MemoryEntry>,
    pub stats: MemoryStats,
}

/// Three-tier memory: `main_context` (always visible), `recall_storage`
/// (bounded FIFO), `archival_storage` (unbounded long-term).
pub struct MemoryHierarchy {
    config: MemoryConfig,
    system_prompt: RwLock<String>,
    core_memory: RwLock<CoreMemory>,
    working_memory: RwLock<Vec<MemoryEntry>>,
    recall: RwLock<VecDeque<MemoryEntry>>,
    archival: RwLock<Vec<MemoryEntry>>,
    counters: RwLock<Counters>,
    on_eviction: Option<EvictionCallback>,
    on_promotion: Option<PromotionCallback>,
    on_stats_update: Option<StatsCallback>,
}

impl MemoryHierarchy {
    pub fn new(config: MemoryConfig) -> Self {
        Self {
            config,
            system_prompt: RwLock::new(String::new()),
            core_memory: RwLock::new(CoreMemory::default()),
            working_memory: RwLock::new(Vec::new()),
            recall: RwLock::new(VecDeque::new()),
            archival: RwLock::new(Vec::new()),
            counters: RwLock::new(Counters::default()),
            on_eviction: None,
            on_promotion: None,
            on_stats_update: None,
        }
    }

    pub fn with_on_eviction(mut self, callback: EvictionCallback) -> Self {
        self.on_eviction = Some(callback);
        self
    }

    pub fn with_on_promotion(mut self, callback: PromotionCallback) -> Self {
        self.on_promotion = Some(callback);
        self
    }

    pub fn with_on_stats_update(mut self, callback: StatsCallback) -> Self {
        self.on_stats_update = Some(callback);
        self
    }

    pub async fn set_system_prompt(&self, prompt: impl Into<String>) {
        *self.system_prompt.write().await = prompt.into();
    }

    // ---- main_context / working memory -------------------------------

    /// Appends to main working memory and to recall storage; may trigger
    /// auto-eviction.
    pub async fn add_to_working_memory(
        &self,
        content: impl Into<String>,
        importance: f64,
        source: Source,
        source_id: Option<Uuid>,
    ) -> Result<MemoryEntry> {
        let content = content.into();
        if content.is_empty() {
            return Err(MemoryError::InvalidInput(
                "working memory content must not be empty".to_string(),
            ));
        }

        let now = Utc::now();
        let id = Uuid::new_v4();
        let entry = MemoryEntry {
            id,
            tier: Tier::MainContext,
            content,
            importance: clamp_importance(importance),
            last_accessed_at: now,
            access_count: 0,
            source,
            source_id,
            tags: Vec::new(),
            created_at: now,
        };

        {
            let mut working = self.working_memory.write().await;
            working.push(entry.clone());
        }

        let mut recall_entry = entry.clone();
        recall_entry.tier = Tier::RecallStorage;
        self.push_to_recall(recall_entry).await;

        self.bump_inserts().await;
        self.auto_evict_if_needed().await;
        self.emit_stats().await;

        Ok(entry)
    }

    /// Appends to archival with clamped importance.
    pub async fn archival_insert(
        &self,
        content: impl Into<String>,
        tags: Vec<String>,
        importance: Option<f64>,
    ) -> Result<MemoryEntry> {
        let content = content.into();
        let now = Utc::now();
        let entry = MemoryEntry {
            id: Uuid::new_v4(),
            tier: Tier::ArchivalStorage,
            content,
            importance: clamp_importance(importance.unwrap_or(0.5)),
            last_accessed_at: now,
            access_count: 0,
            source: Source::KnowledgeBase,
            source_id: None,
            tags,
            created_at: now,
        };

        self.archival.write().await.push(entry.clone());
        self.bump_inserts().await;
        self.emit_stats().await;
        Ok(entry)
    }

    /// Keyword+tag+recency+importance scored search over archival storage.
    /// Returned entries have their access counters bumped as a side effect.
    pub async fn archival_search(&self, query: &str, limit: usize) -> Vec<MemoryEntry> {
        let terms: Vec<String> = query
            .split_whitespace()
            .map(|t| t.to_lowercase())
            .filter(|t| t.chars().count() > 2)
            .collect();

        self.bump_searches().await;

        if terms.is_empty() {
            return Vec::new();
        }

        let now = Utc::now();
        let mut scored: Vec<(f64, usize)> = {
            let archival = self.archival.read().await;
            archival
                .iter()
                .enumerate()
                .filter_map(|(idx, entry)| {
                    let content_lower = entry.content.to_lowercase();
                    let base: f64 = terms
                        .iter()
                        .map(|term| {
                            let content_hit = content_lower.contains(term.as_str()) as u8 as f64;
                            let tag_hit = entry
                                .tags
                                .iter()
                                .any(|tag| tag.to_lowercase().contains(term.as_str()))
                                as u8 as f64
                                * 0.5;
                            content_hit + tag_hit
                        })
                        .sum();

                    if base <= 0.0 {
                        return None;
                    }

                    let age_days = (now - entry.created_at).num_seconds() as f64 / 86_400.0;
                    let score = base + 0.3 * entry.importance - 0.01 * age_days.max(0.0);
                    Some((score, idx))
                })
                .collect()
        };

        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(limit);

        let mut archival = self.archival.write().await;
        scored
            .into_iter()
            .map(|(_, idx)| {
                let entry = &mut archival[idx];
                entry.last_accessed_at = now;
                entry.access_count += 1;
                entry.clone()
            })
            .collect()
    }

    /// Case-insensitive substring search over recall storage, sorted by
    /// recency. No access-counter side effects.
    pub async fn recall_search(&self, query: &str, limit: usize) -> Vec<MemoryEntry> {
        self.bump_searches().await;
        let query_lower = query.to_lowercase();
        let recall = self.recall.read().await;
        let mut hits: Vec<MemoryEntry> = recall
            .iter()
            .filter(|entry| entry.content.to_lowercase().contains(&query_lower))
            .cloned()
            .collect();
        hits.sort_by(|a, b| b.last_accessed_at.cmp(&a.last_accessed_at));
        hits.truncate(limit);
        hits
    }

    pub async fn core_memory_append(&self, section: CoreMemorySection, content: impl Into<String>) {
        let mut core = self.core_memory.write().await;
        match section {
            CoreMemorySection::Human => core.human.push(content.into()),
            CoreMemorySection::Agent => core.agent.push(content.into()),
        }
        drop(core);
        self.auto_evict_if_needed().await;
        self.emit_stats().await;
    }

    pub async fn core_memory_replace(
        &self,
        section: CoreMemorySection,
        old_content: &str,
        new_content: impl Into<String>,
    ) -> Result<()> {
        let mut core = self.core_memory.write().await;
        let list = match section {
            CoreMemorySection::Human => &mut core.human,
            CoreMemorySection::Agent => &mut core.agent,
        };
        match list.iter().position(|c| c == old_content) {
            Some(idx) => {
                list[idx] = new_content.into();
                Ok(())
            }
            None => Err(MemoryError::NotFound(format!(
                "core memory fact not found: {old_content}"
            ))),
        }
    }

    /// For each id present in working memory: remove it, construct an
    /// archival entry preserving the id, push it, and count one eviction.
    /// Ids not found in working memory (e.g. already archived) are a no-op.
    pub async fn evict_to_archival(&self, ids: &[Uuid]) {
        let evicted = {
            let mut working = self.working_memory.write().await;
            let mut evicted = Vec::new();
            working.retain(|entry| {
                if ids.contains(&entry.id) {
                    evicted.push(entry.clone());
                    false
                } else {
                    true
                }
            });
            evicted
        };

        if evicted.is_empty() {
            return;
        }

        let now = Utc::now();
        let archived: Vec<MemoryEntry> = evicted
            .into_iter()
            .map(|mut entry| {
                entry.tier = Tier::ArchivalStorage;
                entry.source = Source::Compaction;
                entry.last_accessed_at = now;
                entry
            })
            .collect();

        {
            let mut archival = self.archival.write().await;
            archival.extend(archived.iter().cloned());
        }

        {
            let mut counters = self.counters.write().await;
            counters.total_evictions += archived.len() as u64;
        }

        if let Some(callback) = &self.on_eviction {
            callback(&archived);
        }
        info!(count = archived.len(), "evicted working-memory entries to archival");
        self.emit_stats().await;
    }

    /// Symmetric to `evict_to_archival`: for each id present in archival,
    /// move it into working memory. May trigger auto-eviction afterwards.
    pub async fn promote_to_working(&self, ids: &[Uuid]) {
        let promoted = {
            let mut archival = self.archival.write().await;
            let mut promoted = Vec::new();
            archival.retain(|entry| {
                if ids.contains(&entry.id) {
                    promoted.push(entry.clone());
                    false
                } else {
                    true
                }
            });
            promoted
        };

        if promoted.is_empty() {
            return;
        }

        let working_entries: Vec<MemoryEntry> = promoted
            .into_iter()
            .map(|mut entry| {
                entry.tier = Tier::MainContext;
                entry
            })
            .collect();

        {
            let mut working = self.working_memory.write().await;
            working.extend(working_entries.iter().cloned());
        }

        {
            let mut counters = self.counters.write().await;
            counters.total_promotions += working_entries.len() as u64;
        }

        if let Some(callback) = &self.on_promotion {
            callback(&working_entries);
        }
        info!(count = working_entries.len(), "promoted archival entries to working memory");

        self.auto_evict_if_needed().await;
        self.emit_stats().await;
    }

    // ---- internal bookkeeping ------------------------------------------

    async fn push_to_recall(&self, entry: MemoryEntry) {
        let mut recall = self.recall.write().await;
        recall.push_back(entry);
        while recall.len() > self.config.recall_window_size {
            if let Some(shifted) = recall.pop_front() {
                if shifted.importance > self.config.eviction_threshold {
                    let mut archival = self.archival.write().await;
                    let mut rescued = shifted;
                    rescued.tier = Tier::ArchivalStorage;
                    archival.push(rescued);
                }
                // else: dropped entirely, below the rescue threshold.
            }
        }
    }

    /// Sort working memory ascending by importance, pop entries until
    /// estimated tokens <= 80% of max, evict the popped set in one call.
    /// Never touches core memory.
    async fn auto_evict_if_needed(&self) {
        let system_prompt = self.system_prompt.read().await.clone();
        let core_memory = self.core_memory.read().await.clone();
        let working = self.working_memory.read().await.clone();

        let current = MainContext::compute(
            &system_prompt,
            &core_memory,
            &working,
            self.config.max_main_context_tokens,
        );
        if current.estimated_tokens <= self.config.max_main_context_tokens {
            return;
        }

        let watermark = self.config.eviction_watermark();
        let mut ordered = working;
        ordered.sort_by(|a, b| a.importance.partial_cmp(&b.importance).unwrap_or(std::cmp::Ordering::Equal));

        let mut running_tokens = current.estimated_tokens;
        let mut to_evict = Vec::new();
        for entry in ordered {
            if running_tokens <= watermark {
                break;
            }
            running_tokens = running_tokens.saturating_sub(estimate_tokens(&entry.content));
            to_evict.push(entry.id);
        }

        if !to_evict.is_empty() {
            debug!(count = to_evict.len(), "auto-eviction triggered");
            self.evict_to_archival(&to_evict).await;
        }
    }

    async fn bump_inserts(&self) {
        self.counters.write().await.total_inserts += 1;
    }

    async fn bump_searches(&self) {
        self.counters.write().await.total_searches += 1;
    }

    async fn emit_stats(&self) {
        if let Some(callback) = &self.on_stats_update {
            callback(&self.stats().await);
        }
    }

    // ---- introspection ---------------------------------------------------

    pub async fn main_context(&self) -> MainContext {
        let system_prompt = self.system_prompt.read().await.clone();
        let core_memory = self.core_memory.read().await.clone();
        let working = self.working_memory.read().await.clone();
        MainContext::compute(&system_prompt, &core_memory, &working, self.config.max_main_context_tokens)
    }

    pub async fn stats(&self) -> MemoryStats {
        let context = self.main_context().await;
        let recall_len = self.recall.read().await.len();
        let archival_len = self.archival.read().await.len();
        let counters = self.counters.read().await;

        MemoryStats {
            main_entries: context.working_memory.len(),
            recall_entries: recall_len,
            archival_entries: archival_len,
            main_tokens: context.estimated_tokens,
            capacity: self.config.max_main_context_tokens,
            utilisation: if self.config.max_main_context_tokens == 0 {
                0.0
            } else {
                context.estimated_tokens as f64 / self.config.max_main_context_tokens as f64
            },
            total_inserts: counters.total_inserts,
            total_searches: counters.total_searches,
            total_evictions: counters.total_evictions,
            total_promotions: counters.total_promotions,
        }
    }

    pub async fn snapshot(&self) -> MemorySnapshot {
        MemorySnapshot {
            system_prompt: self.system_prompt.read().await.clone(),
            core_memory: self.core_memory.read().await.clone(),
            working_memory: self.working_memory.read().await.clone(),
            recall: self.recall.read().await.iter().cloned().collect(),
            archival: self.archival.read().await.clone(),
            stats: self.stats().await,
        }
    }

    pub fn hydrate(config: MemoryConfig, snapshot: MemorySnapshot) -> Self {
        let hierarchy = Self::new(config);
        hierarchy
            .system_prompt
            .try_write()
            .map(|mut guard| *guard = snapshot.system_prompt)
            .ok();
        hierarchy
            .core_memory
            .try_write()
            .map(|mut guard| *guard = snapshot.core_memory)
            .ok();
        hierarchy
            .working_memory
            .try_write()
            .map(|mut guard| *guard = snapshot.working_memory)
            .ok();
        hierarchy
            .recall
            .try_write()
            .map(|mut guard| *guard = snapshot.recall.into_iter().collect())
            .ok();
        hierarchy
            .archival
            .try_write()
            .map(|mut guard| *guard = snapshot.archival)
            .ok();
        hierarchy
            .counters
            .try_write()
            .map(|mut guard| {
                guard.total_inserts = snapshot.stats.total_inserts;
                guard.total_searches = snapshot.stats.total_searches;
                guard.total_evictions = snapshot.stats.total_evictions;
                guard.total_promotions = snapshot.stats.total_promotions;
            })
            .ok();
        hierarchy
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> MemoryConfig {
        MemoryConfig::new()
            .with_max_main_context_tokens(100)
            .with_recall_window_size(3)
            .with_eviction_threshold(0.5)
    }

    #[tokio::test]
    async fn empty_content_is_rejected() {
        let hierarchy = MemoryHierarchy::new(config());
        let result = hierarchy
            .add_to_working_memory("", 0.5, Source::UserInput, None)
            .await;
        assert!(matches!(result, Err(MemoryError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn add_to_working_memory_also_lands_in_recall() {
        let hierarchy = MemoryHierarchy::new(config());
        hierarchy
            .add_to_working_memory("remember this", 0.5, Source::UserInput, None)
            .await
            .unwrap();

        let stats = hierarchy.stats().await;
        assert_eq!(stats.main_entries, 1);
        assert_eq!(stats.recall_entries, 1);
    }

    #[tokio::test]
    async fn archival_search_drops_short_terms() {
        let hierarchy = MemoryHierarchy::new(config());
        hierarchy
            .archival_insert("the quick brown fox", vec![], None)
            .await
            .unwrap();

        let hits = hierarchy.archival_search("to ok in", 10).await;
        assert!(hits.is_empty());
    }

    #[tokio::test]
    async fn archival_search_scores_content_and_tags() {
        let hierarchy = MemoryHierarchy::new(config());
        hierarchy
            .archival_insert("deploying the payment service", vec!["ops".into()], Some(0.8))
            .await
            .unwrap();
        hierarchy
            .archival_insert("unrelated note about lunch", vec![], Some(0.2))
            .await
            .unwrap();

        let hits = hierarchy.archival_search("payment deployment", 10).await;
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].access_count, 1);
    }

    #[tokio::test]
    async fn recall_search_is_case_insensitive_and_has_no_side_effects() {
        let hierarchy = MemoryHierarchy::new(config());
        let entry = hierarchy
            .add_to_working_memory("Remember The Plan", 0.5, Source::UserInput, None)
            .await
            .unwrap();

        let hits = hierarchy.recall_search("the plan", 10).await;
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, entry.id);
        assert_eq!(hits[0].access_count, 0);
    }

    #[tokio::test]
    async fn core_memory_replace_requires_exact_match() {
        let hierarchy = MemoryHierarchy::new(config());
        hierarchy
            .core_memory_append(CoreMemorySection::Human, "likes tea")
            .await;

        assert!(hierarchy
            .core_memory_replace(CoreMemorySection::Human, "likes coffee", "likes tea")
            .await
            .is_err());

        assert!(hierarchy
            .core_memory_replace(CoreMemorySection::Human, "likes tea", "likes coffee")
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn evict_to_archival_is_idempotent() {
        let hierarchy = MemoryHierarchy::new(config());
        let entry = hierarchy
            .add_to_working_memory("one fact", 0.5, Source::UserInput, None)
            .await
            .unwrap();

        hierarchy.evict_to_archival(&[entry.id]).await;
        assert_eq!(hierarchy.stats().await.total_evictions, 1);

        // Already archived: no-op, counter does not move again.
        hierarchy.evict_to_archival(&[entry.id]).await;
        assert_eq!(hierarchy.stats().await.total_evictions, 1);
    }

    #[tokio::test]
    async fn auto_eviction_never_touches_core_memory() {
        let hierarchy = MemoryHierarchy::new(config());
        hierarchy
            .core_memory_append(CoreMemorySection::Human, "a durable fact")
            .await;

        for i in 0..50 {
            hierarchy
                .add_to_working_memory(format!("filler entry number {i}"), 0.1, Source::UserInput, None)
                .await
                .unwrap();
        }

        let context = hierarchy.main_context().await;
        assert_eq!(context.core_memory.human, vec!["a durable fact".to_string()]);
        assert!(context.estimated_tokens <= hierarchy.config.max_main_context_tokens);
    }

    #[tokio::test]
    async fn recall_window_rescues_important_entries() {
        let hierarchy = MemoryHierarchy::new(config());
        hierarchy
            .add_to_working_memory("low importance", 0.1, Source::UserInput, None)
            .await
            .unwrap();
        hierarchy
            .add_to_working_memory("high importance fact", 0.9, Source::UserInput, None)
            .await
            .unwrap();
        hierarchy
            .add_to_working_memory("another low one", 0.1, Source::UserInput, None)
            .await
            .unwrap();
        hierarchy
            .add_to_working_memory("overflow entry", 0.1, Source::UserInput, None)
            .await
            .unwrap();

        let stats = hierarchy.stats().await;
        assert_eq!(stats.recall_entries, 3);
        assert!(stats.archival_entries >= 1);
    }

    #[tokio::test]
    async fn snapshot_and_hydrate_round_trips() {
        let hierarchy = MemoryHierarchy::new(config());
        hierarchy.set_system_prompt("be helpful").await;
        hierarchy
            .add_to_working_memory("a fact", 0.5, Source::UserInput, None)
            .await
            .unwrap();
        hierarchy
            .archival_insert("archived knowledge", vec!["tag".into()], Some(0.4))
            .await
            .unwrap();

        let snapshot = hierarchy.snapshot().await;
        let rehydrated = MemoryHierarchy::hydrate(config(), snapshot.clone());
        let round_tripped = rehydrated.snapshot().await;

        assert_eq!(round_tripped.system_prompt, snapshot.system_prompt);
        assert_eq!(round_tripped.working_memory.len(), snapshot.working_memory.len());
        assert_eq!(round_tripped.archival.len(), snapshot.archival.len());
    }
}
