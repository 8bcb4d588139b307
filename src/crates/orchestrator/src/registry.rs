//! `SessionRegistry` — the module-level session→`MemoryHierarchy` cache
//! (spec.md §5): LRU eviction at a configurable capacity, with hydration
//! deduplicated via an in-flight-promise map keyed by session id.

use crate::session::Session;
use async_trait::async_trait;
use dashmap::DashMap;
use memory_hierarchy::{MemoryConfig, MemoryHierarchy};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::debug;
use uuid::Uuid;

/// Bundles a session's control-loop state with its per-session memory tier.
/// Each session's hierarchy is single-owner: no cross-session mutation.
pub struct SessionEntry {
    pub session: Mutex<Session>,
    pub memory: MemoryHierarchy,
}

impl SessionEntry {
    fn fresh(id: Uuid, memory_config: MemoryConfig) -> Self {
        Self { session: Mutex::new(Session::new(id)), memory: MemoryHierarchy::new(memory_config) }
    }
}

/// Pluggable hook for restoring session state from a persistent store. No
/// such store exists yet (out of scope); the default always reports a miss
/// so every session starts fresh. `testsupport` scenario builders can
/// implement this to seed pre-populated sessions.
#[async_trait]
pub trait SessionHydrator: Send + Sync {
    async fn hydrate(&self, _session_id: Uuid) -> Option<SessionEntry> {
        None
    }
}

/// Always-fresh hydrator: the default when no persistent store is wired in.
pub struct NoopHydrator;

#[async_trait]
impl SessionHydrator for NoopHydrator {
    async fn hydrate(&self, _session_id: Uuid) -> Option<SessionEntry> {
        None
    }
}

pub struct SessionRegistry {
    capacity: usize,
    memory_config: MemoryConfig,
    hydrator: Arc<dyn SessionHydrator>,
    entries: DashMap<Uuid, Arc<SessionEntry>>,
    /// In-flight-promise map: concurrent first accesses for the same id
    /// coalesce onto the same `OnceCell`.
    inflight: DashMap<Uuid, Arc<OnceCell<Arc<SessionEntry>>>>,
    /// Most-recently-used at the back; front is the next eviction victim.
    order: Mutex<VecDeque<Uuid>>,
}

impl SessionRegistry {
    pub fn new(capacity: usize, memory_config: MemoryConfig) -> Self {
        Self::with_hydrator(capacity, memory_config, Arc::new(NoopHydrator))
    }

    pub fn with_hydrator(capacity: usize, memory_config: MemoryConfig, hydrator: Arc<dyn SessionHydrator>) -> Self {
        Self {
            capacity,
            memory_config,
            hydrator,
            entries: DashMap::new(),
            inflight: DashMap::new(),
            order: Mutex::new(VecDeque::new()),
        }
    }

    /// Returns the entry for `session_id`, hydrating (or creating fresh) it
    /// if this is the first access. Concurrent callers for the same id
    /// share one hydration attempt.
    pub async fn get_or_create(&self, session_id: Uuid) -> Arc<SessionEntry> {
        if let Some(entry) = self.entries.get(&session_id) {
            self.touch(session_id);
            return entry.clone();
        }

        let cell = self.inflight.entry(session_id).or_insert_with(|| Arc::new(OnceCell::new())).clone();

        let entry = cell
            .get_or_init(|| async {
                let entry = self
                    .hydrator
                    .hydrate(session_id)
                    .await
                    .unwrap_or_else(|| SessionEntry::fresh(session_id, self.memory_config.clone()));
                Arc::new(entry)
            })
            .await
            .clone();

        self.entries.insert(session_id, entry.clone());
        self.inflight.remove(&session_id);
        self.touch(session_id);
        self.evict_if_over_capacity();

        entry
    }

    fn touch(&self, session_id: Uuid) {
        let mut order = self.order.lock();
        order.retain(|id| *id != session_id);
        order.push_back(session_id);
    }

    fn evict_if_over_capacity(&self) {
        let victim = {
            let mut order = self.order.lock();
            if order.len() <= self.capacity {
                None
            } else {
                order.pop_front()
            }
        };
        if let Some(id) = victim {
            self.entries.remove(&id);
            debug!(session_id = %id, "evicted session from registry (LRU capacity reached)");
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn get_or_create_reuses_the_same_entry() {
        let registry = SessionRegistry::new(10, MemoryConfig::default());
        let id = Uuid::new_v4();
        let first = registry.get_or_create(id).await;
        let second = registry.get_or_create(id).await;
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[tokio::test]
    async fn capacity_evicts_the_least_recently_used_session() {
        let registry = SessionRegistry::new(2, MemoryConfig::default());
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let c = Uuid::new_v4();

        registry.get_or_create(a).await;
        registry.get_or_create(b).await;
        registry.get_or_create(c).await;

        assert_eq!(registry.len(), 2);
        assert!(registry.entries.get(&a).is_none());
        assert!(registry.entries.get(&b).is_some());
        assert!(registry.entries.get(&c).is_some());
    }

    #[tokio::test]
    async fn touching_an_entry_protects_it_from_eviction() {
        let registry = SessionRegistry::new(2, MemoryConfig::default());
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let c = Uuid::new_v4();

        registry.get_or_create(a).await;
        registry.get_or_create(b).await;
        registry.get_or_create(a).await;
        registry.get_or_create(c).await;

        assert!(registry.entries.get(&a).is_some());
        assert!(registry.entries.get(&b).is_none());
        assert!(registry.entries.get(&c).is_some());
    }
}
