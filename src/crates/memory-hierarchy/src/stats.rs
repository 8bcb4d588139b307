//! Statistics snapshot exposed by a `MemoryHierarchy`.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemoryStats {
    pub main_entries: usize,
    pub recall_entries: usize,
    pub archival_entries: usize,
    pub main_tokens: usize,
    pub capacity: usize,
    pub utilisation: f64,
    pub total_inserts: u64,
    pub total_searches: u64,
    pub total_evictions: u64,
    pub total_promotions: u64,
}
