//! `Session` state machine (spec.md §4.5: `active → (warning) → exhausted |
//! (compaction-cap) → sealed`). Uses the same validated-transition pattern
//! as a `Task`/`TaskStatus` state machine: transitions are checked against
//! an explicit table rather than left to ad-hoc field mutation.

use crate::config::TokenBudgetConfig;
use crate::tools::TaskPlan;
use chrono::{DateTime, Utc};
use std::collections::VecDeque;
use thinking::ThinkingBlock;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Active,
    Warning,
    Exhausted,
    Sealed,
}

impl SessionStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, SessionStatus::Exhausted | SessionStatus::Sealed)
    }
}

/// Fired once at each crossing; the caller decides what side effect (e.g.
/// an `onBudgetWarning` callback) to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BudgetEvent {
    None,
    WarningFired,
    Exhausted,
}

const THINKING_HISTORY_CAP: usize = 50;

pub struct Session {
    pub id: Uuid,
    pub status: SessionStatus,
    pub cumulative_output_tokens: u64,
    pub compaction_count: u32,
    warned: bool,
    pub last_thinking_node_id: Option<Uuid>,
    pub thinking_history: VecDeque<ThinkingBlock>,
    pub current_plan: Option<TaskPlan>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Session {
    pub fn new(id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id,
            status: SessionStatus::Active,
            cumulative_output_tokens: 0,
            compaction_count: 0,
            warned: false,
            last_thinking_node_id: None,
            thinking_history: VecDeque::new(),
            current_plan: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Budget-gate check (spec.md §4.5 step 1). Terminal states are
    /// idempotently re-confirmed rather than re-derived from counters.
    pub fn over_budget(&self, budget: &TokenBudgetConfig) -> bool {
        budget.enabled && self.cumulative_output_tokens >= budget.max_session_output_tokens
    }

    pub fn compactions_exhausted(&self, budget: &TokenBudgetConfig) -> bool {
        self.compaction_count >= budget.max_compactions
    }

    pub fn seal(&mut self) {
        self.status = SessionStatus::Sealed;
        self.updated_at = Utc::now();
    }

    pub fn mark_exhausted(&mut self) {
        self.status = SessionStatus::Exhausted;
        self.updated_at = Utc::now();
    }

    /// §4.5 step 5: adds `output_tokens`, firing `WarningFired` exactly once
    /// per session on the first crossing of `warn_at_percent`.
    pub fn record_output_tokens(&mut self, output_tokens: u64, budget: &TokenBudgetConfig) -> BudgetEvent {
        self.cumulative_output_tokens += output_tokens;
        self.updated_at = Utc::now();

        if budget.enabled && self.cumulative_output_tokens >= budget.max_session_output_tokens {
            self.mark_exhausted();
            return BudgetEvent::Exhausted;
        }

        if !self.warned && budget.enabled {
            let percent = (self.cumulative_output_tokens as f64 / budget.max_session_output_tokens as f64) * 100.0;
            if percent >= budget.warn_at_percent {
                self.warned = true;
                self.status = SessionStatus::Warning;
                return BudgetEvent::WarningFired;
            }
        }

        BudgetEvent::None
    }

    /// §4.5 step 6: append then truncate to the most recent 50 blocks.
    pub fn push_thinking_blocks(&mut self, blocks: impl IntoIterator<Item = ThinkingBlock>) {
        self.thinking_history.extend(blocks);
        while self.thinking_history.len() > THINKING_HISTORY_CAP {
            self.thinking_history.pop_front();
        }
    }

    pub fn record_compaction(&mut self) {
        self.compaction_count += 1;
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn budget() -> TokenBudgetConfig {
        TokenBudgetConfig { enabled: true, max_session_output_tokens: 100, warn_at_percent: 80.0, max_compactions: 2 }
    }

    #[test]
    fn warning_fires_exactly_once_on_first_crossing() {
        let mut session = Session::new(Uuid::new_v4());
        let budget = budget();
        assert_eq!(session.record_output_tokens(50, &budget), BudgetEvent::None);
        assert_eq!(session.record_output_tokens(35, &budget), BudgetEvent::WarningFired);
        assert_eq!(session.record_output_tokens(1, &budget), BudgetEvent::None);
    }

    #[test]
    fn exhaustion_seals_the_session_and_marks_terminal() {
        let mut session = Session::new(Uuid::new_v4());
        let budget = budget();
        assert_eq!(session.record_output_tokens(200, &budget), BudgetEvent::Exhausted);
        assert!(session.status.is_terminal());
        assert!(session.over_budget(&budget));
    }

    #[test]
    fn thinking_history_truncates_to_fifty() {
        let mut session = Session::new(Uuid::new_v4());
        let blocks: Vec<ThinkingBlock> = (0..60)
            .map(|i| ThinkingBlock::Text { text: format!("block {i}") })
            .collect();
        session.push_thinking_blocks(blocks);
        assert_eq!(session.thinking_history.len(), 50);
        assert!(matches!(
            session.thinking_history.front(),
            Some(ThinkingBlock::Text { text }) if text == "block 10"
        ));
    }

    #[test]
    fn compaction_cap_is_detected() {
        let mut session = Session::new(Uuid::new_v4());
        let budget = budget();
        session.record_compaction();
        session.record_compaction();
        assert!(session.compactions_exhausted(&budget));
    }
}
