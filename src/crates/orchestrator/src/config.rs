//! `EngineConfig` — the recognised configuration surface (spec.md §6).

use memory_hierarchy::MemoryConfig;
use serde::{Deserialize, Serialize};
use thinking::{Effort, ThinkingMode};
use utils::{UtilsError, ValidateConfig};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EffortRoutingConfig {
    pub enabled: bool,
    pub simple_effort: Effort,
    pub standard_effort: Effort,
    pub complex_effort: Effort,
}

impl Default for EffortRoutingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            simple_effort: Effort::Low,
            standard_effort: Effort::Medium,
            complex_effort: Effort::Max,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenBudgetConfig {
    pub enabled: bool,
    pub max_session_output_tokens: u64,
    pub warn_at_percent: f64,
    pub max_compactions: u32,
}

impl Default for TokenBudgetConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_session_output_tokens: 200_000,
            warn_at_percent: 80.0,
            max_compactions: 5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    pub model: String,
    pub thinking_mode: ThinkingMode,
    pub thinking_effort: Effort,
    pub max_tokens: Option<u32>,
    pub streaming: bool,
    pub effort_routing: EffortRoutingConfig,
    pub token_budget: TokenBudgetConfig,
    pub memory: MemoryConfig,
    /// LRU capacity of the session→`MemoryHierarchy` cache (spec.md §5).
    pub session_cache_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            model: "default".to_string(),
            thinking_mode: ThinkingMode::Adaptive,
            thinking_effort: Effort::Medium,
            max_tokens: None,
            streaming: false,
            effort_routing: EffortRoutingConfig::default(),
            token_budget: TokenBudgetConfig::default(),
            memory: MemoryConfig::default(),
            session_cache_capacity: 100,
        }
    }
}

impl EngineConfig {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Rejects out-of-range percentages and zero-length budgets at the config
/// boundary (the point a caller loads config from env or a file) rather
/// than deep inside a session's call path.
impl ValidateConfig for EngineConfig {
    fn validate(&self) -> utils::Result<()> {
        if self.token_budget.enabled && self.token_budget.max_session_output_tokens == 0 {
            return Err(UtilsError::InvalidInput(
                "token_budget.max_session_output_tokens must be greater than zero".to_string(),
            ));
        }
        if !(0.0..=100.0).contains(&self.token_budget.warn_at_percent) {
            return Err(UtilsError::InvalidInput(
                "token_budget.warn_at_percent must be within [0, 100]".to_string(),
            ));
        }
        if self.session_cache_capacity == 0 {
            return Err(UtilsError::InvalidInput(
                "session_cache_capacity must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn zero_token_budget_is_rejected() {
        let mut config = EngineConfig::default();
        config.token_budget.max_session_output_tokens = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn out_of_range_warn_percent_is_rejected() {
        let mut config = EngineConfig::default();
        config.token_budget.warn_at_percent = 150.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_session_cache_capacity_is_rejected() {
        let mut config = EngineConfig::default();
        config.session_cache_capacity = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn a_disabled_token_budget_tolerates_a_zero_cap() {
        let mut config = EngineConfig::default();
        config.token_budget.enabled = false;
        config.token_budget.max_session_output_tokens = 0;
        assert!(config.validate().is_ok());
    }
}
