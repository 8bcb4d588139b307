//! Validated option objects for `fork` and `debate`.

use crate::error::{ForkError, Result};
use crate::style::BranchStyle;
use std::collections::HashMap;
use thinking::Effort;

#[derive(Debug, Clone)]
pub struct ForkOptions {
    pub styles: Vec<BranchStyle>,
    pub effort: Effort,
    pub analyze_convergence: bool,
    pub additional_context: Option<String>,
    pub branch_guidance: HashMap<BranchStyle, String>,
}

impl Default for ForkOptions {
    fn default() -> Self {
        Self {
            styles: BranchStyle::all(),
            effort: Effort::default(),
            analyze_convergence: true,
            additional_context: None,
            branch_guidance: HashMap::new(),
        }
    }
}

impl ForkOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_styles(mut self, styles: Vec<BranchStyle>) -> Self {
        self.styles = styles;
        self
    }

    pub fn with_effort(mut self, effort: Effort) -> Self {
        self.effort = effort;
        self
    }

    pub fn with_analyze_convergence(mut self, analyze: bool) -> Self {
        self.analyze_convergence = analyze;
        self
    }

    pub fn with_additional_context(mut self, context: impl Into<String>) -> Self {
        self.additional_context = Some(context.into());
        self
    }

    pub fn with_branch_guidance(mut self, style: BranchStyle, guidance: impl Into<String>) -> Self {
        self.branch_guidance.insert(style, guidance.into());
        self
    }

    /// `styles` defaults to all four when left empty; the schema `min:2`
    /// requirement in spec.md §8 applies only when the caller explicitly
    /// supplies a single style.
    pub(crate) fn resolved_styles(&self) -> Vec<BranchStyle> {
        if self.styles.is_empty() {
            BranchStyle::all()
        } else {
            self.styles.clone()
        }
    }

    pub fn validate(&self, query: &str) -> Result<()> {
        if query.trim().is_empty() {
            return Err(ForkError::InvalidInput("query must not be empty".to_string()));
        }
        if self.styles.len() == 1 {
            return Err(ForkError::InvalidInput(
                "a single explicit style is not accepted; fork requires at least two styles or the default of all four".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct DebateOptions {
    pub fork_options: ForkOptions,
    pub rounds: u32,
}

impl DebateOptions {
    pub fn new(rounds: u32) -> Self {
        Self {
            fork_options: ForkOptions::default(),
            rounds,
        }
    }

    pub fn with_fork_options(mut self, options: ForkOptions) -> Self {
        self.fork_options = options;
        self
    }

    pub fn validate(&self, query: &str) -> Result<()> {
        self.fork_options.validate(query)?;
        if !(1..=5).contains(&self.rounds) {
            return Err(ForkError::InvalidInput("rounds must be within [1, 5]".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_query_is_rejected() {
        let options = ForkOptions::default();
        assert!(options.validate("").is_err());
        assert!(options.validate("   ").is_err());
    }

    #[test]
    fn single_explicit_style_is_rejected() {
        let options = ForkOptions::default().with_styles(vec![BranchStyle::Balanced]);
        assert!(options.validate("query").is_err());
    }

    #[test]
    fn empty_styles_resolve_to_all_four() {
        let options = ForkOptions::default().with_styles(vec![]);
        assert_eq!(options.resolved_styles().len(), 4);
    }

    #[test]
    fn debate_rounds_must_be_in_range() {
        assert!(DebateOptions::new(0).validate("query").is_err());
        assert!(DebateOptions::new(6).validate("query").is_err());
        assert!(DebateOptions::new(3).validate("query").is_ok());
    }
}
