//! `ThinkForkEngine` — concurrent multi-style reasoning, convergence
//! synthesis, steering, and debate.

use crate::branch::run_branch;
use crate::compare::{basic_meta_insight, fallback_recommended_approach, run_comparison};
use crate::debate::{check_consensus, run_round_entry, Position};
use crate::error::Result;
use crate::options::{DebateOptions, ForkOptions};
use crate::prompts::{EmbeddedPromptRegistry, PromptRegistry};
use crate::style::BranchStyle;
use crate::types::{ConvergencePoint, DebateResult, ForkBranchResult, RecommendedApproach, ThinkForkResult};
use crate::{steering, AgreementLevel};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use thinking::ThinkingProvider;
use tokio::task::JoinSet;
use tracing::{info, warn};

pub struct ThinkForkEngine {
    provider: Arc<dyn ThinkingProvider>,
    registry: Arc<dyn PromptRegistry>,
}

impl ThinkForkEngine {
    pub fn new(provider: Arc<dyn ThinkingProvider>) -> Self {
        Self {
            provider,
            registry: Arc::new(EmbeddedPromptRegistry),
        }
    }

    pub fn with_prompt_registry(mut self, registry: Arc<dyn PromptRegistry>) -> Self {
        self.registry = registry;
        self
    }

    /// §4.4 `fork`: launches one `ThinkingEngine` call per style concurrently,
    /// waits for all settled, then synthesises convergence/divergence.
    pub async fn fork(&self, query: &str, options: &ForkOptions) -> Result<ThinkForkResult> {
        options.validate(query)?;
        let styles = options.resolved_styles();
        let started = Instant::now();

        let mut join_set = JoinSet::new();
        for (index, style) in styles.iter().copied().enumerate() {
            let provider = self.provider.clone();
            let registry = self.registry.clone();
            let query = query.to_string();
            let options = options.clone();
            join_set.spawn(async move {
                let outcome = run_branch(provider, registry.as_ref(), style, &query, &options).await;
                (index, outcome)
            });
        }

        let mut slots: Vec<Option<(ForkBranchResult, bool, bool)>> = vec![None; styles.len()];
        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok((index, outcome)) => {
                    slots[index] = Some((outcome.result, outcome.used_fallback_prompt, outcome.applied_guidance));
                }
                Err(join_error) => {
                    warn!(error = %join_error, "a fork branch task panicked; recording it as a failed branch");
                }
            }
        }

        let mut branches = Vec::with_capacity(styles.len());
        let mut fallback_prompts_used = Vec::new();
        let mut applied_human_guidance = Vec::new();
        let mut errors = Vec::new();

        for (index, style) in styles.iter().copied().enumerate() {
            let (result, used_fallback, applied_guidance) = slots[index].take().unwrap_or_else(|| {
                (ForkBranchResult::failed(style, "branch task did not complete", 0), false, false)
            });
            if used_fallback {
                fallback_prompts_used.push(style);
            }
            if applied_guidance {
                applied_human_guidance.push(style);
            }
            if let Some(error) = &result.error {
                errors.push(format!("{style}: {error}"));
            }
            branches.push(result);
        }

        let total_tokens: u32 = branches.iter().map(|b| b.tokens).sum();
        let successful: Vec<ForkBranchResult> = branches.iter().filter(|b| b.error.is_none()).cloned().collect();

        let (convergence_points, divergence_points, meta_insight, recommended_approach, comparison_tokens) =
            self.synthesise(options, &branches, &successful).await;

        let total_duration_ms = started.elapsed().as_millis() as u64;
        info!(
            styles = styles.len(),
            successful = successful.len(),
            total_tokens = total_tokens + comparison_tokens,
            "fork completed"
        );

        Ok(ThinkForkResult {
            query: query.to_string(),
            branches,
            convergence_points,
            divergence_points,
            meta_insight,
            recommended_approach,
            total_tokens: total_tokens + comparison_tokens,
            total_duration_ms,
            errors,
            fallback_prompts_used,
            applied_human_guidance,
        })
    }

    async fn synthesise(
        &self,
        options: &ForkOptions,
        all_branches: &[ForkBranchResult],
        successful: &[ForkBranchResult],
    ) -> (Vec<ConvergencePoint>, Vec<crate::types::DivergencePoint>, String, Option<RecommendedApproach>, u32) {
        if successful.len() == 1 {
            let branch = &successful[0];
            let convergence = vec![ConvergencePoint {
                topic: "sole surviving branch".to_string(),
                agreement: AgreementLevel::Full,
                styles: vec![branch.style],
                summary: branch.conclusion.clone(),
            }];
            let recommended = RecommendedApproach {
                style: branch.style,
                rationale: "only branch to complete successfully".to_string(),
                confidence: branch.confidence,
            };
            return (convergence, Vec::new(), basic_meta_insight(all_branches), Some(recommended), 0);
        }

        if options.analyze_convergence && successful.len() >= 2 {
            match run_comparison(self.provider.clone(), options.effort, successful).await {
                Ok(outcome) => {
                    return (
                        outcome.convergence_points,
                        outcome.divergence_points,
                        outcome.meta_insight,
                        outcome.recommended_approach,
                        outcome.tokens,
                    );
                }
                Err(err) => {
                    warn!(error = %err, "comparison call failed, falling back to basic meta-insight");
                }
            }
        }

        (
            Vec::new(),
            Vec::new(),
            basic_meta_insight(all_branches),
            fallback_recommended_approach(all_branches),
            0,
        )
    }

    // ---- steering actions -------------------------------------------

    pub async fn expand(&self, style: BranchStyle, prior_conclusion: &str, direction: Option<&str>, effort: thinking::Effort) -> Result<crate::types::SteeringResult> {
        Ok(steering::expand(self.provider.clone(), effort, style, prior_conclusion, direction).await?)
    }

    pub async fn merge(&self, styles: &[(BranchStyle, String)], focus: Option<&str>, effort: thinking::Effort) -> Result<crate::types::SteeringResult> {
        Ok(steering::merge(self.provider.clone(), effort, styles, focus).await?)
    }

    pub async fn challenge(&self, style: BranchStyle, prior_conclusion: &str, challenge_text: &str, effort: thinking::Effort) -> Result<crate::types::SteeringResult> {
        Ok(steering::challenge(self.provider.clone(), effort, style, prior_conclusion, challenge_text).await?)
    }

    pub async fn refork(&self, style: BranchStyle, prior_conclusion: &str, new_context: &str, effort: thinking::Effort) -> Result<crate::types::SteeringResult> {
        Ok(steering::refork(self.provider.clone(), effort, style, prior_conclusion, new_context).await?)
    }

    /// §4.4 `debate`: establishes initial positions via `fork`, then runs
    /// `rounds` strictly-sequential rounds, each round's per-style calls
    /// concurrent.
    pub async fn debate(&self, query: &str, options: &DebateOptions) -> Result<DebateResult> {
        options.validate(query)?;

        let initial = self.fork(query, &options.fork_options).await?;
        let mut positions: HashMap<BranchStyle, Position> = initial
            .branches
            .iter()
            .filter(|b| b.error.is_none())
            .map(|b| (b.style, Position { conclusion: b.conclusion.clone(), confidence: b.confidence }))
            .collect();

        let mut rounds = Vec::new();
        let mut last_round_entries: Vec<crate::types::DebateRoundEntry> = Vec::new();

        for round in 1..=options.rounds {
            let snapshot = positions.clone();
            let mut join_set = JoinSet::new();
            for (style, position) in positions.clone() {
                let provider = self.provider.clone();
                let effort = options.fork_options.effort;
                let snapshot = snapshot.clone();
                join_set.spawn(async move { run_round_entry(provider, effort, style, round, &position, &snapshot).await });
            }

            let mut round_entries = Vec::new();
            while let Some(joined) = join_set.join_next().await {
                if let Ok(entry) = joined {
                    round_entries.push(entry);
                }
            }
            round_entries.sort_by_key(|e| e.style.canonical_rank());

            for entry in &round_entries {
                positions.insert(entry.style, Position { conclusion: entry.response.clone(), confidence: entry.confidence });
            }

            last_round_entries = round_entries.clone();
            rounds.extend(round_entries);
        }

        let consensus = check_consensus(&positions, &last_round_entries);
        let (consensus_text, consensus_confidence) = match consensus {
            Some((text, confidence)) => (Some(text), Some(confidence)),
            None => (None, None),
        };

        Ok(DebateResult {
            query: query.to_string(),
            rounds,
            consensus: consensus_text,
            consensus_confidence,
        })
    }
}
