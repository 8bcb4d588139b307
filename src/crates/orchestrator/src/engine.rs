//! `Orchestrator` — the session control loop (spec.md §4.5): budget gate,
//! complexity routing, knowledge-context retrieval, the routing call to the
//! provider, token accounting, graph persistence, and compaction handling.

use crate::complexity::{classify, effort_for};
use crate::config::EngineConfig;
use crate::error::{OrchestratorError, Result};
use crate::events::{debate_events, fork_events};
use crate::registry::SessionRegistry;
use crate::result::OrchestratorResult;
use crate::sanitize::sanitize_provider_error;
use crate::session::SessionStatus;
use crate::tools::{self, extract_task_plan};
use memory_hierarchy::{MemoryEntry, Source};
use std::sync::Arc;
use think_fork::{DebateOptions, ForkOptions, ThinkForkEngine};
use think_graph::{ThinkGraph, TokenUsage as GraphTokenUsage};
use thinking::engine::{EngineRequest, ThinkingEngine};
use thinking::{Message, ThinkingProvider};
use tracing::{info, warn};
use transport::StreamEvent;
use uuid::Uuid;

const ORCHESTRATOR_SYSTEM_PROMPT: &str = "\
You are the orchestrator for a multi-style reasoning system. Read the user's \
message, consult any supplied knowledge snippets, and either answer directly \
or call create_task_plan to lay out the steps needed, and route_to_agent if \
a specialised downstream agent should handle this.";

const BUDGET_EXHAUSTED_MESSAGE: &str =
    "This session has reached its output token budget and cannot continue.";
const COMPACTION_CAP_MESSAGE: &str =
    "This session has reached its compaction limit and cannot continue.";
const SESSION_SEALED_MESSAGE: &str = "This session is closed and cannot accept further messages.";

const KNOWLEDGE_SNIPPET_LIMIT: usize = 5;

pub struct Orchestrator {
    config: EngineConfig,
    thinking_engine: ThinkingEngine,
    graph: Arc<ThinkGraph>,
    sessions: Arc<SessionRegistry>,
    fork_engine: ThinkForkEngine,
}

impl Orchestrator {
    pub fn new(provider: Arc<dyn ThinkingProvider>, config: EngineConfig) -> Self {
        let sessions = Arc::new(SessionRegistry::new(config.session_cache_capacity, config.memory.clone()));
        let thinking_engine = ThinkingEngine::new(provider.clone(), config.thinking_mode, config.thinking_effort);
        let fork_engine = ThinkForkEngine::new(provider);
        Self { config, thinking_engine, graph: Arc::new(ThinkGraph::new()), sessions, fork_engine }
    }

    /// The full 9-step pipeline described in spec.md §4.5. Provider
    /// failures never surface as `Err`: they are sanitised into the
    /// returned result (§7), so this only errs on invalid input.
    pub async fn process(&self, session_id: Uuid, user_message: &str) -> Result<OrchestratorResult> {
        if user_message.trim().is_empty() {
            return Err(OrchestratorError::InvalidInput("user message must be non-empty".to_string()));
        }

        let correlation_id = Uuid::new_v4().to_string();
        let entry = self.sessions.get_or_create(session_id).await;

        // Step 1: budget gate. Checked and reported before any provider call.
        {
            let session = entry.session.lock();
            if session.status.is_terminal() {
                let message = match session.status {
                    SessionStatus::Exhausted => BUDGET_EXHAUSTED_MESSAGE,
                    _ => SESSION_SEALED_MESSAGE,
                };
                return Ok(OrchestratorResult::new(session_id, message, correlation_id));
            }
            if session.over_budget(&self.config.token_budget) {
                return Ok(OrchestratorResult::new(session_id, BUDGET_EXHAUSTED_MESSAGE, correlation_id));
            }
            if session.compactions_exhausted(&self.config.token_budget) {
                return Ok(OrchestratorResult::new(session_id, COMPACTION_CAP_MESSAGE, correlation_id));
            }
        }

        // Step 2: complexity classification → effort routing.
        let complexity = classify(user_message);
        let effort = effort_for(complexity, &self.config.effort_routing);

        // Step 3: knowledge context, up to 5 snippets from archival + recall.
        let prelude = self.knowledge_prelude(&entry.memory, user_message).await;
        let user_prompt =
            if prelude.is_empty() { user_message.to_string() } else { format!("{prelude}\n\n{user_message}") };

        // Step 4: routing call.
        let request = EngineRequest::new(ORCHESTRATOR_SYSTEM_PROMPT, vec![Message::user(user_prompt)])
            .with_tools(vec![tools::create_task_plan(), tools::route_to_agent()])
            .with_effort(effort);
        let request = match self.config.max_tokens {
            Some(max_tokens) => request.with_max_tokens(max_tokens),
            None => request,
        };

        let think_result = match self.thinking_engine.think(request).await {
            Ok(result) => result,
            Err(error) => {
                warn!(%session_id, %error, "provider call failed during process()");
                let message = sanitize_provider_error(&error);
                return Ok(OrchestratorResult::new(session_id, message, correlation_id));
            }
        };

        let response = think_result.final_text();
        let task_plan = extract_task_plan(&think_result);

        // Step 5: token accounting.
        let budget_event = {
            let mut session = entry.session.lock();
            let event = session.record_output_tokens(think_result.usage.output_tokens as u64, &self.config.token_budget);
            if let Some(plan) = task_plan {
                session.current_plan = Some(plan);
            }
            event
        };
        match budget_event {
            crate::session::BudgetEvent::WarningFired => {
                info!(%session_id, "session crossed the output token warning threshold")
            }
            crate::session::BudgetEvent::Exhausted => {
                info!(%session_id, "session exhausted its output token budget")
            }
            crate::session::BudgetEvent::None => {}
        }

        // Step 6: thinking-history cap.
        {
            let mut session = entry.session.lock();
            session.push_thinking_blocks(think_result.content.clone());
        }

        // Step 7: graph persistence.
        let parent_id = entry.session.lock().last_thinking_node_id;
        let token_usage =
            GraphTokenUsage { input_tokens: think_result.usage.input_tokens, output_tokens: think_result.usage.output_tokens };
        let outcome = self.graph.persist_thinking_node(
            session_id,
            &think_result.content,
            Some(user_message.to_string()),
            Some(response.clone()),
            token_usage,
            parent_id,
        );

        let mut result = OrchestratorResult::new(session_id, response, correlation_id);
        result.merge_persist_outcome(outcome.degraded, outcome.persistence_issues);
        {
            let mut session = entry.session.lock();
            session.last_thinking_node_id = Some(outcome.node.id);
        }

        // Step 8: compaction handling.
        if think_result.compacted {
            let (compaction_number, previous_last_node, history_size) = {
                let session = entry.session.lock();
                (session.compaction_count + 1, session.last_thinking_node_id, session.thinking_history.len())
            };
            let summary = think_result
                .compactions()
                .find_map(|b| match b {
                    thinking::ThinkingBlock::Compaction { summary } => Some(summary.clone()),
                    _ => None,
                })
                .unwrap_or_default();
            let reasoning = format!(
                "compaction #{compaction_number} at {}: pre-compaction node {:?}, cumulative_tokens={}, history_size={history_size}. {summary}",
                chrono::Utc::now(),
                previous_last_node,
                entry.session.lock().cumulative_output_tokens,
            );
            let boundary = self.graph.persist_compaction_boundary(
                session_id,
                reasoning,
                previous_last_node,
                compaction_number,
                "provider_signalled_compaction",
            );
            result.merge_persist_outcome(boundary.degraded, boundary.persistence_issues);
            let mut session = entry.session.lock();
            session.record_compaction();
            session.last_thinking_node_id = Some(boundary.node.id);
        }

        // Step 9 (effort restoration) happens automatically: `ThinkingEngine`
        // restores its default effort via `EffortGuard::drop` regardless of
        // how `think` above returned.

        Ok(result)
    }

    async fn knowledge_prelude(&self, memory: &memory_hierarchy::MemoryHierarchy, query: &str) -> String {
        let archival = memory.archival_search(query, KNOWLEDGE_SNIPPET_LIMIT).await;
        let recall = memory.recall_search(query, KNOWLEDGE_SNIPPET_LIMIT).await;

        let mut snippets: Vec<MemoryEntry> = archival.into_iter().chain(recall).collect();
        snippets.sort_by(|a, b| b.importance.partial_cmp(&a.importance).unwrap_or(std::cmp::Ordering::Equal));
        snippets.truncate(KNOWLEDGE_SNIPPET_LIMIT);

        if snippets.is_empty() {
            return String::new();
        }

        let mut lines = vec!["Relevant knowledge:".to_string()];
        for entry in snippets {
            let label = match entry.source {
                Source::KnowledgeBase => "knowledge",
                Source::ThinkingNode => "prior reasoning",
                Source::DecisionPoint => "prior decision",
                Source::Metacognitive => "metacognitive note",
                Source::UserInput => "prior input",
                Source::Compaction => "compacted summary",
            };
            lines.push(format!("- ({label}) {}", entry.content));
        }
        lines.join("\n")
    }

    /// Runs a fork and returns both the batched result and the ordered
    /// transport events a streaming caller would have seen (spec.md §5:
    /// branches appear in caller-specified order, comparison follows last
    /// branch, `done` is emitted separately by the caller).
    pub async fn fork(&self, query: &str, options: &ForkOptions) -> Result<(think_fork::ThinkForkResult, Vec<StreamEvent>)> {
        let result = self.fork_engine.fork(query, options).await?;
        let events = fork_events(&result);
        Ok((result, events))
    }

    pub async fn debate(&self, query: &str, options: &DebateOptions) -> Result<(think_fork::DebateResult, Vec<StreamEvent>)> {
        let result = self.fork_engine.debate(query, options).await?;
        let events = debate_events(&result);
        Ok((result, events))
    }
}
