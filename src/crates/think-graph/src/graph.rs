//! `ThinkGraph` — in-memory typed graph store with explicit partial-failure
//! reporting. Mirrors the registry shape: maps guarded by `RwLock`, CRUD
//! methods that translate lock-poisoning into a `GraphError`.

use crate::decision::DecisionPoint;
use crate::edge::{EdgeKind, ReasoningEdge};
use crate::error::{GraphError, Result};
use crate::node::{NodeType, ReasoningStep, ThinkingNode, TokenUsage};
use crate::parse::{derive_confidence, detect_structure};
use chrono::Utc;
use std::collections::{HashMap, HashSet};
use std::sync::RwLock;
use thinking::ThinkingBlock;
use tracing::{debug, warn};
use uuid::Uuid;

/// One thing that failed during `persist_thinking_node` without aborting
/// the whole batch.
#[derive(Debug, Clone, serde::Serialize)]
pub struct PersistenceIssue {
    pub stage: &'static str,
    pub step_number: Option<u32>,
    pub detail: String,
}

/// Result of `persist_thinking_node`: the node (synthesised in-memory even
/// on failure), whatever decision points made it in, and a degradation flag.
#[derive(Debug, Clone)]
pub struct PersistOutcome {
    pub node: ThinkingNode,
    pub decision_points: Vec<DecisionPoint>,
    pub linked_to_parent: bool,
    pub degraded: bool,
    pub persistence_issues: Vec<PersistenceIssue>,
}

fn poison_err(what: &str) -> GraphError {
    GraphError::Internal(format!("{what} lock poisoned"))
}

/// In-memory store for nodes, edges, and decision points.
pub struct ThinkGraph {
    nodes: RwLock<HashMap<Uuid, ThinkingNode>>,
    decision_points: RwLock<HashMap<Uuid, Vec<DecisionPoint>>>,
    edges: RwLock<Vec<ReasoningEdge>>,
    edge_keys: RwLock<HashSet<(Uuid, Uuid, EdgeKind)>>,
    outgoing: RwLock<HashMap<Uuid, Vec<Uuid>>>,
    incoming: RwLock<HashMap<Uuid, Vec<Uuid>>>,
}

impl Default for ThinkGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl ThinkGraph {
    pub fn new() -> Self {
        Self {
            nodes: RwLock::new(HashMap::new()),
            decision_points: RwLock::new(HashMap::new()),
            edges: RwLock::new(Vec::new()),
            edge_keys: RwLock::new(HashSet::new()),
            outgoing: RwLock::new(HashMap::new()),
            incoming: RwLock::new(HashMap::new()),
        }
    }

    fn coalesce_reasoning(blocks: &[ThinkingBlock]) -> String {
        blocks
            .iter()
            .filter_map(|b| b.reasoning_text())
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    fn insert_node(&self, node: ThinkingNode) -> Result<()> {
        let mut nodes = self.nodes.write().map_err(|_| poison_err("nodes"))?;
        nodes.insert(node.id, node);
        Ok(())
    }

    fn insert_decision_point(&self, dp: DecisionPoint) -> Result<()> {
        let mut points = self.decision_points.write().map_err(|_| poison_err("decision_points"))?;
        let existing = points.entry(dp.node_id).or_default();
        if existing.iter().any(|p| p.step_number == dp.step_number) {
            return Err(GraphError::Internal(format!(
                "duplicate step number {} for node {}",
                dp.step_number, dp.node_id
            )));
        }
        existing.push(dp);
        Ok(())
    }

    /// §4.2 step 1-6: coalesce, detect structure, compute confidence,
    /// insert node, insert decision points, link to parent.
    pub fn persist_thinking_node(
        &self,
        session_id: Uuid,
        blocks: &[ThinkingBlock],
        input_query: Option<String>,
        response: Option<String>,
        token_usage: TokenUsage,
        parent_id: Option<Uuid>,
    ) -> PersistOutcome {
        let reasoning = Self::coalesce_reasoning(blocks);
        let node_id = Uuid::new_v4();
        let structure = detect_structure(&reasoning, node_id);
        let (structured_reasoning, inline_decision_points): (Option<Vec<ReasoningStep>>, Vec<DecisionPoint>) =
            match structure {
                Some(parsed) => (Some(parsed.steps), parsed.decision_points),
                None => (None, Vec::new()),
            };
        let confidence = derive_confidence(structured_reasoning.as_deref());

        let node = ThinkingNode {
            id: node_id,
            session_id,
            reasoning,
            input_query,
            response,
            confidence,
            structured_reasoning,
            node_type: NodeType::Thinking,
            token_usage,
            parent_id,
            created_at: Utc::now(),
        };

        if let Err(err) = self.insert_node(node.clone()) {
            warn!(error = %err, "node insertion failed, returning degraded synthesised node");
            return PersistOutcome {
                node,
                decision_points: Vec::new(),
                linked_to_parent: false,
                degraded: true,
                persistence_issues: vec![PersistenceIssue {
                    stage: "node",
                    step_number: None,
                    detail: err.to_string(),
                }],
            };
        }

        let mut issues = Vec::new();
        let mut persisted_points = Vec::new();
        for dp in inline_decision_points {
            let step_number = dp.step_number;
            match self.insert_decision_point(dp.clone()) {
                Ok(()) => persisted_points.push(dp),
                Err(err) => issues.push(PersistenceIssue {
                    stage: "decision_point",
                    step_number: Some(step_number),
                    detail: err.to_string(),
                }),
            }
        }

        let mut linked_to_parent = false;
        if let Some(parent) = parent_id {
            match self.link_nodes(parent, node_id, EdgeKind::Influences, 1.0, None) {
                Ok(_) => linked_to_parent = true,
                Err(err) => issues.push(PersistenceIssue {
                    stage: "reasoning_edge",
                    step_number: None,
                    detail: err.to_string(),
                }),
            }
        }

        debug!(node_id = %node_id, issues = issues.len(), "persisted thinking node");

        PersistOutcome {
            degraded: !issues.is_empty(),
            node,
            decision_points: persisted_points,
            linked_to_parent,
            persistence_issues: issues,
        }
    }

    /// Validates distinctness and inserts the edge. Returns `true` if a new
    /// row was created, `false` if `(source, target, kind)` already existed.
    pub fn link_nodes(
        &self,
        source_id: Uuid,
        target_id: Uuid,
        kind: EdgeKind,
        weight: f64,
        metadata: Option<serde_json::Value>,
    ) -> Result<bool> {
        if source_id == target_id {
            return Err(GraphError::InvalidInput(
                "an edge's source and target must be distinct".to_string(),
            ));
        }
        let weight = weight.clamp(0.0, 1.0);
        let key = (source_id, target_id, kind);

        let mut keys = self.edge_keys.write().map_err(|_| poison_err("edge_keys"))?;
        if keys.contains(&key) {
            return Ok(false);
        }

        let edge = ReasoningEdge {
            id: Uuid::new_v4(),
            source_id,
            target_id,
            kind,
            weight,
            metadata,
            created_at: Utc::now(),
        };

        keys.insert(key);
        self.edges.write().map_err(|_| poison_err("edges"))?.push(edge);
        self.outgoing
            .write()
            .map_err(|_| poison_err("outgoing"))?
            .entry(source_id)
            .or_default()
            .push(target_id);
        self.incoming
            .write()
            .map_err(|_| poison_err("incoming"))?
            .entry(target_id)
            .or_default()
            .push(source_id);

        Ok(true)
    }

    /// Creates a compaction-boundary node and the `supersedes` edge linking
    /// it to the previous last node. §4.2 invariant: only this path may
    /// create a compaction node.
    pub fn persist_compaction_boundary(
        &self,
        session_id: Uuid,
        summary: String,
        previous_last_node: Option<Uuid>,
        compaction_number: u32,
        reason: &str,
    ) -> PersistOutcome {
        let node_id = Uuid::new_v4();
        let node = ThinkingNode {
            id: node_id,
            session_id,
            reasoning: summary,
            input_query: None,
            response: None,
            confidence: 1.0,
            structured_reasoning: None,
            node_type: NodeType::Compaction,
            token_usage: TokenUsage::default(),
            parent_id: previous_last_node,
            created_at: Utc::now(),
        };

        if let Err(err) = self.insert_node(node.clone()) {
            return PersistOutcome {
                node,
                decision_points: Vec::new(),
                linked_to_parent: false,
                degraded: true,
                persistence_issues: vec![PersistenceIssue {
                    stage: "node",
                    step_number: None,
                    detail: err.to_string(),
                }],
            };
        }

        let mut issues = Vec::new();
        let mut linked = false;
        if let Some(previous) = previous_last_node {
            let metadata = serde_json::json!({ "compactionNumber": compaction_number, "reason": reason });
            match self.link_nodes(previous, node_id, EdgeKind::Supersedes, 1.0, Some(metadata)) {
                Ok(_) => linked = true,
                Err(err) => issues.push(PersistenceIssue {
                    stage: "reasoning_edge",
                    step_number: None,
                    detail: err.to_string(),
                }),
            }
        }

        PersistOutcome {
            degraded: !issues.is_empty(),
            node,
            decision_points: Vec::new(),
            linked_to_parent: linked,
            persistence_issues: issues,
        }
    }

    // ---- traversal (pure reads, no side effects) ----------------------

    pub fn get_node(&self, id: Uuid) -> Result<Option<ThinkingNode>> {
        Ok(self.nodes.read().map_err(|_| poison_err("nodes"))?.get(&id).cloned())
    }

    pub fn get_decision_points(&self, node_id: Uuid) -> Result<Vec<DecisionPoint>> {
        Ok(self
            .decision_points
            .read()
            .map_err(|_| poison_err("decision_points"))?
            .get(&node_id)
            .cloned()
            .unwrap_or_default())
    }

    pub fn get_outgoing(&self, node_id: Uuid) -> Result<Vec<ReasoningEdge>> {
        let edges = self.edges.read().map_err(|_| poison_err("edges"))?;
        Ok(edges.iter().filter(|e| e.source_id == node_id).cloned().collect())
    }

    pub fn get_incoming(&self, node_id: Uuid) -> Result<Vec<ReasoningEdge>> {
        let edges = self.edges.read().map_err(|_| poison_err("edges"))?;
        Ok(edges.iter().filter(|e| e.target_id == node_id).cloned().collect())
    }

    /// Breadth-first walk outward from `from`, bounded by `depth`, with an
    /// explicit visited set (the graph is semantically cyclic).
    pub fn get_chain(&self, from: Uuid, depth: usize) -> Result<Vec<ThinkingNode>> {
        let outgoing = self.outgoing.read().map_err(|_| poison_err("outgoing"))?;
        let nodes = self.nodes.read().map_err(|_| poison_err("nodes"))?;

        let mut visited = HashSet::new();
        let mut frontier = vec![from];
        let mut chain = Vec::new();
        visited.insert(from);

        for _ in 0..depth {
            let mut next_frontier = Vec::new();
            for current in &frontier {
                if let Some(neighbours) = outgoing.get(current) {
                    for &neighbour in neighbours {
                        if visited.insert(neighbour) {
                            if let Some(node) = nodes.get(&neighbour) {
                                chain.push(node.clone());
                            }
                            next_frontier.push(neighbour);
                        }
                    }
                }
            }
            if next_frontier.is_empty() {
                break;
            }
            frontier = next_frontier;
        }

        Ok(chain)
    }

    /// Case-insensitive substring search over reasoning and response text.
    pub fn search(&self, text: &str) -> Result<Vec<ThinkingNode>> {
        let needle = text.to_lowercase();
        let nodes = self.nodes.read().map_err(|_| poison_err("nodes"))?;
        Ok(nodes
            .values()
            .filter(|n| {
                n.reasoning.to_lowercase().contains(&needle)
                    || n.response.as_deref().unwrap_or_default().to_lowercase().contains(&needle)
            })
            .cloned()
            .collect())
    }

    pub fn node_count(&self) -> Result<usize> {
        Ok(self.nodes.read().map_err(|_| poison_err("nodes"))?.len())
    }

    pub fn edge_count(&self) -> Result<usize> {
        Ok(self.edges.read().map_err(|_| poison_err("edges"))?.len())
    }
}
