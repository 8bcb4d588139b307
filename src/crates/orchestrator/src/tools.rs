//! Orchestrator-level tool schemas and the `TaskPlan` they populate
//! (spec.md §4.5 step 4, §6).

use serde::{Deserialize, Serialize};
use serde_json::json;
use thinking::ToolDefinition;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskPlan {
    pub goal: String,
    pub tasks: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutingDecision {
    pub agent: String,
    pub context: String,
}

pub fn create_task_plan() -> ToolDefinition {
    ToolDefinition::new(
        "create_task_plan",
        "Record the goal and the ordered list of tasks needed to achieve it.",
        json!({
            "type": "object",
            "properties": {
                "goal": {"type": "string"},
                "tasks": {"type": "array", "items": {"type": "string"}}
            },
            "required": ["goal", "tasks"]
        }),
    )
}

pub fn route_to_agent() -> ToolDefinition {
    ToolDefinition::new(
        "route_to_agent",
        "Route this request to the named downstream agent with supporting context.",
        json!({
            "type": "object",
            "properties": {
                "agent": {"type": "string"},
                "context": {"type": "string"}
            },
            "required": ["agent", "context"]
        }),
    )
}

pub(crate) fn extract_task_plan(result: &thinking::ThinkResult) -> Option<TaskPlan> {
    result.tool_uses().find_map(|block| match block {
        thinking::ThinkingBlock::ToolUse { name, input } if name == "create_task_plan" => {
            let goal = input.get("goal")?.as_str()?.to_string();
            let tasks = input
                .get("tasks")
                .and_then(|v| v.as_array())
                .map(|items| items.iter().filter_map(|v| v.as_str().map(str::to_string)).collect())
                .unwrap_or_default();
            Some(TaskPlan { goal, tasks })
        }
        _ => None,
    })
}
