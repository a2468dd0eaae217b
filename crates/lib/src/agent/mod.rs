//! # SQL Agent
//!
//! A bounded tool-calling loop over the database. Each turn the model sees the
//! question, the retrieved schema and a scratchpad of previous actions, and
//! replies with either one tool call or a final answer.

pub mod parser;
pub mod policy;
pub mod tools;

use self::{
    parser::{parse_reply, AgentDecision},
    policy::StatementPolicy,
    tools::{describe_tools, SqlToolkit},
};
use crate::{
    constants::{AGENT_ITERATION_LIMIT_ANSWER, DEFAULT_MAX_AGENT_ITERATIONS, DEFAULT_TOP_K_RESULTS},
    errors::PromptError,
    prompts::render,
    providers::ai::AiProvider,
    types::{AgentAction, AgentRun, AgentStep, ResolvedTask},
};
use serde_json::json;
use tracing::{debug, info, warn};

const EMPTY_SCRATCHPAD: &str = "(no actions yet)";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AgentSettings {
    /// Row cap communicated to the model through `{top_k}`.
    pub top_k: usize,
    /// Maximum number of model turns before the run is abandoned.
    pub max_iterations: usize,
    pub policy: StatementPolicy,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            top_k: DEFAULT_TOP_K_RESULTS,
            max_iterations: DEFAULT_MAX_AGENT_ITERATIONS,
            policy: StatementPolicy::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SqlAgent {
    ai_provider: Box<dyn AiProvider>,
    toolkit: SqlToolkit,
    system_prompt: String,
    user_prompt: String,
    settings: AgentSettings,
}

impl SqlAgent {
    pub fn new(
        ai_provider: Box<dyn AiProvider>,
        task: &ResolvedTask,
        toolkit: SqlToolkit,
        settings: AgentSettings,
    ) -> Self {
        Self {
            ai_provider,
            toolkit,
            system_prompt: task.system_prompt.clone(),
            user_prompt: task.user_prompt.clone(),
            settings,
        }
    }

    /// Answers a data question. `table_info` is the retrieved schema context.
    pub async fn run(&self, question: &str, table_info: &str) -> Result<AgentRun, PromptError> {
        let top_k = self.settings.top_k.to_string();
        let tools = describe_tools();
        let system_prompt = render(
            &self.system_prompt,
            &[
                ("dialect", self.toolkit.dialect()),
                ("top_k", &top_k),
                ("tools", &tools),
                ("table_info", table_info),
            ],
        );

        let mut trace = Vec::new();
        for iteration in 1..=self.settings.max_iterations {
            let scratchpad = render_scratchpad(&trace);
            let user_prompt = render(
                &self.user_prompt,
                &[("prompt", question), ("scratchpad", &scratchpad)],
            );
            let reply = self
                .ai_provider
                .generate(&system_prompt, &user_prompt)
                .await?;
            debug!(iteration, "<-- Agent reply: {reply}");

            match parse_reply(&reply)? {
                AgentDecision::Finish(output) => {
                    info!(steps = trace.len(), "SQL agent produced a final answer.");
                    return Ok(AgentRun { output, trace });
                }
                AgentDecision::Act(action) => {
                    info!(iteration, tool = action.tool_name(), "SQL agent calling tool.");
                    let observation = self.toolkit.invoke(&action).await?;
                    trace.push(AgentStep {
                        action,
                        observation,
                    });
                }
            }
        }

        warn!(
            max_iterations = self.settings.max_iterations,
            "SQL agent hit the iteration limit."
        );
        Ok(AgentRun {
            output: AGENT_ITERATION_LIMIT_ANSWER.to_string(),
            trace,
        })
    }
}

fn render_scratchpad(trace: &[AgentStep]) -> String {
    if trace.is_empty() {
        return EMPTY_SCRATCHPAD.to_string();
    }
    trace
        .iter()
        .map(|step| {
            format!(
                "Action: {}\nAction Input: {}\nObservation: {}",
                step.action.tool_name(),
                action_input(&step.action),
                step.observation
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn action_input(action: &AgentAction) -> serde_json::Value {
    match action {
        AgentAction::SqlDbQuery { query } | AgentAction::SqlDbQueryChecker { query } => {
            json!({ "query": query })
        }
        AgentAction::SqlDbSchema { table_names } => json!({ "table_names": table_names }),
        AgentAction::SqlDbListTables | AgentAction::InvalidTool { .. } => json!({}),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scratchpad_starts_empty_and_replays_steps_in_order() {
        assert_eq!(render_scratchpad(&[]), EMPTY_SCRATCHPAD);

        let trace = vec![
            AgentStep {
                action: AgentAction::SqlDbListTables,
                observation: "employees, orders".to_string(),
            },
            AgentStep {
                action: AgentAction::SqlDbQuery {
                    query: "SELECT COUNT(*) FROM employees".to_string(),
                },
                observation: r#"[{"COUNT(*)":3}]"#.to_string(),
            },
        ];
        let pad = render_scratchpad(&trace);
        let list_pos = pad.find("Action: sql_db_list_tables").unwrap();
        let query_pos = pad.find("Action: sql_db_query\n").unwrap();
        assert!(list_pos < query_pos);
        assert!(pad.contains(r#"Action Input: {"query":"SELECT COUNT(*) FROM employees"}"#));
        assert!(pad.contains("Observation: employees, orders"));
    }
}
