//! The four database tools the SQL agent may call, bound to one storage backend.

use super::policy::StatementPolicy;
use crate::{
    errors::PromptError, prompts::render, providers::ai::AiProvider,
    providers::db::storage::Storage, types::AgentAction, types::ResolvedTask,
};
use std::sync::Arc;
use tracing::{debug, info};

pub const TOOL_NAMES: [&str; 4] = [
    "sql_db_query",
    "sql_db_schema",
    "sql_db_list_tables",
    "sql_db_query_checker",
];

const TOOL_DESCRIPTIONS: [(&str, &str, &str); 4] = [
    (
        "sql_db_query",
        r#"{"query": "<SQL>"}"#,
        "Executes a detailed and correct SQL query and returns the rows as JSON. If you hit an unknown column, use sql_db_schema to look up the correct table fields.",
    ),
    (
        "sql_db_schema",
        r#"{"table_names": "table1, table2"}"#,
        "Returns the schema and sample rows for a comma-separated list of tables. Make sure the tables exist by calling sql_db_list_tables first.",
    ),
    (
        "sql_db_list_tables",
        "{}",
        "Returns a comma-separated list of the tables in the database.",
    ),
    (
        "sql_db_query_checker",
        r#"{"query": "<SQL>"}"#,
        "Double checks a query for common mistakes. Always use this tool before executing a query with sql_db_query.",
    ),
];

/// Renders the tool list injected into the agent's `{tools}` placeholder.
pub fn describe_tools() -> String {
    TOOL_DESCRIPTIONS
        .iter()
        .map(|(name, input, description)| format!("- {name}: {description} Input: {input}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// The model-backed `sql_db_query_checker` tool.
#[derive(Debug, Clone)]
pub struct QueryChecker {
    ai_provider: Box<dyn AiProvider>,
    system_prompt: String,
    user_prompt: String,
}

impl QueryChecker {
    pub fn new(ai_provider: Box<dyn AiProvider>, task: &ResolvedTask) -> Self {
        Self {
            ai_provider,
            system_prompt: task.system_prompt.clone(),
            user_prompt: task.user_prompt.clone(),
        }
    }

    pub async fn check(&self, query: &str, dialect: &str) -> Result<String, PromptError> {
        let system_prompt = render(&self.system_prompt, &[("dialect", dialect)]);
        let user_prompt = render(&self.user_prompt, &[("query", query)]);
        let checked = self
            .ai_provider
            .generate(&system_prompt, &user_prompt)
            .await?;
        Ok(checked.trim().to_string())
    }
}

#[derive(Debug, Clone)]
pub struct SqlToolkit {
    storage: Arc<dyn Storage>,
    checker: QueryChecker,
    policy: StatementPolicy,
}

impl SqlToolkit {
    pub fn new(storage: Arc<dyn Storage>, checker: QueryChecker, policy: StatementPolicy) -> Self {
        Self {
            storage,
            checker,
            policy,
        }
    }

    pub fn dialect(&self) -> &str {
        self.storage.dialect()
    }

    /// Runs one action and returns the observation fed back to the model.
    ///
    /// Unknown tools and unknown table names become observations the model can
    /// recover from. Query execution errors and policy rejections are returned
    /// as errors and end the run.
    pub async fn invoke(&self, action: &AgentAction) -> Result<String, PromptError> {
        match action {
            AgentAction::SqlDbQuery { query } => {
                self.policy.check(query)?;
                info!("--> Executing agent query: {query}");
                self.storage.execute_query(query).await
            }
            AgentAction::SqlDbSchema { table_names } => self.describe_tables(table_names).await,
            AgentAction::SqlDbListTables => Ok(self.storage.list_tables().await?.join(", ")),
            AgentAction::SqlDbQueryChecker { query } => {
                self.checker.check(query, self.storage.dialect()).await
            }
            AgentAction::InvalidTool { requested } => Ok(format!(
                "{requested} is not a valid tool, try one of [{}].",
                TOOL_NAMES.join(", ")
            )),
        }
    }

    async fn describe_tables(&self, table_names: &str) -> Result<String, PromptError> {
        let requested: Vec<&str> = table_names
            .split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .collect();
        let known = self.storage.list_tables().await?;

        let missing: Vec<&str> = requested
            .iter()
            .copied()
            .filter(|name| !known.iter().any(|k| k == name))
            .collect();
        if requested.is_empty() || !missing.is_empty() {
            let names = if requested.is_empty() { vec![table_names] } else { missing };
            debug!("Agent asked for unknown tables: {names:?}");
            return Ok(format!(
                "Error: table_names {{{}}} not found in database",
                names.join(", ")
            ));
        }

        let mut infos = Vec::with_capacity(requested.len());
        for name in requested {
            infos.push(self.storage.get_table_info(name).await?);
        }
        Ok(infos.join("\n\n"))
    }
}
