//! # Core Data Types
//!
//! The request-scoped values that flow through the pipeline: the closed set of
//! classification labels, the typed agent trace, and the uniform outcome.

use crate::errors::PromptError;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// The three-way category assigned to an incoming question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassificationLabel {
    /// Answering requires running SQL against the data.
    DataQuery,
    /// A question about tables, columns or relationships.
    SchemaQuery,
    /// Anything else.
    GeneralChat,
}

impl ClassificationLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DataQuery => "data_query",
            Self::SchemaQuery => "schema_query",
            Self::GeneralChat => "general_chat",
        }
    }
}

impl fmt::Display for ClassificationLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ClassificationLabel {
    type Err = PromptError;

    /// Parses an already normalized label. Anything outside the three known
    /// labels is an error; there is no default branch.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "data_query" => Ok(Self::DataQuery),
            "schema_query" => Ok(Self::SchemaQuery),
            "general_chat" => Ok(Self::GeneralChat),
            other => Err(PromptError::UnrecognizedLabel(other.to_string())),
        }
    }
}

/// The rendered description of one table, plus its embedding.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaDocument {
    pub table_name: String,
    pub schema_text: String,
    pub embedding: Vec<f32>,
}

/// A tool invocation proposed by the SQL agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "tool", rename_all = "snake_case")]
pub enum AgentAction {
    /// Execute a SQL statement against the live database.
    SqlDbQuery { query: String },
    /// Describe the given comma-separated tables.
    SqlDbSchema { table_names: String },
    /// List the usable tables.
    SqlDbListTables,
    /// Ask the model to double-check a query before running it.
    SqlDbQueryChecker { query: String },
    /// The model named a tool that does not exist.
    InvalidTool { requested: String },
}

impl AgentAction {
    /// The tool identifier as the model sees it.
    pub fn tool_name(&self) -> &str {
        match self {
            Self::SqlDbQuery { .. } => "sql_db_query",
            Self::SqlDbSchema { .. } => "sql_db_schema",
            Self::SqlDbListTables => "sql_db_list_tables",
            Self::SqlDbQueryChecker { .. } => "sql_db_query_checker",
            Self::InvalidTool { requested } => requested,
        }
    }
}

/// One (action, observation) pair of an agent run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AgentStep {
    pub action: AgentAction,
    pub observation: String,
}

/// The ordered log of tool invocations produced while answering a data query.
pub type AgentTrace = Vec<AgentStep>;

/// The result of one SQL agent invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentRun {
    pub output: String,
    pub trace: AgentTrace,
}

/// The uniform result of routing a question.
///
/// `sql_query` is `None` when no SQL is applicable (schema and chat paths). On
/// the data path it is always `Some`, holding either the executed statement or
/// the [`SQL_QUERY_NOT_FOUND`](crate::constants::SQL_QUERY_NOT_FOUND) sentinel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryOutcome {
    pub response: String,
    pub sql_query: Option<String>,
}

/// A reusable configuration for a specific AI provider instance.
#[derive(Debug, Deserialize, Clone)]
pub struct ProviderConfig {
    /// The type of provider (e.g., "gemini", "local").
    pub provider: String,
    /// The API URL. Optional for Gemini, where it is derived from the model name.
    #[serde(default)]
    pub api_url: Option<String>,
    /// The API key, which can be null for local providers.
    #[serde(default)]
    pub api_key: Option<String>,
    pub model_name: String,
    /// Sampling temperature; the provider default is used when unset.
    #[serde(default)]
    pub temperature: Option<f32>,
}

/// A fully resolved task configuration with non-optional fields.
#[derive(Clone, Debug)]
pub struct ResolvedTask {
    pub provider: String,
    pub system_prompt: String,
    pub user_prompt: String,
}
