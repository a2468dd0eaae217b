//! # Shared Constants
//!
//! Defaults and sentinel strings shared by the pipeline stages and the server.
//! Keeping them here avoids "magic strings" drifting between the agent, the
//! extractor and the tests that assert on them.

/// Number of schema documents retrieved for the SQL agent's context.
pub const DEFAULT_SCHEMA_RETRIEVER_K: usize = 3;

/// Row cap communicated to the SQL agent unless the user asks for more.
pub const DEFAULT_TOP_K_RESULTS: usize = 5;

/// Maximum number of model turns in one SQL agent run.
pub const DEFAULT_MAX_AGENT_ITERATIONS: usize = 15;

/// Deadline applied to a whole `route` call.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;

/// Number of sample rows rendered under each table's DDL.
pub const SAMPLE_ROWS_IN_TABLE_INFO: usize = 3;

/// Placed in `sql_query` on the data path when the trace holds no executed query.
pub const SQL_QUERY_NOT_FOUND: &str = "SQL Query not found.";

/// Used as the response when the agent finished with an empty answer.
pub const FINAL_ANSWER_NOT_FOUND: &str = "Could not find final answer.";

/// The agent's answer when the iteration ceiling is reached.
pub const AGENT_ITERATION_LIMIT_ANSWER: &str =
    "Agent stopped due to iteration limit or time limit.";

/// The phrase the schema responder must use for facts absent from the schema.
pub const SCHEMA_NOT_AVAILABLE_PHRASE: &str =
    "This information is not available in the current schema";

// --- Task names, as used in `config.yml` ---

pub const TASK_INTENT_CLASSIFICATION: &str = "intent_classification";
pub const TASK_SCHEMA_ANSWER: &str = "schema_answer";
pub const TASK_SQL_AGENT: &str = "sql_agent";
pub const TASK_SQL_QUERY_CHECKER: &str = "sql_query_checker";
pub const TASK_GENERAL_CHAT: &str = "general_chat";
