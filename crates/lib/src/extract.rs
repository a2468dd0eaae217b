//! Reduces a finished agent run to the uniform `{response, sql_query}` shape.

use crate::{
    constants::{FINAL_ANSWER_NOT_FOUND, SQL_QUERY_NOT_FOUND},
    types::{AgentAction, AgentStep, QueryOutcome},
};

/// Builds the data-path outcome.
///
/// `sql_query` is the input of the *first* `sql_db_query` step, even when later
/// steps ran other statements. Without one it holds the not-found sentinel, so
/// it is never `None` on this path.
pub fn extract(trace: &[AgentStep], final_answer: String) -> QueryOutcome {
    let sql_query = trace
        .iter()
        .find_map(|step| match &step.action {
            AgentAction::SqlDbQuery { query } => Some(query.clone()),
            _ => None,
        })
        .unwrap_or_else(|| SQL_QUERY_NOT_FOUND.to_string());

    let response = if final_answer.trim().is_empty() {
        FINAL_ANSWER_NOT_FOUND.to_string()
    } else {
        final_answer
    };

    QueryOutcome {
        response,
        sql_query: Some(sql_query),
    }
}
