//! Turns one raw model reply into either a tool invocation or a final answer.
//!
//! The model is asked for `{"tool": ..., "tool_input": {...}}` or
//! `{"final_answer": ...}`. Code fences and a leading sentence before a bare
//! object are tolerated; a reply that carries no JSON object at all is taken as
//! the final answer.

use crate::{errors::PromptError, types::AgentAction};
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;

/// What the agent decided to do on one turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgentDecision {
    Act(AgentAction),
    Finish(String),
}

#[derive(Deserialize, Debug)]
struct RawReply {
    #[serde(default)]
    tool: Option<String>,
    #[serde(default)]
    tool_input: Value,
    #[serde(default)]
    final_answer: Option<Value>,
}

pub fn parse_reply(reply: &str) -> Result<AgentDecision, PromptError> {
    let candidate = extract_json(reply)?;
    let raw: RawReply = match serde_json::from_str::<Value>(candidate.text()) {
        Ok(value @ Value::Object(_)) => serde_json::from_value(value)?,
        _ => return Ok(AgentDecision::Finish(reply.trim().to_string())),
    };

    if let Some(answer) = raw.final_answer {
        return Ok(AgentDecision::Finish(value_to_text(answer)));
    }

    match (raw.tool, candidate) {
        (Some(tool), _) => Ok(AgentDecision::Act(action_from(tool.trim(), &raw.tool_input)?)),
        // An object quoted inside prose is part of the answer, not a malformed call.
        (None, JsonCandidate::Embedded(_)) => Ok(AgentDecision::Finish(reply.trim().to_string())),
        (None, JsonCandidate::Whole(text)) => Err(PromptError::AgentOutputParsing(format!(
            "reply has neither `tool` nor `final_answer`: {text}"
        ))),
    }
}

enum JsonCandidate {
    /// The fenced block, or the whole reply.
    Whole(String),
    /// The outermost `{...}` span of a reply that also carries prose.
    Embedded(String),
}

impl JsonCandidate {
    fn text(&self) -> &str {
        match self {
            Self::Whole(text) | Self::Embedded(text) => text,
        }
    }
}

fn extract_json(reply: &str) -> Result<JsonCandidate, PromptError> {
    let re = Regex::new(r"```(?:json)?\s*([\s\S]*?)```|(\{[\s\S]*\})")?;
    let trimmed = reply.trim();
    let candidate = match re.captures(trimmed) {
        Some(caps) => match (caps.get(1), caps.get(2)) {
            (Some(fenced), _) => JsonCandidate::Whole(fenced.as_str().trim().to_string()),
            (None, Some(span)) if span.as_str() == trimmed => {
                JsonCandidate::Whole(trimmed.to_string())
            }
            (None, Some(span)) => JsonCandidate::Embedded(span.as_str().to_string()),
            (None, None) => JsonCandidate::Whole(trimmed.to_string()),
        },
        None => JsonCandidate::Whole(trimmed.to_string()),
    };
    Ok(candidate)
}

fn action_from(tool: &str, input: &Value) -> Result<AgentAction, PromptError> {
    let action = match tool {
        "sql_db_query" => AgentAction::SqlDbQuery {
            query: required_arg(tool, input, "query")?,
        },
        "sql_db_schema" => AgentAction::SqlDbSchema {
            table_names: required_arg(tool, input, "table_names")?,
        },
        "sql_db_list_tables" => AgentAction::SqlDbListTables,
        "sql_db_query_checker" => AgentAction::SqlDbQueryChecker {
            query: required_arg(tool, input, "query")?,
        },
        other => AgentAction::InvalidTool {
            requested: other.to_string(),
        },
    };
    Ok(action)
}

/// Reads `key` from an object input. A bare string input is accepted as the
/// value of the tool's only argument, and string arrays are comma-joined.
fn required_arg(tool: &str, input: &Value, key: &str) -> Result<String, PromptError> {
    let value = match input {
        Value::Object(map) => map.get(key),
        other => Some(other),
    };
    let text = match value {
        Some(Value::String(s)) => Some(s.clone()),
        Some(Value::Array(items)) => Some(
            items
                .iter()
                .filter_map(Value::as_str)
                .collect::<Vec<_>>()
                .join(", "),
        ),
        _ => None,
    };
    text.filter(|t| !t.trim().is_empty()).ok_or_else(|| {
        PromptError::AgentOutputParsing(format!("`{tool}` requires a `{key}` input"))
    })
}

fn value_to_text(value: Value) -> String {
    match value {
        Value::String(s) => s,
        other => other.to_string(),
    }
}
