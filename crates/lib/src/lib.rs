//! # Natural Language Database Questions
//!
//! This crate answers free-text questions about a relational database. A question
//! is classified, then handled by exactly one of three paths: a tool-using SQL
//! agent for data questions, a schema responder for structural questions, or a
//! plain chat responder for everything else.

pub mod agent;
pub mod chat;
pub mod classifier;
pub mod constants;
pub mod errors;
pub mod executor;
pub mod extract;
pub mod prompts;
pub mod providers;
pub mod schema_index;
pub mod schema_qa;
pub mod types;

pub use agent::{policy::StatementPolicy, AgentSettings, SqlAgent};
pub use errors::PromptError;
pub use executor::{AskdbExecutor, ExecutorSettings};
pub use schema_index::SchemaIndex;
pub use types::{ClassificationLabel, QueryOutcome, ResolvedTask};
