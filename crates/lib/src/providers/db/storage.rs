use crate::errors::PromptError;
use async_trait::async_trait;
use dyn_clone::DynClone;
use std::fmt::Debug;

/// A trait for interacting with a storage backend.
///
/// This is the database toolkit's view of the world: introspection for the
/// schema index and the agent's describe/list tools, and read execution for the
/// agent's query tool.
#[async_trait]
pub trait Storage: Send + Sync + DynClone + Debug {
    /// Returns the SQL dialect injected into generation prompts (e.g., "sqlite").
    fn dialect(&self) -> &str;

    /// Lists every usable table, in a stable order.
    async fn list_tables(&self) -> Result<Vec<String>, PromptError>;

    /// Renders one table's structure: its DDL followed by a few sample rows.
    async fn get_table_info(&self, table_name: &str) -> Result<String, PromptError>;

    /// Executes a SQL query against the storage provider.
    ///
    /// The result should be a JSON formatted string.
    async fn execute_query(&self, query: &str) -> Result<String, PromptError>;
}

dyn_clone::clone_trait_object!(Storage);
