#![allow(dead_code)]
//! # Common Test Utilities
//!
//! This module provides shared utilities for testing, such as scripted model
//! providers, a keyword embedder and an in-memory storage double, so the pipeline
//! can be exercised without any network access.

use askdb::{
    prompts::tasks,
    providers::{
        ai::{AiProvider, EmbeddingProvider},
        db::{sqlite::SqliteProvider, storage::Storage},
    },
    PromptError, ResolvedTask,
};
use async_trait::async_trait;
use dotenvy::dotenv;
use std::{
    collections::HashMap,
    sync::{Arc, Once, RwLock},
    time::Duration,
};

static INIT: Once = Once::new();

/// Initializes the tracing subscriber and loads .env for tests.
pub fn setup_tracing() {
    INIT.call_once(|| {
        dotenv().ok();
        tracing_subscriber::fmt().with_test_writer().init();
    });
}

pub const EMPLOYEES_AND_ORDERS_SQL: &str = "
    CREATE TABLE employees (id INTEGER PRIMARY KEY, name TEXT NOT NULL, department TEXT, salary REAL);
    INSERT INTO employees (id, name, department, salary) VALUES (1, 'Alice', 'Engineering', 120000.0);
    INSERT INTO employees (id, name, department, salary) VALUES (2, 'Bob', 'Sales', 80000.0);
    INSERT INTO employees (id, name, department, salary) VALUES (3, 'Carol', 'Engineering', 110000.0);
    INSERT INTO employees (id, name, department, salary) VALUES (4, 'Dan', 'Support', 60000.0);
    CREATE TABLE orders (id INTEGER PRIMARY KEY, employee_id INTEGER, amount REAL, placed_at TEXT);
    INSERT INTO orders (id, employee_id, amount, placed_at) VALUES (1, 2, 250.0, '2024-01-03');
    INSERT INTO orders (id, employee_id, amount, placed_at) VALUES (2, 2, 75.5, '2024-02-11');
";

/// An in-memory SQLite database with `employees` (4 rows) and `orders` (2 rows).
pub async fn seeded_sqlite() -> SqliteProvider {
    let provider = SqliteProvider::new(":memory:")
        .await
        .expect("Failed to create SqliteProvider");
    provider
        .initialize_with_data(EMPLOYEES_AND_ORDERS_SQL)
        .await
        .expect("Failed to seed database");
    provider
}

/// The built-in task prompts, all bound to the same provider name.
pub fn default_tasks(provider: &str) -> HashMap<String, ResolvedTask> {
    tasks::default_tasks(provider)
}

pub fn task(name: &str) -> ResolvedTask {
    default_tasks("mock")
        .remove(name)
        .expect("unknown task name")
}

// --- Mock AI Provider for Logic Testing ---

/// Replays scripted responses in order and records every call.
///
/// Clones share their script and history, so a test can keep one handle while
/// the pipeline owns another.
#[derive(Clone, Debug)]
pub struct MockAiProvider {
    pub call_history: Arc<RwLock<Vec<(String, String)>>>,
    pub responses: Arc<RwLock<Vec<String>>>,
    pub delay: Option<Duration>,
}

impl MockAiProvider {
    pub fn new(responses: Vec<&str>) -> Self {
        Self {
            call_history: Arc::new(RwLock::new(Vec::new())),
            responses: Arc::new(RwLock::new(
                responses.into_iter().rev().map(String::from).collect(),
            )),
            delay: None,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> Vec<(String, String)> {
        self.call_history.read().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.call_history.read().unwrap().len()
    }
}

#[async_trait]
impl AiProvider for MockAiProvider {
    async fn generate(&self, system_prompt: &str, user_prompt: &str) -> Result<String, PromptError> {
        self.call_history
            .write()
            .unwrap()
            .push((system_prompt.to_string(), user_prompt.to_string()));

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let next = self.responses.write().unwrap().pop();
        next.ok_or_else(|| PromptError::AiApi("Mock provider ran out of responses".to_string()))
    }
}

// --- Mock Embedding Provider ---

/// Embeds text as keyword counts over a fixed vocabulary.
#[derive(Clone, Debug)]
pub struct KeywordEmbedder {
    vocabulary: Vec<String>,
    pub fail: bool,
    pub calls: Arc<RwLock<usize>>,
}

impl KeywordEmbedder {
    pub fn new(vocabulary: &[&str]) -> Self {
        Self {
            vocabulary: vocabulary.iter().map(|w| w.to_lowercase()).collect(),
            fail: false,
            calls: Arc::new(RwLock::new(0)),
        }
    }

    /// The vocabulary used with the seeded employees/orders database.
    pub fn for_company() -> Self {
        Self::new(&["employee", "salary", "department", "name", "order", "amount", "placed"])
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::for_company()
        }
    }

    pub fn call_count(&self) -> usize {
        *self.calls.read().unwrap()
    }
}

#[async_trait]
impl EmbeddingProvider for KeywordEmbedder {
    async fn embed(&self, input: &str) -> Result<Vec<f32>, PromptError> {
        *self.calls.write().unwrap() += 1;
        if self.fail {
            return Err(PromptError::AiApi("embedding service unavailable".to_string()));
        }
        let text = input.to_lowercase();
        Ok(self
            .vocabulary
            .iter()
            .map(|word| text.matches(word.as_str()).count() as f32)
            .collect())
    }
}

// --- Mock Storage Provider for Testing ---

/// A storage double with canned table descriptions and query results.
#[derive(Clone, Debug, Default)]
pub struct MockStorage {
    pub tables: Vec<(String, String)>,
    pub query_result: String,
    pub introspection_fails: bool,
    pub execute_error: Option<String>,
    pub executed: Arc<RwLock<Vec<String>>>,
}

impl MockStorage {
    pub fn with_tables(tables: &[(&str, &str)]) -> Self {
        Self {
            tables: tables
                .iter()
                .map(|(name, info)| (name.to_string(), info.to_string()))
                .collect(),
            query_result: "[]".to_string(),
            ..Default::default()
        }
    }

    pub fn unreachable() -> Self {
        Self {
            introspection_fails: true,
            ..Default::default()
        }
    }

    pub fn executed(&self) -> Vec<String> {
        self.executed.read().unwrap().clone()
    }
}

#[async_trait]
impl Storage for MockStorage {
    fn dialect(&self) -> &str {
        "sqlite"
    }

    async fn list_tables(&self) -> Result<Vec<String>, PromptError> {
        if self.introspection_fails {
            return Err(PromptError::StorageConnection("connection refused".to_string()));
        }
        Ok(self.tables.iter().map(|(name, _)| name.clone()).collect())
    }

    async fn get_table_info(&self, table_name: &str) -> Result<String, PromptError> {
        self.tables
            .iter()
            .find(|(name, _)| name == table_name)
            .map(|(_, info)| info.clone())
            .ok_or_else(|| {
                PromptError::StorageOperationFailed(format!("Table '{table_name}' not found."))
            })
    }

    async fn execute_query(&self, query: &str) -> Result<String, PromptError> {
        self.executed.write().unwrap().push(query.to_string());
        match &self.execute_error {
            Some(message) => Err(PromptError::StorageOperationFailed(message.clone())),
            None => Ok(self.query_result.clone()),
        }
    }
}

/// Wraps a storage in the `Arc<dyn Storage>` the toolkit expects.
pub fn shared(storage: impl Storage + 'static) -> Arc<dyn Storage> {
    Arc::new(storage)
}
