//! # Schema Index Tests
//!
//! Builds the index over a real in-memory SQLite database with a deterministic
//! keyword embedder, and checks retrieval and the degraded startup path.

mod common;

use crate::common::{seeded_sqlite, setup_tracing, KeywordEmbedder, MockStorage};
use askdb::{PromptError, SchemaIndex};
use std::sync::Arc;

#[tokio::test]
async fn test_build_indexes_every_table_in_enumeration_order() {
    setup_tracing();

    // 1. Arrange
    let db = seeded_sqlite().await;
    let embedder = KeywordEmbedder::for_company();

    // 2. Act
    let index = SchemaIndex::build(&db, Arc::new(embedder.clone()))
        .await
        .unwrap();

    // 3. Assert
    let names: Vec<&str> = index
        .documents()
        .iter()
        .map(|d| d.table_name.as_str())
        .collect();
    assert_eq!(names, vec!["employees", "orders"]);
    assert_eq!(embedder.call_count(), 2);

    let full = index.full_schema();
    let employees_pos = full.find("CREATE TABLE employees").unwrap();
    let orders_pos = full.find("CREATE TABLE orders").unwrap();
    assert!(employees_pos < orders_pos);
}

#[tokio::test]
async fn test_query_returns_the_most_relevant_tables_first() {
    setup_tracing();
    let db = seeded_sqlite().await;
    let index = SchemaIndex::build(&db, Arc::new(KeywordEmbedder::for_company()))
        .await
        .unwrap();

    let salary = index
        .query("What is the average salary per department?", 1)
        .await
        .unwrap();
    assert_eq!(salary.len(), 1);
    assert_eq!(salary[0].table_name, "employees");

    let orders = index.query("What is the total order amount?", 1).await.unwrap();
    assert_eq!(orders[0].table_name, "orders");

    // Asking for more than exists returns everything.
    let all = index.query("salary", 10).await.unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].table_name, "employees");
}

#[tokio::test]
async fn test_relevant_schema_joins_the_retrieved_descriptions() {
    setup_tracing();
    let db = seeded_sqlite().await;
    let index = SchemaIndex::build(&db, Arc::new(KeywordEmbedder::for_company()))
        .await
        .unwrap();

    let context = index
        .relevant_schema("Which employee has the highest salary?", 1)
        .await
        .unwrap();

    assert!(context.contains("CREATE TABLE employees"));
    assert!(!context.contains("CREATE TABLE orders"));
}

#[tokio::test]
async fn test_unreachable_database_yields_an_empty_index() {
    setup_tracing();

    // 1. Arrange: listing tables fails.
    let storage = MockStorage::unreachable();
    let embedder = KeywordEmbedder::for_company();

    // 2. Act
    let index = SchemaIndex::build(&storage, Arc::new(embedder.clone()))
        .await
        .expect("introspection failures must not abort startup");

    // 3. Assert: nothing was embedded and retrieval comes back empty.
    assert!(index.is_empty());
    assert_eq!(embedder.call_count(), 0);
    assert_eq!(index.relevant_schema("how many employees?", 3).await.unwrap(), "");
    assert_eq!(index.full_schema(), "");
    assert_eq!(embedder.call_count(), 0);
}

#[tokio::test]
async fn test_embedding_failures_are_returned() {
    setup_tracing();
    let db = seeded_sqlite().await;

    let result = SchemaIndex::build(&db, Arc::new(KeywordEmbedder::failing())).await;

    assert!(matches!(result, Err(PromptError::AiApi(_))));
}

#[tokio::test]
async fn test_zero_k_skips_the_embedding_call() {
    setup_tracing();
    let db = seeded_sqlite().await;
    let embedder = KeywordEmbedder::for_company();
    let index = SchemaIndex::build(&db, Arc::new(embedder.clone()))
        .await
        .unwrap();
    let calls_after_build = embedder.call_count();

    let docs = index.query("salary", 0).await.unwrap();

    assert!(docs.is_empty());
    assert_eq!(embedder.call_count(), calls_after_build);
}
