//! # SQLite Specific SQL Queries
//!
//! This module centralizes SQL query strings for the SQLite provider.
//! This makes the core logic cleaner and isolates database-specific syntax.

/// Lists user tables, skipping SQLite's internal bookkeeping tables.
pub const LIST_TABLES_SQL: &str =
    "SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%' ORDER BY name;";

/// Fetches the `CREATE TABLE` statement for the table bound to `?1`.
pub const TABLE_DDL_SQL: &str = "SELECT sql FROM sqlite_master WHERE type='table' AND name = ?1;";

/// Quotes an identifier so table names with spaces or keywords stay valid.
pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Returns the query used to sample the first rows of a table.
pub fn sample_rows(table_name: &str, limit: usize) -> String {
    format!(
        "SELECT * FROM {} LIMIT {limit};",
        quote_identifier(table_name)
    )
}
