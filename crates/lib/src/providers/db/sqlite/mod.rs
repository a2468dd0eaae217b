use crate::{
    constants::SAMPLE_ROWS_IN_TABLE_INFO, errors::PromptError, providers::db::storage::Storage,
};
use async_trait::async_trait;
use serde_json::Value;
use std::{
    collections::HashMap,
    fmt::{self, Debug},
    sync::Arc,
};
use tokio::sync::RwLock;
use tracing::{debug, info};
use turso::{Database, Value as TursoValue};

mod sql;

/// A provider for interacting with a local SQLite database using Turso.
///
/// This provider holds a `Database` instance, which hands out a fresh connection
/// per operation. When cloned, it shares the same underlying database, so
/// concurrent requests each check out their own connection.
#[derive(Clone)]
pub struct SqliteProvider {
    /// The Turso database instance. It's cloneable and thread-safe.
    pub db: Database,
    table_info_cache: Arc<RwLock<HashMap<String, String>>>,
}

impl SqliteProvider {
    /// Creates a new `SqliteProvider` from a file path or in-memory.
    ///
    /// # Arguments
    ///
    /// * `db_path`: The path to the SQLite database file. Use ":memory:" for a unique,
    ///   isolated in-memory database. To share an in-memory database across multiple
    ///   `SqliteProvider` instances (e.g., in tests), create one provider and
    ///   then `.clone()` it.
    ///
    /// The file is opened as-is: no pragmas are issued, so the journal mode and
    /// other persistent settings of the database stay untouched.
    pub async fn new(db_path: &str) -> Result<Self, PromptError> {
        let db = turso::Builder::new_local(db_path)
            .build()
            .await
            .map_err(|e| PromptError::StorageConnection(e.to_string()))?;

        Ok(Self {
            db,
            table_info_cache: Arc::new(RwLock::new(HashMap::new())),
        })
    }

    /// Creates a provider from a database URL.
    ///
    /// Accepts plain paths, `:memory:`, and SQLAlchemy-style `sqlite:///path`
    /// URLs as found in `DATABASE_URL` variables.
    pub async fn from_url(database_url: &str) -> Result<Self, PromptError> {
        let path = database_path_from_url(database_url)?;
        info!(db_path = %path, "Opening SQLite database.");
        Self::new(path).await
    }

    /// A helper for tests to pre-populate data by executing multiple SQL statements.
    pub async fn initialize_with_data(&self, init_sql: &str) -> Result<(), PromptError> {
        let conn = self
            .db
            .connect()
            .map_err(|e| PromptError::StorageConnection(e.to_string()))?;

        for statement in init_sql.split(';').filter(|s| !s.trim().is_empty()) {
            conn.execute(statement, ())
                .await
                .map_err(|e| PromptError::StorageOperationFailed(e.to_string()))?;
        }
        Ok(())
    }

    async fn table_ddl(&self, table_name: &str) -> Result<String, PromptError> {
        let conn = self
            .db
            .connect()
            .map_err(|e| PromptError::StorageConnection(e.to_string()))?;
        let mut rows = conn
            .query(
                sql::TABLE_DDL_SQL,
                vec![TursoValue::Text(table_name.to_string())],
            )
            .await
            .map_err(|e| PromptError::StorageOperationFailed(e.to_string()))?;

        match rows
            .next()
            .await
            .map_err(|e| PromptError::StorageOperationFailed(e.to_string()))?
        {
            Some(row) => match row.get_value(0) {
                Ok(TursoValue::Text(ddl)) => Ok(ddl),
                _ => Err(PromptError::StorageOperationFailed(format!(
                    "Table '{table_name}' has no CREATE statement."
                ))),
            },
            None => Err(PromptError::StorageOperationFailed(format!(
                "Table '{table_name}' not found."
            ))),
        }
    }

    async fn sample_rows(
        &self,
        table_name: &str,
    ) -> Result<(Vec<String>, Vec<Vec<String>>), PromptError> {
        let conn = self
            .db
            .connect()
            .map_err(|e| PromptError::StorageConnection(e.to_string()))?;
        let mut stmt = conn
            .prepare(&sql::sample_rows(table_name, SAMPLE_ROWS_IN_TABLE_INFO))
            .await
            .map_err(|e| PromptError::StorageOperationFailed(e.to_string()))?;

        let column_names: Vec<String> = stmt
            .columns()
            .iter()
            .map(|c| c.name().to_string())
            .collect();

        let mut rows = stmt
            .query(())
            .await
            .map_err(|e| PromptError::StorageOperationFailed(e.to_string()))?;

        let mut sample = Vec::new();
        while let Some(row) = rows
            .next()
            .await
            .map_err(|e| PromptError::StorageOperationFailed(e.to_string()))?
        {
            let mut cells = Vec::with_capacity(column_names.len());
            for i in 0..column_names.len() {
                let value = row
                    .get_value(i)
                    .map_err(|e| PromptError::StorageOperationFailed(e.to_string()))?;
                cells.push(turso_value_to_cell(value));
            }
            sample.push(cells);
        }
        Ok((column_names, sample))
    }
}

impl Debug for SqliteProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqliteProvider").finish_non_exhaustive()
    }
}

/// Maps a `DATABASE_URL` to a path Turso can open.
fn database_path_from_url(database_url: &str) -> Result<&str, PromptError> {
    let trimmed = database_url.trim();
    if trimmed.is_empty() {
        return Err(PromptError::StorageConnection(
            "Database URL is empty.".to_string(),
        ));
    }
    if let Some(rest) = trimmed.strip_prefix("sqlite://") {
        // `sqlite:///relative.db` keeps one slash after the scheme; `sqlite:////abs.db` keeps two.
        let path = rest.strip_prefix('/').unwrap_or(rest);
        return if path.is_empty() {
            Ok(":memory:")
        } else {
            Ok(path)
        };
    }
    if trimmed.contains("://") {
        return Err(PromptError::StorageConnection(format!(
            "Unsupported database URL scheme in '{trimmed}'. Only SQLite databases are supported."
        )));
    }
    Ok(trimmed)
}

/// Converts a Turso value to a serde_json::Value.
fn turso_value_to_json(v: TursoValue) -> Value {
    match v {
        TursoValue::Null => Value::Null,
        TursoValue::Integer(i) => Value::Number(i.into()),
        TursoValue::Real(f) => serde_json::Number::from_f64(f)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        TursoValue::Text(s) => Value::String(s),
        TursoValue::Blob(_) => Value::String("<blob>".to_string()),
    }
}

/// Renders a Turso value for the sample-rows block of a table description.
fn turso_value_to_cell(v: TursoValue) -> String {
    match v {
        TursoValue::Null => "NULL".to_string(),
        TursoValue::Integer(i) => i.to_string(),
        TursoValue::Real(f) => f.to_string(),
        TursoValue::Text(s) => s,
        TursoValue::Blob(_) => "<blob>".to_string(),
    }
}

/// Formats a table description: DDL, then a comment block with sample rows.
fn render_table_info(
    table_name: &str,
    ddl: &str,
    columns: &[String],
    rows: &[Vec<String>],
) -> String {
    let mut info = format!(
        "{}\n\n/*\n{SAMPLE_ROWS_IN_TABLE_INFO} rows from {table_name} table:\n",
        ddl.trim()
    );
    info.push_str(&columns.join("\t"));
    for row in rows {
        info.push('\n');
        info.push_str(&row.join("\t"));
    }
    info.push_str("\n*/");
    info
}

#[async_trait]
impl Storage for SqliteProvider {
    fn dialect(&self) -> &str {
        "sqlite"
    }

    async fn list_tables(&self) -> Result<Vec<String>, PromptError> {
        info!("Listing all tables in SQLite database.");
        let conn = self
            .db
            .connect()
            .map_err(|e| PromptError::StorageConnection(e.to_string()))?;

        let mut rows = conn
            .query(sql::LIST_TABLES_SQL, ())
            .await
            .map_err(|e| PromptError::StorageOperationFailed(e.to_string()))?;

        let mut tables = Vec::new();
        while let Some(row) = rows
            .next()
            .await
            .map_err(|e| PromptError::StorageOperationFailed(e.to_string()))?
        {
            if let Ok(TursoValue::Text(name)) = row.get_value(0) {
                tables.push(name);
            }
        }
        Ok(tables)
    }

    async fn get_table_info(&self, table_name: &str) -> Result<String, PromptError> {
        if let Some(info) = self.table_info_cache.read().await.get(table_name) {
            debug!(table_name = %table_name, "Returning cached table info.");
            return Ok(info.clone());
        }
        debug!(table_name = %table_name, "Table info not in cache. Fetching from DB.");

        let ddl = self.table_ddl(table_name).await?;
        let (columns, rows) = self.sample_rows(table_name).await?;
        let info = render_table_info(table_name, &ddl, &columns, &rows);

        self.table_info_cache
            .write()
            .await
            .insert(table_name.to_string(), info.clone());

        Ok(info)
    }

    /// Executes a query on SQLite and returns the result as a JSON string.
    async fn execute_query(&self, query: &str) -> Result<String, PromptError> {
        debug!(query = %query, "--> Executing SQLite query");

        let conn = self
            .db
            .connect()
            .map_err(|e| PromptError::StorageConnection(e.to_string()))?;

        let mut stmt = conn
            .prepare(query)
            .await
            .map_err(|e| PromptError::StorageOperationFailed(e.to_string()))?;

        let column_names: Vec<String> = stmt
            .columns()
            .iter()
            .map(|c| c.name().to_string())
            .collect();

        let mut rows = stmt
            .query(())
            .await
            .map_err(|e| PromptError::StorageOperationFailed(e.to_string()))?;

        let mut json_results: Vec<Value> = Vec::new();

        while let Some(row) = rows
            .next()
            .await
            .map_err(|e| PromptError::StorageOperationFailed(e.to_string()))?
        {
            let mut row_map = serde_json::Map::new();
            for (i, name) in column_names.iter().enumerate() {
                let value = row
                    .get_value(i)
                    .map_err(|e| PromptError::StorageOperationFailed(e.to_string()))?;
                row_map.insert(name.clone(), turso_value_to_json(value));
            }
            json_results.push(Value::Object(row_map));
        }

        Ok(serde_json::to_string(&json_results)?)
    }
}
