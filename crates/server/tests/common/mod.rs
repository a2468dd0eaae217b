//! # Common Test Utilities
//!
//! This module centralizes the test harness used across the `askdb-server`
//! integration tests.
//!
//! - `TestApp`: spawns the real router on a random port, backed by a temporary
//!   SQLite file with `employees` and `orders` tables, and an `httpmock::MockServer`
//!   standing in for both the chat-completions and the embeddings APIs.
//! - Helpers for scripting chat replies by matching on request body content.

// Allow unused code because this is a test utility module, and not all
// functions might be used by every test file that includes it.
#![allow(unused)]

use anyhow::Result;
use askdb::providers::db::sqlite::SqliteProvider;
use askdb_server::{
    config, router,
    state::{build_app_state, AppState},
};
use axum::serve;
use httpmock::{Method, Mock, MockServer};
use reqwest::Client;
use serde_json::json;
use std::{fs::File, io::Write, net::SocketAddr, path::PathBuf};
use tempfile::{tempdir, TempDir};
use tokio::{net::TcpListener, task::JoinHandle};

pub const SEED_SQL: &str = "
    CREATE TABLE employees (id INTEGER PRIMARY KEY, name TEXT NOT NULL, department TEXT, salary REAL);
    INSERT INTO employees (id, name, department, salary) VALUES (1, 'Alice', 'Engineering', 120000.0);
    INSERT INTO employees (id, name, department, salary) VALUES (2, 'Bob', 'Sales', 80000.0);
    INSERT INTO employees (id, name, department, salary) VALUES (3, 'Carol', 'Engineering', 110000.0);
    INSERT INTO employees (id, name, department, salary) VALUES (4, 'Dan', 'Support', 60000.0);
    CREATE TABLE orders (id INTEGER PRIMARY KEY, employee_id INTEGER, amount REAL, placed_at TEXT);
    INSERT INTO orders (id, employee_id, amount, placed_at) VALUES (1, 2, 250.0, '2024-01-03');
";

/// Body fragments that identify each role's request.
pub const ROUTER_MARKER: &str = "You are an intelligent router";
pub const AGENT_MARKER: &str = "You are an expert and secure SQL assistant";
pub const SCHEMA_MARKER: &str = "You are a database schema expert";
pub const CHAT_MARKER: &str = "friendly assistant for AskDB";
pub const FIRST_TURN_MARKER: &str = "(no actions yet)";
pub const LATER_TURN_MARKER: &str = "Observation:";

/// A harness for end-to-end testing of the Axum server.
pub struct TestApp {
    pub address: String,
    pub client: Client,
    pub mock_server: MockServer,
    pub db_path: PathBuf,
    pub app_state: AppState,
    _dir: TempDir,
    _server_handle: JoinHandle<()>,
    shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl TestApp {
    /// Spawns the server with the default test configuration.
    pub async fn spawn() -> Result<Self> {
        Self::spawn_with_extra_config("").await
    }

    /// Spawns the server, appending `extra_yaml` to the generated `config.yml`.
    pub async fn spawn_with_extra_config(extra_yaml: &str) -> Result<Self> {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .compact()
            .try_init();

        let mock_server = MockServer::start_async().await;
        // Every schema document and question embeds to the same vector.
        mock_server.mock(|when, then| {
            when.method(Method::POST).path("/v1/embeddings");
            then.status(200)
                .json_body(json!({"data": [{"embedding": [0.5, 0.5, 0.5]}]}));
        });

        // --- Seed the database, then release it before the server opens it. ---
        let dir = tempdir()?;
        let db_path = dir.path().join("company.db");
        {
            let seed = SqliteProvider::new(path_str(&db_path)?).await?;
            seed.initialize_with_data(SEED_SQL).await?;
        }

        let config_path = dir.path().join("config.yml");
        let config_content = format!(
            r#"
port: 0
db_url: "{}"
request_timeout_secs: 30
embedding:
  api_url: "{}"
  model_name: "mock-embedding-model"
providers:
  gemini_default:
    provider: "local"
    api_url: "{}"
    api_key: null
    model_name: "mock-chat-model"
{extra_yaml}
"#,
            path_str(&db_path)?,
            mock_server.url("/v1/embeddings"),
            mock_server.url("/v1/chat/completions")
        );
        let mut file = File::create(&config_path)?;
        file.write_all(config_content.as_bytes())?;

        let config = config::get_config(Some(path_str(&config_path)?))?;
        let app_state = build_app_state(config).await?;

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr: SocketAddr = listener.local_addr()?;
        let address = format!("http://{addr}");

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();
        let app = router::create_router(app_state.clone());
        let server_handle = tokio::spawn(async move {
            let server = serve(listener, app).with_graceful_shutdown(async {
                shutdown_rx.await.ok();
            });
            if let Err(e) = server.await {
                tracing::error!("[TestApp] Server error: {}", e);
            }
        });

        tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;

        Ok(Self {
            address,
            client: Client::new(),
            mock_server,
            db_path,
            app_state,
            _dir: dir,
            _server_handle: server_handle,
            shutdown_tx: Some(shutdown_tx),
        })
    }

    /// Scripts one chat-completions reply for requests whose body contains
    /// every one of `needles`.
    pub fn mock_chat(&self, needles: &[&str], reply: &str) -> Mock<'_> {
        let needles: Vec<String> = needles.iter().map(|n| n.to_string()).collect();
        let body = json!({
            "choices": [{"message": {"role": "assistant", "content": reply}}]
        });
        self.mock_server.mock(move |when, then| {
            let mut when = when.method(Method::POST).path("/v1/chat/completions");
            for needle in needles {
                when = when.body_contains(needle);
            }
            then.status(200).json_body(body);
        })
    }

    /// Posts a question to `/ask`.
    pub async fn ask(&self, question: &str) -> Result<reqwest::Response> {
        Ok(self
            .client
            .post(format!("{}/ask", self.address))
            .json(&json!({ "question": question }))
            .send()
            .await?)
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

fn path_str(path: &std::path::Path) -> Result<&str> {
    path.to_str()
        .ok_or_else(|| anyhow::anyhow!("temporary path is not valid UTF-8: {path:?}"))
}
