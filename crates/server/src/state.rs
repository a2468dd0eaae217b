//! # Application State
//!
//! This module defines the shared application state (`AppState`) and the logic
//! for building it at startup. Every dependency of the question pipeline is
//! created here once: AI providers, the database, the embedding client and the
//! schema index. Handlers only ever see the finished `AskdbExecutor`.

use crate::config::AppConfig;
use askdb::{
    providers::{
        ai::ApiEmbeddingProvider,
        db::{sqlite::SqliteProvider, storage::Storage},
        factory::create_ai_providers,
    },
    AgentSettings, AskdbExecutor, ExecutorSettings, ResolvedTask, SchemaIndex, StatementPolicy,
};
use std::{collections::HashMap, sync::Arc, time::Duration};
use tracing::info;

/// The shared application state, accessible from all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// The application's configuration, loaded from `config.yml`.
    pub config: Arc<AppConfig>,
    /// The fully wired question pipeline.
    pub executor: Arc<AskdbExecutor>,
}

/// Builds the shared application state from the configuration.
///
/// Any failure here is fatal: a provider that cannot be built, a task that
/// cannot be resolved, a database that cannot be opened or an embedding
/// service that rejects the startup batch. A database that opens but cannot
/// be introspected only leaves the schema index empty.
pub async fn build_app_state(config: AppConfig) -> anyhow::Result<AppState> {
    // Create a map of AI provider instances from the configuration.
    let ai_providers = create_ai_providers(&config.providers)?;

    // Validate and resolve all tasks from the configuration.
    let mut resolved_tasks = HashMap::new();
    for (name, task_config) in &config.tasks {
        let provider = task_config.provider.clone().ok_or_else(|| {
            anyhow::anyhow!("Resolved task '{name}' is missing required 'provider' field")
        })?;
        let system_prompt = task_config.system_prompt.clone().ok_or_else(|| {
            anyhow::anyhow!("Resolved task '{name}' is missing required 'system_prompt' field")
        })?;
        let user_prompt = task_config.user_prompt.clone().ok_or_else(|| {
            anyhow::anyhow!("Resolved task '{name}' is missing required 'user_prompt' field")
        })?;

        resolved_tasks.insert(
            name.clone(),
            ResolvedTask {
                provider,
                system_prompt,
                user_prompt,
            },
        );
    }

    let sqlite_provider = SqliteProvider::from_url(&config.db_url).await?;
    info!(db_url = %config.db_url, "Initialized storage provider (SQLite).");
    let storage: Arc<dyn Storage> = Arc::new(sqlite_provider);

    let embedder = Arc::new(ApiEmbeddingProvider::new(
        config.embedding.api_url.clone(),
        config.embedding.model_name.clone(),
        config
            .embedding
            .api_key
            .clone()
            .filter(|key| !key.trim().is_empty()),
    )?);
    let schema_index = SchemaIndex::build(storage.as_ref(), embedder).await?;

    let settings = ExecutorSettings {
        retriever_k: config.retrieval.k,
        request_timeout: Duration::from_secs(config.request_timeout_secs),
        agent: AgentSettings {
            top_k: config.agent.top_k,
            max_iterations: config.agent.max_iterations,
            policy: StatementPolicy::from_enforce_read_only(config.agent.enforce_read_only),
        },
    };
    let executor = AskdbExecutor::from_tasks(
        &ai_providers,
        &resolved_tasks,
        storage,
        Arc::new(schema_index),
        settings,
    )?;

    Ok(AppState {
        config: Arc::new(config),
        executor: Arc::new(executor),
    })
}
