//! # The Core Executor
//!
//! This module defines the `AskdbExecutor`, the single entry point for answering a
//! question. It classifies the question and dispatches it to exactly one of the
//! three answer paths, each of which yields a [`QueryOutcome`].
//!
//! The executor holds every dependency up front, so consumers (like the `server`
//! crate) only build it once at startup and share it behind an `Arc`.

use crate::{
    agent::{
        policy::StatementPolicy,
        tools::{QueryChecker, SqlToolkit},
        AgentSettings, SqlAgent,
    },
    chat::ChatResponder,
    classifier::IntentClassifier,
    constants::{
        DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_SCHEMA_RETRIEVER_K, TASK_GENERAL_CHAT,
        TASK_INTENT_CLASSIFICATION, TASK_SCHEMA_ANSWER, TASK_SQL_AGENT, TASK_SQL_QUERY_CHECKER,
    },
    extract::extract,
    providers::{ai::AiProvider, db::storage::Storage},
    schema_index::SchemaIndex,
    schema_qa::SchemaResponder,
    types::{ClassificationLabel, QueryOutcome, ResolvedTask},
    PromptError,
};
use std::{collections::HashMap, sync::Arc, time::Duration};
use tracing::{info, warn};

/// Tunables for one executor instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutorSettings {
    /// Number of schema documents retrieved for the SQL agent.
    pub retriever_k: usize,
    /// Deadline for a whole `route` call.
    pub request_timeout: Duration,
    pub agent: AgentSettings,
}

impl Default for ExecutorSettings {
    fn default() -> Self {
        Self {
            retriever_k: DEFAULT_SCHEMA_RETRIEVER_K,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            agent: AgentSettings::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AskdbExecutor {
    classifier: IntentClassifier,
    schema_responder: SchemaResponder,
    sql_agent: SqlAgent,
    chat_responder: ChatResponder,
    schema_index: Arc<SchemaIndex>,
    settings: ExecutorSettings,
}

impl AskdbExecutor {
    pub fn new(
        classifier: IntentClassifier,
        schema_responder: SchemaResponder,
        sql_agent: SqlAgent,
        chat_responder: ChatResponder,
        schema_index: Arc<SchemaIndex>,
        settings: ExecutorSettings,
    ) -> Self {
        Self {
            classifier,
            schema_responder,
            sql_agent,
            chat_responder,
            schema_index,
            settings,
        }
    }

    /// Wires every pipeline role from the configured tasks and providers.
    ///
    /// Fails when a task is missing or names a provider that was not built.
    pub fn from_tasks(
        ai_providers: &HashMap<String, Box<dyn AiProvider>>,
        tasks: &HashMap<String, ResolvedTask>,
        storage: Arc<dyn Storage>,
        schema_index: Arc<SchemaIndex>,
        settings: ExecutorSettings,
    ) -> Result<Self, PromptError> {
        let (provider, task) = resolve_task(ai_providers, tasks, TASK_INTENT_CLASSIFICATION)?;
        let classifier = IntentClassifier::new(provider, task);

        let (provider, task) = resolve_task(ai_providers, tasks, TASK_SCHEMA_ANSWER)?;
        let schema_responder = SchemaResponder::new(provider, task);

        let (provider, task) = resolve_task(ai_providers, tasks, TASK_SQL_QUERY_CHECKER)?;
        let checker = QueryChecker::new(provider, task);
        let toolkit = SqlToolkit::new(storage, checker, settings.agent.policy);
        let (provider, task) = resolve_task(ai_providers, tasks, TASK_SQL_AGENT)?;
        let sql_agent = SqlAgent::new(provider, task, toolkit, settings.agent);

        let (provider, task) = resolve_task(ai_providers, tasks, TASK_GENERAL_CHAT)?;
        let chat_responder = ChatResponder::new(provider, task);

        if settings.agent.policy == StatementPolicy::PromptOnly {
            info!("Read-only behaviour is enforced by the agent prompt only.");
        }

        Ok(Self::new(
            classifier,
            schema_responder,
            sql_agent,
            chat_responder,
            schema_index,
            settings,
        ))
    }

    pub fn schema_index(&self) -> &SchemaIndex {
        &self.schema_index
    }

    /// Answers a question within the configured deadline.
    ///
    /// Exactly one answer path runs per call. Any stage failure is returned
    /// as-is; there is no fallback to another path.
    pub async fn route(&self, question: &str) -> Result<QueryOutcome, PromptError> {
        info!("Executor received question: '{question}'");
        let timeout = self.settings.request_timeout;
        match tokio::time::timeout(timeout, self.dispatch(question)).await {
            Ok(result) => result,
            Err(_) => {
                warn!("Question exceeded the {}s deadline.", timeout.as_secs());
                Err(PromptError::Timeout(timeout.as_secs()))
            }
        }
    }

    async fn dispatch(&self, question: &str) -> Result<QueryOutcome, PromptError> {
        let label = self.classifier.classify(question).await?;
        match label {
            ClassificationLabel::DataQuery => {
                let table_info = self
                    .schema_index
                    .relevant_schema(question, self.settings.retriever_k)
                    .await?;
                let run = self.sql_agent.run(question, &table_info).await?;
                Ok(extract(&run.trace, run.output))
            }
            ClassificationLabel::SchemaQuery => {
                let response = self
                    .schema_responder
                    .answer(question, &self.schema_index.full_schema())
                    .await?;
                Ok(QueryOutcome {
                    response,
                    sql_query: None,
                })
            }
            ClassificationLabel::GeneralChat => {
                let response = self.chat_responder.respond(question).await?;
                Ok(QueryOutcome {
                    response,
                    sql_query: None,
                })
            }
        }
    }
}

fn resolve_task<'a>(
    ai_providers: &HashMap<String, Box<dyn AiProvider>>,
    tasks: &'a HashMap<String, ResolvedTask>,
    task_name: &str,
) -> Result<(Box<dyn AiProvider>, &'a ResolvedTask), PromptError> {
    let task = tasks
        .get(task_name)
        .ok_or_else(|| PromptError::MissingTask(task_name.to_string()))?;
    let provider = ai_providers.get(&task.provider).ok_or_else(|| {
        PromptError::MissingAiProvider(format!(
            "Provider '{}' for task '{task_name}' not found in providers map.",
            task.provider
        ))
    })?;
    Ok((provider.clone(), task))
}
