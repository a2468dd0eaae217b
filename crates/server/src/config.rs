//! # Application Configuration
//!
//! This module defines the configuration structure for the `askdb-server` and
//! provides the logic for loading it from a `config.yml` file and environment
//! variables. Sources are layered, later ones overriding earlier ones:
//!
//! 1. the built-in task prompts from the `askdb` library,
//! 2. `config.yml` (or `config.{AI_PROVIDER}.yml`), with `${VAR}` substitution,
//! 3. an optional `prompt.yml` with prompt overrides,
//! 4. plain environment variables for top-level keys (`PORT`, `DB_URL`),
//! 5. `ASKDB_`-prefixed variables for nested keys (`ASKDB_AGENT__TOP_K`).

use askdb::{
    constants::{
        DEFAULT_MAX_AGENT_ITERATIONS, DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_SCHEMA_RETRIEVER_K,
        DEFAULT_TOP_K_RESULTS,
    },
    prompts::tasks::default_tasks,
    types::ProviderConfig,
};
use config::{
    Config as ConfigBuilder, Environment, File, FileFormat, Value as ConfigValue,
    ValueKind as ConfigValueKind,
};
use regex::Regex;
use serde::Deserialize;
use std::{collections::HashMap, env, fs};
use tracing::info;

/// The provider every built-in task points at until configured otherwise.
pub const DEFAULT_TASK_PROVIDER: &str = "gemini_default";

/// A custom error type for configuration issues.
#[derive(Debug)]
pub enum ConfigError {
    /// Indicates an error from the underlying `config` crate.
    General(String),
    /// Indicates a required configuration file was not found.
    NotFound(String),
    /// A required value is missing or empty after all layers were applied.
    Missing(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::General(msg) => write!(f, "Configuration error: {msg}"),
            ConfigError::NotFound(msg) => write!(f, "{msg}"),
            ConfigError::Missing(key) => write!(f, "Missing required configuration: {key}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::General(err.to_string())
    }
}

/// The root configuration structure, mapping directly to `config.yml`.
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    /// The port for the server to listen on. Loaded from `PORT` env var.
    #[serde(default = "default_port")]
    pub port: u16,
    /// The database to answer questions about. Loaded from `DB_URL` (or
    /// `DATABASE_URL`). Accepts a path or a `sqlite:///path` URL.
    #[serde(default)]
    pub db_url: String,
    /// Deadline for answering one question.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    #[serde(default)]
    pub agent: AgentConfig,

    /// Configuration for the text embedding model.
    pub embedding: EmbeddingConfig,
    /// A map of named, reusable AI provider configurations.
    pub providers: HashMap<String, ProviderConfig>,
    /// A map of tasks, each specifying a provider and prompts.
    pub tasks: HashMap<String, TaskConfig>,
}

fn default_port() -> u16 {
    8000
}

fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

/// How much schema context the SQL agent receives.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Number of table descriptions retrieved per data question.
    pub k: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            k: DEFAULT_SCHEMA_RETRIEVER_K,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct AgentConfig {
    /// Row cap communicated to the agent.
    pub top_k: usize,
    pub max_iterations: usize,
    /// Rejects anything but a single `SELECT` before it reaches the database.
    pub enforce_read_only: bool,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            top_k: DEFAULT_TOP_K_RESULTS,
            max_iterations: DEFAULT_MAX_AGENT_ITERATIONS,
            enforce_read_only: false,
        }
    }
}

/// Configuration for the embedding model provider.
#[derive(Debug, Deserialize, Clone)]
pub struct EmbeddingConfig {
    pub api_url: String,
    pub model_name: String,
    #[serde(default)]
    pub api_key: Option<String>,
}

/// Defines the prompts and provider for a specific application task.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct TaskConfig {
    /// The key of the provider to use from the `providers` map.
    #[serde(default)]
    pub provider: Option<String>,
    #[serde(default)]
    pub system_prompt: Option<String>,
    #[serde(default)]
    pub user_prompt: Option<String>,
}

/// Constructs a `config::Value` map of the default, hardcoded tasks from the library.
/// This serves as the base layer of configuration.
fn build_default_tasks() -> HashMap<String, ConfigValue> {
    default_tasks(DEFAULT_TASK_PROVIDER)
        .into_iter()
        .map(|(name, task)| {
            let mut table = HashMap::new();
            table.insert("provider".to_string(), ConfigValue::from(task.provider));
            table.insert(
                "system_prompt".to_string(),
                ConfigValue::from(task.system_prompt),
            );
            table.insert("user_prompt".to_string(), ConfigValue::from(task.user_prompt));
            (name, ConfigValue::new(None, ConfigValueKind::Table(table)))
        })
        .collect()
}

// Helper to read a file, substitute env vars, and return its content.
// Returns Ok(None) if the file does not exist, or an error if it fails to read.
fn read_and_substitute(path: &str) -> Result<Option<String>, ConfigError> {
    if !std::path::Path::new(path).exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(path)
        .map_err(|e| ConfigError::General(format!("Failed to read config file '{path}': {e}")))?;

    let re = Regex::new(r"\$\{(?P<var>[A-Z0-9_]+)\}")
        .map_err(|e| ConfigError::General(e.to_string()))?;
    let expanded_content = re.replace_all(&content, |caps: &regex::Captures| {
        let var_name = &caps["var"];
        env::var(var_name).unwrap_or_default()
    });

    Ok(Some(expanded_content.to_string()))
}

/// Loads the application configuration from a file and environment variables.
///
/// - Top-level keys like `port` and `db_url` are overridden by `PORT` and `DB_URL`.
/// - Nested keys are overridden by `ASKDB_...` variables (e.g., `ASKDB_RETRIEVAL__K`).
///
/// A missing or empty `db_url` is an error; the server cannot start without a database.
pub fn get_config(config_path_override: Option<&str>) -> Result<AppConfig, ConfigError> {
    let base_path = env!("CARGO_MANIFEST_DIR");
    let mut builder = ConfigBuilder::builder()
        // Layer 1: Programmatic defaults from the library.
        .set_default("tasks", build_default_tasks())?;

    // Layer 2: Main Config (with Fallback)
    let main_config_path = if let Some(override_path) = config_path_override {
        override_path.to_string()
    } else {
        let user_config_path = format!("{base_path}/config.yml");
        if std::path::Path::new(&user_config_path).exists() {
            info!("Loading user-defined configuration from '{user_config_path}'.");
            user_config_path
        } else {
            let provider = env::var("AI_PROVIDER").unwrap_or_else(|_| "gemini".to_string());
            let fallback_path = format!("{base_path}/config.{provider}.yml");
            info!("'{user_config_path}' not found. Falling back to '{fallback_path}' based on AI_PROVIDER='{provider}'.");
            fallback_path
        }
    };

    let main_content = read_and_substitute(&main_config_path)?
        .ok_or_else(|| ConfigError::NotFound(format!("Main config file not found at '{main_config_path}'. Please ensure 'config.yml' exists or your AI_PROVIDER is set to load a valid template ('local' or 'gemini').")))?;
    builder = builder.add_source(File::from_str(&main_content, FileFormat::Yaml));

    // Layer 3: User Prompt Overrides (Optional)
    let user_prompt_path = format!("{base_path}/prompt.yml");
    if let Some(user_prompts_content) = read_and_substitute(&user_prompt_path)? {
        info!("Loading user prompt overrides from '{user_prompt_path}'.");
        builder = builder.add_source(File::from_str(&user_prompts_content, FileFormat::Yaml));
    }

    let settings = builder
        // Layer 4: Load environment variables for top-level keys like PORT.
        .add_source(Environment::default())
        // Layer 5: Load prefixed environment variables for deeper overrides.
        .add_source(
            Environment::with_prefix("ASKDB")
                .prefix_separator("_")
                .try_parsing(true)
                .separator("__"),
        )
        .build()?;

    let mut config: AppConfig = settings.try_deserialize()?;

    // `DATABASE_URL` is the conventional name; accept it when `db_url` was not set.
    if config.db_url.trim().is_empty() {
        if let Ok(url) = env::var("DATABASE_URL") {
            config.db_url = url;
        }
    }
    if config.db_url.trim().is_empty() {
        return Err(ConfigError::Missing(
            "db_url (set DB_URL or DATABASE_URL)".to_string(),
        ));
    }

    Ok(config)
}
