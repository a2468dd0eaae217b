use thiserror::Error;

/// Custom error types for the application.
#[derive(Error, Debug)]
pub enum PromptError {
    #[error("Failed to build Reqwest client: {0}")]
    ReqwestClientBuild(reqwest::Error),
    #[error("Failed to send request to AI provider: {0}")]
    AiRequest(reqwest::Error),
    #[error("Failed to deserialize AI provider response: {0}")]
    AiDeserialization(reqwest::Error),
    #[error("AI provider returned an error: {0}")]
    AiApi(String),
    #[error("AI provider is missing: {0}")]
    MissingAiProvider(String),
    #[error("Configuration for task '{0}' not found.")]
    MissingTask(String),
    #[error("Storage provider connection error: {0}")]
    StorageConnection(String),
    #[error("Storage operation failed: {0}")]
    StorageOperationFailed(String),
    #[error("Failed to serialize result: {0}")]
    JsonSerialization(#[from] serde_json::Error),
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),
    #[error("Unrecognized classification label: '{0}'")]
    UnrecognizedLabel(String),
    #[error("Could not parse agent output: {0}")]
    AgentOutputParsing(String),
    #[error("Statement rejected by read-only policy: {0}")]
    ForbiddenStatement(String),
    #[error("Request exceeded the deadline of {0} seconds")]
    Timeout(u64),
}
