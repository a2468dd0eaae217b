pub mod embedding;
pub mod gemini;
pub mod local;

use crate::errors::PromptError;
use async_trait::async_trait;
use dyn_clone::DynClone;
pub use embedding::{ApiEmbeddingProvider, EmbeddingProvider};
use std::fmt::Debug;

/// A trait for interacting with an AI provider.
///
/// Every role in the pipeline (classification, schema answers, the SQL agent,
/// chat) is a stateless, single-turn call through this interface.
#[async_trait]
pub trait AiProvider: Send + Sync + Debug + DynClone {
    /// Generates a response from a given system and user prompt.
    ///
    /// The result should be a string containing the AI's response.
    async fn generate(&self, system_prompt: &str, user_prompt: &str)
        -> Result<String, PromptError>;
}

dyn_clone::clone_trait_object!(AiProvider);
