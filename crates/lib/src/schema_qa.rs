//! # Schema Q&A Responder
//!
//! Answers questions about the database structure with the complete schema as
//! context. Never touches the database.

use crate::{
    constants::SCHEMA_NOT_AVAILABLE_PHRASE, errors::PromptError, prompts::render,
    providers::ai::AiProvider, types::ResolvedTask,
};
use tracing::error;

#[derive(Debug, Clone)]
pub struct SchemaResponder {
    ai_provider: Box<dyn AiProvider>,
    system_prompt: String,
    user_prompt: String,
}

impl SchemaResponder {
    pub fn new(ai_provider: Box<dyn AiProvider>, task: &ResolvedTask) -> Self {
        Self {
            ai_provider,
            system_prompt: task.system_prompt.clone(),
            user_prompt: task.user_prompt.clone(),
        }
    }

    pub async fn answer(&self, question: &str, full_schema: &str) -> Result<String, PromptError> {
        let system_prompt = render(
            &self.system_prompt,
            &[
                ("not_available", SCHEMA_NOT_AVAILABLE_PHRASE),
                ("schema", full_schema),
            ],
        );
        let user_prompt = render(&self.user_prompt, &[("prompt", question)]);
        self.ai_provider
            .generate(&system_prompt, &user_prompt)
            .await
            .inspect_err(|e| error!("Error in schema query path: {e}"))
    }
}
