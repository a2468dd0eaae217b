//! # Chat Responder
//!
//! The conversational fallback. It has no tools, no schema and no database.

use crate::{
    errors::PromptError, prompts::render, providers::ai::AiProvider, types::ResolvedTask,
};

#[derive(Debug, Clone)]
pub struct ChatResponder {
    ai_provider: Box<dyn AiProvider>,
    system_prompt: String,
    user_prompt: String,
}

impl ChatResponder {
    pub fn new(ai_provider: Box<dyn AiProvider>, task: &ResolvedTask) -> Self {
        Self {
            ai_provider,
            system_prompt: task.system_prompt.clone(),
            user_prompt: task.user_prompt.clone(),
        }
    }

    pub async fn respond(&self, question: &str) -> Result<String, PromptError> {
        let user_prompt = render(&self.user_prompt, &[("prompt", question)]);
        self.ai_provider
            .generate(&self.system_prompt, &user_prompt)
            .await
    }
}
