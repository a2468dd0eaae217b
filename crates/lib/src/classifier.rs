//! # Intent Classifier
//!
//! Maps a free-text question onto a [`ClassificationLabel`] with one model call.

use crate::{
    errors::PromptError, prompts::render, providers::ai::AiProvider, types::ClassificationLabel,
    types::ResolvedTask,
};
use tracing::{debug, info, warn};

#[derive(Debug, Clone)]
pub struct IntentClassifier {
    ai_provider: Box<dyn AiProvider>,
    system_prompt: String,
    user_prompt: String,
}

impl IntentClassifier {
    pub fn new(ai_provider: Box<dyn AiProvider>, task: &ResolvedTask) -> Self {
        Self {
            ai_provider,
            system_prompt: task.system_prompt.clone(),
            user_prompt: task.user_prompt.clone(),
        }
    }

    /// Classifies a question. The raw model output is trimmed and lower-cased and
    /// must then be exactly one of the three labels.
    pub async fn classify(&self, question: &str) -> Result<ClassificationLabel, PromptError> {
        let user_prompt = render(&self.user_prompt, &[("prompt", question)]);
        let raw = self
            .ai_provider
            .generate(&self.system_prompt, &user_prompt)
            .await?;
        debug!("<-- Classification from AI: {raw:?}");

        let normalized = raw.trim().to_lowercase();
        match normalized.parse::<ClassificationLabel>() {
            Ok(label) => {
                info!(%label, "Question classified.");
                Ok(label)
            }
            Err(e) => {
                warn!("Classifier returned an unrecognized label: {normalized:?}");
                Err(e)
            }
        }
    }
}
