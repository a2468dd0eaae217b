//! # AI Provider Factory
//!
//! Centralizes the creation of AI provider instances from the `providers` section
//! of the configuration, so every consumer builds them the same way.

use crate::{
    errors::PromptError,
    providers::ai::{gemini::GeminiProvider, local::LocalAiProvider, AiProvider},
    types::ProviderConfig,
};
use std::collections::HashMap;
use tracing::info;

/// Instantiates one provider from its configuration entry.
///
/// Gemini providers require a non-empty `api_key` and derive their URL from the
/// model name when `api_url` is unset. Local providers require `api_url`.
pub fn create_ai_provider(
    name: &str,
    config: &ProviderConfig,
) -> Result<Box<dyn AiProvider>, PromptError> {
    let provider: Box<dyn AiProvider> = match config.provider.as_str() {
        "gemini" => {
            let api_key = non_empty(config.api_key.as_deref()).ok_or_else(|| {
                PromptError::MissingAiProvider(format!(
                    "api_key is required for gemini provider '{name}'"
                ))
            })?;
            let api_url = non_empty(config.api_url.as_deref())
                .map(str::to_string)
                .unwrap_or_else(|| GeminiProvider::default_api_url(&config.model_name));
            info!(provider = %name, %api_url, "Configuring Gemini provider");
            Box::new(
                GeminiProvider::new(api_url, api_key.to_string())?
                    .with_temperature(config.temperature),
            )
        }
        "local" => {
            let api_url = non_empty(config.api_url.as_deref()).ok_or_else(|| {
                PromptError::MissingAiProvider(format!(
                    "api_url is required for local provider '{name}'. Please set LOCAL_AI_API_URL in your .env file."
                ))
            })?;
            info!(provider = %name, %api_url, "Configuring Local AI provider");
            Box::new(
                LocalAiProvider::new(
                    api_url.to_string(),
                    non_empty(config.api_key.as_deref()).map(str::to_string),
                    Some(config.model_name.clone()),
                )?
                .with_temperature(config.temperature),
            )
        }
        other => {
            return Err(PromptError::MissingAiProvider(format!(
                "Unsupported AI provider type '{other}' for provider '{name}'"
            )))
        }
    };
    Ok(provider)
}

/// Instantiates every configured provider, keyed by its config name.
pub fn create_ai_providers(
    providers_config: &HashMap<String, ProviderConfig>,
) -> Result<HashMap<String, Box<dyn AiProvider>>, PromptError> {
    providers_config
        .iter()
        .map(|(name, config)| Ok((name.clone(), create_ai_provider(name, config)?)))
        .collect()
}

// `${VAR}` substitution in config files leaves unset variables as empty strings.
fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}
