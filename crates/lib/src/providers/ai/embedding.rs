//! # Embeddings Provider
//!
//! This module provides functionality for generating vector embeddings by calling
//! an external Gemini or OpenAI-compatible embeddings API.

use crate::errors::PromptError;
use async_trait::async_trait;
use reqwest::Client as ReqwestClient;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use tracing::debug;

/// A text-to-vector embedding service.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync + Debug {
    /// Embeds a single piece of text.
    async fn embed(&self, input: &str) -> Result<Vec<f32>, PromptError>;

    /// Embeds several texts, preserving input order.
    async fn embed_batch(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>, PromptError> {
        let mut vectors = Vec::with_capacity(inputs.len());
        for input in inputs {
            vectors.push(self.embed(input).await?);
        }
        Ok(vectors)
    }
}

// --- OpenAI-compatible request and response structures ---

#[derive(Serialize, Debug)]
struct OpenAIEmbeddingRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Deserialize, Debug)]
struct OpenAIEmbeddingResponse {
    data: Vec<OpenAIEmbeddingData>,
}

#[derive(Deserialize, Debug)]
struct OpenAIEmbeddingData {
    embedding: Vec<f32>,
}

// --- Gemini-specific request and response structures ---

#[derive(Serialize, Debug)]
struct GeminiEmbeddingRequest<'a> {
    model: String,
    content: GeminiEmbeddingContent<'a>,
}

#[derive(Serialize, Debug)]
struct GeminiEmbeddingContent<'a> {
    parts: Vec<GeminiEmbeddingPart<'a>>,
}

#[derive(Serialize, Debug)]
struct GeminiEmbeddingPart<'a> {
    text: &'a str,
}

#[derive(Deserialize, Debug)]
struct GeminiEmbeddingResponse {
    embedding: GeminiEmbeddingValue,
}

#[derive(Deserialize, Debug)]
struct GeminiEmbeddingValue {
    values: Vec<f32>,
}

/// Embeddings over HTTP.
///
/// The JSON payload is chosen from the `api_url`: Gemini endpoints get the
/// `embedContent` shape, everything else the OpenAI `/embeddings` shape.
#[derive(Clone, Debug)]
pub struct ApiEmbeddingProvider {
    client: ReqwestClient,
    api_url: String,
    model: String,
    api_key: Option<String>,
}

impl ApiEmbeddingProvider {
    pub fn new(
        api_url: String,
        model: String,
        api_key: Option<String>,
    ) -> Result<Self, PromptError> {
        let client = ReqwestClient::builder()
            .build()
            .map_err(PromptError::ReqwestClientBuild)?;
        Ok(Self {
            client,
            api_url,
            model,
            api_key,
        })
    }

    fn is_gemini(&self) -> bool {
        self.api_url.contains("generativelanguage.googleapis.com")
    }
}

#[async_trait]
impl EmbeddingProvider for ApiEmbeddingProvider {
    async fn embed(&self, input: &str) -> Result<Vec<f32>, PromptError> {
        let mut request_builder = self.client.post(&self.api_url);
        let is_gemini = self.is_gemini();

        // --- 1. Construct the appropriate request body and apply auth ---
        if is_gemini {
            // Gemini requires the model name to be prefixed with "models/" in the payload.
            let gemini_model_name = if self.model.starts_with("models/") {
                self.model.clone()
            } else {
                format!("models/{}", self.model)
            };

            let request_body = GeminiEmbeddingRequest {
                model: gemini_model_name,
                content: GeminiEmbeddingContent {
                    parts: vec![GeminiEmbeddingPart { text: input }],
                },
            };
            debug!(model = %request_body.model, "--> Sending request to Gemini Embeddings API");
            request_builder = request_builder.json(&request_body);
            if let Some(key) = &self.api_key {
                // Gemini uses an `x-goog-api-key` header for embeddings, not a query param.
                request_builder = request_builder.header("x-goog-api-key", key);
            }
        } else {
            let request_body = OpenAIEmbeddingRequest {
                model: &self.model,
                input,
            };
            debug!(model = %self.model, "--> Sending request to OpenAI-compatible Embeddings API");
            request_builder = request_builder.json(&request_body);
            if let Some(key) = &self.api_key {
                request_builder = request_builder.bearer_auth(key);
            }
        }

        // --- 2. Send the request and handle the response ---
        let response = request_builder
            .send()
            .await
            .map_err(PromptError::AiRequest)?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(PromptError::AiApi(error_text));
        }

        if is_gemini {
            let gemini_response: GeminiEmbeddingResponse = response
                .json()
                .await
                .map_err(PromptError::AiDeserialization)?;
            Ok(gemini_response.embedding.values)
        } else {
            let openai_response: OpenAIEmbeddingResponse = response
                .json()
                .await
                .map_err(PromptError::AiDeserialization)?;

            openai_response
                .data
                .into_iter()
                .next()
                .map(|d| d.embedding)
                .ok_or_else(|| {
                    PromptError::AiApi("OpenAI-compatible API returned no embeddings".to_string())
                })
        }
    }
}
