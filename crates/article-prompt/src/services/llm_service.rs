use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use crate::config::CompletionConfig;
use crate::services::completion::{CompletionProvider, CompletionRequest};
use crate::utils::error::AppError;

#[derive(Debug, Serialize)]
struct CompletionApiRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct CompletionApiResponse {
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    text: String,
}

/// Client for an OpenAI-compatible `/v1/completions` endpoint
#[derive(Clone)]
pub struct LlmService {
    client: Client,
    config: CompletionConfig,
    api_key: String,
}

impl LlmService {
    /// Fails with `ServiceMisconfigured` before any request when the key is missing.
    pub fn new(config: CompletionConfig) -> Result<Self, AppError> {
        let api_key = config
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or_else(|| {
                AppError::ServiceMisconfigured(
                    "no API key configured (set OPENAI_KEY or APP_COMPLETION__API_KEY)".to_string(),
                )
            })?
            .to_string();

        if config.base_url.trim().is_empty() {
            return Err(AppError::ServiceMisconfigured(
                "completion.base_url is empty".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| {
                AppError::ServiceMisconfigured(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self {
            client,
            config,
            api_key,
        })
    }

    pub fn default_model(&self) -> &str {
        &self.config.model
    }

    fn endpoint(&self) -> String {
        format!("{}/v1/completions", self.config.base_url.trim_end_matches('/'))
    }

    /// Generate completion without streaming (wait for full response)
    pub async fn generate(&self, prompt: &str, model: &str) -> Result<String, AppError> {
        let request = CompletionApiRequest {
            model,
            prompt,
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        };

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::upstream(
                Some(status.as_u16()),
                format!("LLM API error: {} - {}", status, body.trim()),
            ));
        }

        let completion: CompletionApiResponse = response.json().await?;

        completion
            .choices
            .into_iter()
            .next()
            .map(|c| c.text)
            .ok_or_else(|| AppError::upstream(None, "No choices returned from LLM"))
    }
}

#[async_trait]
impl CompletionProvider for LlmService {
    async fn complete(&self, request: CompletionRequest) -> Result<String, AppError> {
        let model = request.model.as_deref().unwrap_or(&self.config.model);
        let start = Instant::now();

        debug!(
            "Requesting completion: model={}, prompt_chars={}",
            model,
            request.prompt.chars().count()
        );

        match self.generate(&request.prompt, model).await {
            Ok(text) => {
                debug!(
                    "Completion finished in {}ms ({} chars)",
                    start.elapsed().as_millis(),
                    text.len()
                );
                Ok(text)
            }
            Err(e) => {
                warn!("Completion failed after {}ms: {}", start.elapsed().as_millis(), e);
                Err(e)
            }
        }
    }
}
