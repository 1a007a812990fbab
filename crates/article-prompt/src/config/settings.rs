use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::utils::error::AppError;
use crate::utils::token_estimator::chars_for_tokens;

/// Legacy variable holding the completion API key
pub const API_KEY_ENV: &str = "OPENAI_KEY";

const DEFAULT_CONFIG_FILE: &str = "config/settings";

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Settings {
    pub completion: CompletionConfig,
    pub chunking: ChunkingConfig,
    pub fetch: FetchConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CompletionConfig {
    pub base_url: String,
    #[serde(default)]
    pub api_key: Option<String>,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout_seconds: u64,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ChunkingConfig {
    pub max_chunk_tokens: usize, // ~1 token = 4 characters
    pub max_chunks: usize,       // hard cap on completion requests per run
}

impl ChunkingConfig {
    pub fn max_chunk_chars(&self) -> usize {
        chars_for_tokens(self.max_chunk_tokens)
    }
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            max_chunk_tokens: 3500,
            max_chunks: 40,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct FetchConfig {
    pub timeout_seconds: u64,
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: 30,
            user_agent: default_user_agent(),
        }
    }
}

fn default_user_agent() -> String {
    format!("article-prompt/{}", env!("CARGO_PKG_VERSION"))
}

impl Settings {
    /// Load settings from `.env`, the settings file and `APP_*` variables.
    ///
    /// Precedence (lowest first): built-in defaults, `config/settings.*` (or `path`),
    /// `APP_SECTION__KEY` variables. `OPENAI_KEY` only fills a missing API key.
    pub fn load(path: Option<&Path>) -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        let file = match path {
            Some(p) => File::from(p).required(true),
            None => File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };

        let config = Config::builder()
            .set_default("completion.base_url", "https://api.openai.com")?
            .set_default("completion.model", "gpt-3.5-turbo-instruct")?
            // 0.1 keeps answers straightforward and consistent between chunks
            .set_default("completion.temperature", 0.1)?
            .set_default("completion.max_tokens", 500)?
            .set_default("completion.timeout_seconds", 120)?
            .set_default("chunking.max_chunk_tokens", 3500)?
            .set_default("chunking.max_chunks", 40)?
            .set_default("fetch.timeout_seconds", 30)?
            .set_default("fetch.user_agent", default_user_agent())?
            .add_source(file)
            // Override with environment variables (prefix: APP)
            // Example: APP_COMPLETION__MODEL=gpt-3.5-turbo-instruct
            .add_source(
                Environment::with_prefix("APP")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let mut settings: Settings = config.try_deserialize()?;

        if settings.completion.api_key.is_none() {
            settings.completion.api_key = std::env::var(API_KEY_ENV).ok();
        }

        settings.validate()?;

        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if self.chunking.max_chunk_tokens == 0 {
            return Err(AppError::ServiceMisconfigured(
                "chunking.max_chunk_tokens must be greater than 0".to_string(),
            ));
        }

        if self.chunking.max_chunks == 0 {
            return Err(AppError::ServiceMisconfigured(
                "chunking.max_chunks must be greater than 0".to_string(),
            ));
        }

        if !(0.0..=2.0).contains(&self.completion.temperature) {
            return Err(AppError::ServiceMisconfigured(format!(
                "completion.temperature must be within 0..=2 (got {})",
                self.completion.temperature
            )));
        }

        Ok(())
    }
}
