use async_trait::async_trait;

use crate::utils::error::AppError;

/// One prompt for the completion service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRequest {
    pub prompt: String,
    /// `None` uses the provider's configured model
    pub model: Option<String>,
}

impl CompletionRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            model: None,
        }
    }

    pub fn with_model(mut self, model: Option<String>) -> Self {
        self.model = model;
        self
    }
}

/// Text completion backend.
///
/// One call is one request: implementations do not retry.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    async fn complete(&self, request: CompletionRequest) -> Result<String, AppError>;
}

/// `"{instruction}:\n\n###{body}\n\n###"`
pub fn format_prompt(instruction: &str, body: &str) -> String {
    format!("{}:\n\n###{}\n\n###", instruction, body)
}
