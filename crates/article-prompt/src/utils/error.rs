use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Couldn't parse the URL: {0}")]
    ExtractionFailed(String),

    #[error("Completion service misconfigured: {0}")]
    ServiceMisconfigured(String),

    #[error("Completion request failed{}: {message}", status_suffix(.status))]
    Upstream {
        status: Option<u16>,
        message: String,
    },

    #[error("Completion for chunk {index} failed: {source}")]
    ChunkCompletionFailed {
        index: usize,
        #[source]
        source: Box<AppError>,
    },

    #[error("A combination prompt is required to merge {chunks} chunk responses")]
    MissingCombinationPrompt { chunks: usize },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Internal error: {0}")]
    Internal(String),
}

fn status_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(" ({})", s)).unwrap_or_default()
}

impl AppError {
    pub fn upstream(status: Option<u16>, message: impl Into<String>) -> Self {
        AppError::Upstream {
            status,
            message: message.into(),
        }
    }

    /// Index of the chunk whose completion failed, if this is a chunk failure.
    pub fn failed_chunk(&self) -> Option<usize> {
        match self {
            AppError::ChunkCompletionFailed { index, .. } => Some(*index),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        let status = err.status().map(|s| s.as_u16());
        let message = if err.is_timeout() {
            format!("request timed out: {}", err)
        } else if err.is_decode() {
            format!("malformed response: {}", err)
        } else {
            err.to_string()
        };
        AppError::Upstream { status, message }
    }
}
