use futures::stream::{FuturesUnordered, StreamExt};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info};

use crate::config::ChunkingConfig;
use crate::document::chunker::{Chunk, SentenceChunker};
use crate::models::prompt::PromptSpec;
use crate::services::completion::{format_prompt, CompletionProvider, CompletionRequest};
use crate::ui::presenter::Presenter;
use crate::ui::theme::SpinnerKind;
use crate::utils::error::AppError;
use crate::utils::token_estimator::estimate_tokens;

/// Separator between chunk answers in the combination prompt
pub const CHUNK_DELIMITER: &str = "\n----\n";

/// Completion text for one chunk, tagged with the chunk's position
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkResult {
    pub index: usize,
    pub text: String,
}

/// Chunks that will be sent, and how many were cut by the cap
#[derive(Debug, Clone)]
pub struct ChunkPlan {
    pub chunks: Vec<Chunk>,
    pub dropped: usize,
}

/// Runs a prompt over content too large for one completion.
///
/// Content is split into sentence-aligned chunks, every chunk is completed
/// concurrently, and when there is more than one chunk the ordered answers
/// are merged by a final combination completion.
pub struct ChunkPipeline {
    provider: Arc<dyn CompletionProvider>,
    presenter: Arc<dyn Presenter>,
    chunker: SentenceChunker,
    max_chunks: usize,
    model: Option<String>,
}

impl ChunkPipeline {
    pub fn new(
        provider: Arc<dyn CompletionProvider>,
        presenter: Arc<dyn Presenter>,
        chunking: &ChunkingConfig,
    ) -> Self {
        Self {
            provider,
            presenter,
            chunker: SentenceChunker::new(chunking.max_chunk_chars()),
            max_chunks: chunking.max_chunks,
            model: None,
        }
    }

    /// Override the provider's default model for every request of this pipeline
    pub fn with_model(mut self, model: Option<String>) -> Self {
        self.model = model;
        self
    }

    /// Chunk the content and apply the chunk cap.
    ///
    /// Chunks past the cap are dropped on purpose to bound API usage.
    pub fn plan(&self, content: &str) -> ChunkPlan {
        let mut chunks = self.chunker.chunk(content);
        let dropped = chunks.len().saturating_sub(self.max_chunks);
        chunks.truncate(self.max_chunks);

        ChunkPlan { chunks, dropped }
    }

    pub async fn run(&self, content: &str, spec: &PromptSpec) -> Result<String, AppError> {
        let ChunkPlan { chunks, dropped } = self.plan(content);
        let total = chunks.len();

        if dropped > 0 {
            info!(
                "Content produced {} chunks, only the first {} are sent",
                total + dropped,
                total
            );
        }

        // Validate up front so no request is wasted on an unmergeable run
        let combination_prompt = if total > 1 {
            Some(
                spec.combination()
                    .ok_or(AppError::MissingCombinationPrompt { chunks: total })?
                    .to_string(),
            )
        } else {
            None
        };

        let start = Instant::now();
        self.presenter
            .begin_stage("Generating response...", SpinnerKind::Earth, total);
        let completed = self.complete_chunks(&spec.prompt, chunks).await;
        self.presenter.finish_stage();
        let responses = completed?;

        info!(
            "Completed {} chunk(s) in {}ms",
            total,
            start.elapsed().as_millis()
        );

        let Some(combination_prompt) = combination_prompt else {
            return responses
                .into_iter()
                .next()
                .map(|r| r.text)
                .ok_or_else(|| AppError::Internal("no chunk completion produced".to_string()));
        };

        let combined = join_responses(&responses);

        self.presenter.info("Responses for all chunks ⤵️ ");
        self.presenter.log(&combined);
        self.presenter.warn(&format!(
            "Since the page's content was so long, the prompt had to be run against chunks of the content. \
             The following response is formed by running a combination prompt against all {} of the chunks' responses above.",
            total
        ));

        let request = CompletionRequest::new(format_prompt(&combination_prompt, &combined))
            .with_model(self.model.clone());

        self.presenter
            .begin_stage("Combining responses...", SpinnerKind::Moon, 0);
        let merged = self.provider.complete(request).await;
        self.presenter.finish_stage();

        merged
    }

    /// Fan out one task per chunk and wait for every one of them.
    ///
    /// Results come back in arrival order and are sorted by chunk index. When
    /// any chunk fails the lowest failing index is reported.
    async fn complete_chunks(
        &self,
        prompt: &str,
        chunks: Vec<Chunk>,
    ) -> Result<Vec<ChunkResult>, AppError> {
        let total = chunks.len();

        let mut in_flight: FuturesUnordered<_> = chunks
            .into_iter()
            .map(|chunk| {
                let provider = Arc::clone(&self.provider);
                let index = chunk.index;
                let request = CompletionRequest::new(format_prompt(prompt, &chunk.content))
                    .with_model(self.model.clone());

                debug!(
                    "Dispatching chunk {} (~{} tokens)",
                    index,
                    estimate_tokens(&request.prompt)
                );

                let handle = tokio::spawn(async move { provider.complete(request).await });
                async move { (index, handle.await) }
            })
            .collect();

        let mut results = Vec::with_capacity(total);
        let mut failures: Vec<(usize, AppError)> = Vec::new();

        while let Some((index, joined)) = in_flight.next().await {
            let outcome = joined.unwrap_or_else(|e| {
                Err(AppError::Internal(format!("chunk task aborted: {}", e)))
            });

            match outcome {
                Ok(text) => {
                    debug!("Chunk {} completed", index);
                    results.push(ChunkResult { index, text });
                    self.presenter.advance_stage();
                }
                Err(e) => {
                    error!("Chunk {} failed: {}", index, e);
                    failures.push((index, e));
                }
            }
        }

        if let Some((index, source)) = failures.into_iter().min_by_key(|(index, _)| *index) {
            return Err(AppError::ChunkCompletionFailed {
                index,
                source: Box::new(source),
            });
        }

        // Arrival order is arbitrary, restore document order
        results.sort_by_key(|r| r.index);

        Ok(results)
    }
}

/// Join chunk answers in order with [`CHUNK_DELIMITER`]
pub fn join_responses(responses: &[ChunkResult]) -> String {
    responses
        .iter()
        .map(|r| r.text.as_str())
        .collect::<Vec<_>>()
        .join(CHUNK_DELIMITER)
}
