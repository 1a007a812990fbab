pub mod completion;
pub mod llm_service;
pub mod pipeline;

pub use completion::{format_prompt, CompletionProvider, CompletionRequest};
pub use llm_service::LlmService;
pub use pipeline::{ChunkPipeline, ChunkPlan, ChunkResult, CHUNK_DELIMITER};
