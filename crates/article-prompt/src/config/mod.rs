pub mod settings;

pub use settings::{ChunkingConfig, CompletionConfig, FetchConfig, Settings};
