pub mod prompt;

pub use prompt::{CannedPrompt, PromptSpec, CANNED_PROMPTS};
