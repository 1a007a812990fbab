//! Token estimation for chunk sizing.
//! Completion models average roughly four characters per token for English prose.

pub const CHARS_PER_TOKEN: usize = 4;

/// Estimate tokens from text using the char/4 heuristic
pub fn estimate_tokens(text: &str) -> usize {
    if text.is_empty() {
        return 0;
    }

    let chars = text.chars().count();
    chars.div_ceil(CHARS_PER_TOKEN)
}

/// Character budget that corresponds to a token budget
pub fn chars_for_tokens(tokens: usize) -> usize {
    tokens.saturating_mul(CHARS_PER_TOKEN)
}
