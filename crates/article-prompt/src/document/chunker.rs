use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

/// Sentence terminator followed by the whitespace that ends the sentence.
/// The terminator is kept with its sentence, the whitespace run is dropped.
static SENTENCE_BOUNDARY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[.?!]\s+").expect("sentence boundary pattern is valid"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    pub index: usize,
    pub content: String,
    pub char_count: usize,
}

impl Chunk {
    fn new(index: usize, content: String, char_count: usize) -> Self {
        Self {
            index,
            content,
            char_count,
        }
    }
}

/// Split text after `.`, `?` or `!` followed by whitespace.
pub fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;

    for boundary in SENTENCE_BOUNDARY.find_iter(text) {
        // terminators are single-byte ASCII
        let end = boundary.start() + 1;
        sentences.push(&text[start..end]);
        start = boundary.end();
    }
    sentences.push(&text[start..]);

    sentences.retain(|s| !s.trim().is_empty());
    sentences
}

/// Packs whole sentences into chunks of at most `max_chunk_chars` characters.
///
/// A chunk is only closed at a sentence boundary, so a single sentence longer
/// than the limit becomes an oversized chunk of its own.
#[derive(Debug, Clone)]
pub struct SentenceChunker {
    max_chunk_chars: usize,
}

impl SentenceChunker {
    pub fn new(max_chunk_chars: usize) -> Self {
        Self { max_chunk_chars }
    }

    pub fn max_chunk_chars(&self) -> usize {
        self.max_chunk_chars
    }

    pub fn chunk(&self, text: &str) -> Vec<Chunk> {
        let mut chunks = Vec::new();
        let mut current = String::new();
        let mut current_chars = 0;

        for sentence in split_sentences(text) {
            let sentence_chars = sentence.chars().count();

            if current_chars > 0 && current_chars + sentence_chars > self.max_chunk_chars {
                let content = std::mem::take(&mut current);
                chunks.push(Chunk::new(chunks.len(), content, current_chars));
                current_chars = 0;
            }

            current.push_str(sentence);
            current.push(' ');
            current_chars += sentence_chars + 1;
        }

        // Trailing partial chunk
        if current_chars > 0 {
            chunks.push(Chunk::new(chunks.len(), current, current_chars));
        }

        if chunks.is_empty() {
            return vec![Chunk::new(0, text.to_string(), text.chars().count())];
        }

        debug!(
            "Chunked {} chars into {} chunks (max {} chars)",
            text.len(),
            chunks.len(),
            self.max_chunk_chars
        );

        chunks
    }
}
