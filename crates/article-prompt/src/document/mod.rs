pub mod chunker;
pub mod parser;

pub use chunker::{split_sentences, Chunk, SentenceChunker};
pub use parser::{extract_article, Article, ArticleFetcher};
