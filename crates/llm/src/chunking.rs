use serde::Serialize;
use text_splitter::{ChunkConfig, ChunkSizer, TextSplitter};
use tracing::debug;

use crate::tokens::TokenCounter;

/// Text chunk
#[derive(Debug, Clone, Serialize)]
pub struct TextChunk {
    /// Position in the document's chunk sequence
    pub index: usize,

    /// Chunk text
    pub text: String,

    /// Start byte offset in original text
    pub start: usize,

    /// End byte offset in original text (exclusive)
    pub end: usize,

    /// Token count
    pub tokens: usize,
}

/// Splits documents into contiguous chunks bounded by token count
///
/// Boundaries come from `text_splitter`, which prefers the largest semantic
/// unit (paragraph, sentence, word) that still fits the per-chunk target.
#[derive(Debug, Clone, Copy)]
pub struct TokenSplitter {
    pub min_chunk_tokens: usize,
    pub max_chunk_tokens: usize,
}

impl TokenSplitter {
    pub fn new(min_chunk_tokens: usize, max_chunk_tokens: usize) -> Self {
        Self {
            min_chunk_tokens: min_chunk_tokens.max(1),
            max_chunk_tokens: max_chunk_tokens.max(min_chunk_tokens.max(1)),
        }
    }

    /// Per-chunk token target for a document of `total_tokens` and `hint` chunks
    pub fn target_tokens(&self, total_tokens: usize, hint: usize) -> usize {
        (total_tokens / hint.max(1)).clamp(self.min_chunk_tokens, self.max_chunk_tokens)
    }

    /// Split text into chunks of roughly `total / hint` tokens
    pub fn split(&self, text: &str, counter: &dyn TokenCounter, hint: usize) -> Vec<TextChunk> {
        if text.trim().is_empty() {
            return Vec::new();
        }

        let total_tokens = counter.count(text);
        let target = self.target_tokens(total_tokens, hint);
        debug!(
            "Splitting {} tokens with target {} tokens per chunk (hint {})",
            total_tokens, target, hint
        );

        // Untrimmed chunks concatenate back to the input, so offsets stay contiguous
        let config = ChunkConfig::new(target)
            .with_sizer(CounterSizer(counter))
            .with_trim(false);
        let splitter = TextSplitter::new(config);

        let mut chunks = Vec::new();
        for (start, slice) in splitter.chunk_indices(text) {
            if slice.trim().is_empty() {
                continue;
            }
            chunks.push(TextChunk {
                index: chunks.len(),
                text: slice.to_string(),
                start,
                end: start + slice.len(),
                tokens: counter.count(slice),
            });
        }

        debug!("Split text into {} chunks", chunks.len());
        chunks
    }
}

/// Sizes chunks with the same counter the size gate uses
struct CounterSizer<'a>(&'a dyn TokenCounter);

impl ChunkSizer for CounterSizer<'_> {
    fn size(&self, chunk: &str) -> usize {
        self.0.count(chunk)
    }
}
