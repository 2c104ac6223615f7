//! Size-bounded chunking of content units.
//!
//! This module provides:
//! - Boundary detection (size counting, sentences, paragraphs)
//! - Three splitting strategies: fixed, sentence, semantic
//! - Chunk stamping with index, total and overlap bookkeeping
//!
//! Chunk texts are exact byte slices of the input, so dropping each chunk's
//! `overlap_len` leading bytes and concatenating restores the content.

mod boundary;
mod pipeline;
pub mod splitters;

pub use boundary::{
    BoundaryDetector, CharCounter, PunctuationSegmenter, SentenceSegmenter, SizeCounter, Span,
};
#[cfg(feature = "hf-tokenizer")]
pub use boundary::TokenCounter;
#[cfg(feature = "unicode-sentences")]
pub use boundary::UnicodeSentenceSegmenter;
pub use pipeline::Chunker;

use serde::{Deserialize, Serialize};

/// One piece of a content unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkUnit {
    /// Position in the content unit (0-indexed)
    pub chunk_index: usize,

    /// Number of chunks the content unit produced
    pub total_chunks: usize,

    /// Chunk text, a slice of the content unit
    pub text: String,

    /// True when the content unit was split into more than one chunk
    pub is_chunk: bool,

    /// Leading bytes repeated from the previous chunk
    pub overlap_len: usize,

    /// Byte range in the content unit
    pub byte_range: (usize, usize),
}

/// Rebuild the original content from an ordered chunk sequence.
pub fn reconstruct(chunks: &[ChunkUnit]) -> String {
    let mut out = String::new();
    for chunk in chunks {
        out.push_str(chunk.text.get(chunk.overlap_len..).unwrap_or_default());
    }
    out
}
