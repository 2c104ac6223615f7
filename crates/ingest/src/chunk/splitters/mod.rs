//! Splitting strategies.

mod fixed;
mod semantic;
mod sentence;

pub use fixed::FixedSplitter;
pub use semantic::SemanticSplitter;
pub use sentence::SentenceSplitter;

use folio_core::{ChunkConfig, ChunkStrategy};

use super::boundary::{BoundaryDetector, Span};

/// Trait for chunk splitters.
///
/// Returned spans are ordered by start, cover the whole text, and each one
/// measures at most `config.max_size()` units. Consecutive spans may
/// overlap by at most `config.overlap()` units.
pub trait ChunkSplitter: Send + Sync {
    fn spans(&self, text: &str, config: &ChunkConfig, detector: &BoundaryDetector) -> Vec<Span>;
}

/// Splitter for a strategy.
pub fn for_strategy(strategy: ChunkStrategy) -> &'static dyn ChunkSplitter {
    match strategy {
        ChunkStrategy::Fixed => &FixedSplitter,
        ChunkStrategy::Sentence => &SentenceSplitter,
        ChunkStrategy::Semantic => &SemanticSplitter,
    }
}

/// Size units of one text, measured once.
#[derive(Debug)]
pub(crate) struct Units {
    starts: Vec<usize>,
    len: usize,
}

impl Units {
    pub(crate) fn measure(text: &str, detector: &BoundaryDetector) -> Self {
        Self {
            starts: detector.unit_starts(text),
            len: text.len(),
        }
    }

    pub(crate) fn total(&self) -> usize {
        self.starts.len()
    }

    /// Number of units starting inside `span`.
    pub(crate) fn size(&self, span: &Span) -> usize {
        self.index_of(span.end) - self.index_of(span.start)
    }

    /// Index of the first unit starting at or after `byte`.
    pub(crate) fn index_of(&self, byte: usize) -> usize {
        self.starts.partition_point(|&s| s < byte)
    }

    /// Byte offset of unit `index`, or the text length past the end.
    pub(crate) fn offset(&self, index: usize) -> usize {
        self.starts.get(index).copied().unwrap_or(self.len)
    }
}
