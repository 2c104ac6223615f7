//! Chunking pipeline orchestrator.

use std::sync::Arc;

use folio_core::ChunkConfig;

use super::{
    boundary::{BoundaryDetector, Span},
    splitters::for_strategy,
    ChunkUnit,
};

/// Splits content units into stamped chunks.
#[derive(Debug, Clone)]
pub struct Chunker {
    config: ChunkConfig,
    detector: Arc<BoundaryDetector>,
}

impl Chunker {
    /// Create a chunker from a validated config and a resolved detector.
    pub fn new(config: ChunkConfig, detector: Arc<BoundaryDetector>) -> Self {
        Self { config, detector }
    }

    /// Chunker using character counts and punctuation sentences.
    pub fn with_fallback(config: ChunkConfig) -> Self {
        Self::new(config, Arc::new(BoundaryDetector::fallback()))
    }

    pub fn config(&self) -> &ChunkConfig {
        &self.config
    }

    pub fn detector(&self) -> &BoundaryDetector {
        &self.detector
    }

    /// Split one content unit.
    ///
    /// Empty or whitespace-only text yields no chunk. Text that fits in
    /// `max_size`, or any text when chunking is disabled, yields a single
    /// unsplit chunk.
    pub fn split(&self, text: &str) -> Vec<ChunkUnit> {
        if text.trim().is_empty() {
            return Vec::new();
        }

        let spans = if !self.config.enabled()
            || self.detector.count_size(text) <= self.config.max_size()
        {
            vec![0..text.len()]
        } else {
            let spans = for_strategy(self.config.strategy()).spans(text, &self.config, &self.detector);
            if spans.is_empty() {
                vec![0..text.len()]
            } else {
                spans
            }
        };

        let chunks = stamp(text, &spans);

        tracing::debug!(
            strategy = %self.config.strategy(),
            chunks = chunks.len(),
            bytes = text.len(),
            "Chunking complete"
        );

        chunks
    }
}

/// Annotate the full sibling list once its length is known.
fn stamp(text: &str, spans: &[Span]) -> Vec<ChunkUnit> {
    let total = spans.len();
    let mut previous_end: usize = 0;

    spans
        .iter()
        .enumerate()
        .map(|(index, span)| {
            let overlap_len = if index == 0 {
                0
            } else {
                previous_end.saturating_sub(span.start)
            };
            previous_end = span.end;

            ChunkUnit {
                chunk_index: index,
                total_chunks: total,
                text: text[span.clone()].to_string(),
                is_chunk: total > 1,
                overlap_len,
                byte_range: (span.start, span.end),
            }
        })
        .collect()
}
