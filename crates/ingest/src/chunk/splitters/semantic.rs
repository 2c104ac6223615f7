//! Paragraph-first splitter.

use folio_core::ChunkConfig;

use super::sentence::pack_sentences;
use super::{ChunkSplitter, Units};
use crate::chunk::boundary::{BoundaryDetector, Span};

/// One chunk per paragraph. Paragraphs larger than `max_size` are packed by
/// sentence, with overlap only inside that paragraph.
pub struct SemanticSplitter;

impl ChunkSplitter for SemanticSplitter {
    fn spans(&self, text: &str, config: &ChunkConfig, detector: &BoundaryDetector) -> Vec<Span> {
        let units = Units::measure(text, detector);

        let mut spans = Vec::new();
        let mut oversized = 0;
        for paragraph in detector.split_paragraphs(text) {
            if units.size(&paragraph) <= config.max_size() {
                spans.push(paragraph);
            } else {
                oversized += 1;
                spans.extend(pack_sentences(text, paragraph, &units, config, detector));
            }
        }

        tracing::debug!(chunks = spans.len(), oversized, "Semantic split");
        spans
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_core::ChunkStrategy;

    fn config(max: usize, overlap: usize) -> ChunkConfig {
        ChunkConfig::new(ChunkStrategy::Semantic, max, overlap).unwrap()
    }

    #[test]
    fn test_paragraph_per_chunk() {
        let text = "First paragraph.\n\nSecond paragraph.\n\nThird.";
        let spans = SemanticSplitter.spans(text, &config(30, 5), &BoundaryDetector::fallback());
        let texts: Vec<&str> = spans.iter().map(|s| &text[s.clone()]).collect();
        assert_eq!(
            texts,
            vec!["First paragraph.\n\n", "Second paragraph.\n\n", "Third."]
        );
    }

    #[test]
    fn test_oversized_paragraph_falls_back_to_sentences() {
        let text = "Short one.\n\nAaaa. Bbbb. Cccc. Dddd.";
        let spans = SemanticSplitter.spans(text, &config(12, 6), &BoundaryDetector::fallback());
        let texts: Vec<&str> = spans.iter().map(|s| &text[s.clone()]).collect();
        assert_eq!(
            texts,
            vec!["Short one.\n\n", "Aaaa. Bbbb. ", "Bbbb. Cccc. ", "Cccc. Dddd."]
        );
    }
}
