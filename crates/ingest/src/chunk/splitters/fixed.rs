//! Sliding window splitter.

use folio_core::ChunkConfig;

use super::{ChunkSplitter, Units};
use crate::chunk::boundary::{BoundaryDetector, Span};

/// Windows of `max_size` units, advancing by `max_size - overlap`.
pub struct FixedSplitter;

impl ChunkSplitter for FixedSplitter {
    fn spans(&self, text: &str, config: &ChunkConfig, detector: &BoundaryDetector) -> Vec<Span> {
        let units = Units::measure(text, detector);
        let total = units.total();

        let mut spans = Vec::new();
        let mut first = 0;
        while first < total {
            let last = (first + config.max_size()).min(total);
            spans.push(units.offset(first)..units.offset(last));
            if last == total {
                break;
            }
            first += config.step();
        }

        tracing::debug!(chunks = spans.len(), units = total, "Fixed split");
        spans
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_core::ChunkStrategy;

    fn config(max: usize, overlap: usize) -> ChunkConfig {
        ChunkConfig::new(ChunkStrategy::Fixed, max, overlap).unwrap()
    }

    #[test]
    fn test_windows_advance_by_step() {
        let text = "x".repeat(1000);
        let spans = FixedSplitter.spans(&text, &config(300, 50), &BoundaryDetector::fallback());
        assert_eq!(spans, vec![0..300, 250..550, 500..800, 750..1000]);
    }

    #[test]
    fn test_exact_fit_has_no_trailing_window() {
        let text = "y".repeat(20);
        let spans = FixedSplitter.spans(&text, &config(10, 0), &BoundaryDetector::fallback());
        assert_eq!(spans, vec![0..10, 10..20]);
    }

    #[test]
    fn test_windows_respect_char_boundaries() {
        let text = "é".repeat(7);
        let spans = FixedSplitter.spans(&text, &config(3, 1), &BoundaryDetector::fallback());
        for span in &spans {
            assert!(text.is_char_boundary(span.start));
            assert!(text.is_char_boundary(span.end));
            assert!(text[span.clone()].chars().count() <= 3);
        }
        assert_eq!(spans.last().map(|s| s.end), Some(text.len()));
    }
}
