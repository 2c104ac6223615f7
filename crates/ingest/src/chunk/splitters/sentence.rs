//! Greedy sentence packing.

use folio_core::ChunkConfig;

use super::{ChunkSplitter, Units};
use crate::chunk::boundary::{BoundaryDetector, Span};

/// Packs whole sentences up to `max_size`, carrying trailing sentences of
/// each chunk into the next to cover `overlap`.
pub struct SentenceSplitter;

impl ChunkSplitter for SentenceSplitter {
    fn spans(&self, text: &str, config: &ChunkConfig, detector: &BoundaryDetector) -> Vec<Span> {
        let units = Units::measure(text, detector);
        let spans = pack_sentences(text, 0..text.len(), &units, config, detector);

        tracing::debug!(
            chunks = spans.len(),
            sentences = detector.segmenter_name(),
            "Sentence split"
        );
        spans
    }
}

/// Split `range` of `text` into sentence-packed spans.
///
/// Overlap is end-anchored: the next chunk begins with the longest run of
/// trailing sentences from the previous chunk that fits in `overlap` units
/// and still leaves room for the sentence that did not fit.
pub(crate) fn pack_sentences(
    text: &str,
    range: Span,
    units: &Units,
    config: &ChunkConfig,
    detector: &BoundaryDetector,
) -> Vec<Span> {
    let max = config.max_size();
    let overlap = config.overlap();

    let pieces: Vec<Span> = detector
        .split_sentences(&text[range.clone()])
        .into_iter()
        .map(|s| s.start + range.start..s.end + range.start)
        .flat_map(|s| windows(s, units, max))
        .collect();
    let sizes: Vec<usize> = pieces.iter().map(|p| units.size(p)).collect();

    let mut spans = Vec::new();
    let mut first = 0;
    while first < pieces.len() {
        let mut end = first;
        let mut size = 0;
        while end < pieces.len() && (end == first || size + sizes[end] <= max) {
            size += sizes[end];
            end += 1;
        }
        spans.push(pieces[first].start..pieces[end - 1].end);

        if end == pieces.len() {
            break;
        }

        let mut next = end;
        let mut carried = 0;
        while next > first + 1
            && carried + sizes[next - 1] <= overlap
            && carried + sizes[next - 1] + sizes[end] <= max
        {
            carried += sizes[next - 1];
            next -= 1;
        }
        first = next;
    }
    spans
}

/// Cut a sentence longer than `max` units into consecutive `max`-unit pieces.
fn windows(sentence: Span, units: &Units, max: usize) -> Vec<Span> {
    if units.size(&sentence) <= max {
        return vec![sentence];
    }

    let mut pieces = Vec::new();
    let mut start = sentence.start;
    let mut index = units.index_of(start);
    while start < sentence.end {
        index += max;
        let end = units.offset(index).min(sentence.end);
        pieces.push(start..end);
        start = end;
    }
    pieces
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk::boundary::PunctuationSegmenter;
    use folio_core::ChunkStrategy;

    fn config(max: usize, overlap: usize) -> ChunkConfig {
        ChunkConfig::new(ChunkStrategy::Sentence, max, overlap).unwrap()
    }

    fn texts<'a>(text: &'a str, spans: &[Span]) -> Vec<&'a str> {
        spans.iter().map(|s| &text[s.clone()]).collect()
    }

    #[test]
    fn test_packs_whole_sentences() {
        let text = "Aaaa. Bbbb. Cccc. Dddd.";
        let spans = SentenceSplitter.spans(text, &config(12, 0), &BoundaryDetector::fallback());
        assert_eq!(texts(text, &spans), vec!["Aaaa. Bbbb. ", "Cccc. Dddd."]);
    }

    #[test]
    fn test_carries_trailing_sentence_as_overlap() {
        let text = "Aaaa. Bbbb. Cccc. Dddd.";
        let spans = SentenceSplitter.spans(text, &config(12, 6), &BoundaryDetector::fallback());
        assert_eq!(
            texts(text, &spans),
            vec!["Aaaa. Bbbb. ", "Bbbb. Cccc. ", "Cccc. Dddd."]
        );
    }

    #[test]
    fn test_overlap_never_exceeds_budget() {
        let text = "Aaaa. Bbbb. Cccc. Dddd.";
        // A 6-char sentence does not fit in 5 units of overlap
        let spans = SentenceSplitter.spans(text, &config(12, 5), &BoundaryDetector::fallback());
        assert_eq!(texts(text, &spans), vec!["Aaaa. Bbbb. ", "Cccc. Dddd."]);
    }

    #[test]
    fn test_long_sentence_is_windowed() {
        let text = format!("{} short.", "w".repeat(25));
        let spans = SentenceSplitter.spans(&text, &config(10, 0), &BoundaryDetector::fallback());
        assert!(spans.len() >= 3);
        for span in &spans {
            assert!(text[span.clone()].chars().count() <= 10);
        }
        assert_eq!(spans.last().map(|s| s.end), Some(text.len()));
    }

    #[test]
    fn test_punctuation_fallback_still_chunks() {
        let detector = BoundaryDetector::new(
            std::sync::Arc::new(crate::chunk::boundary::CharCounter),
            std::sync::Arc::new(PunctuationSegmenter),
        );
        let spans = SentenceSplitter.spans("no punctuation at all here", &config(8, 2), &detector);
        assert!(!spans.is_empty());
    }
}
