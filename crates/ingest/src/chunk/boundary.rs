//! Boundary detection: size counting, sentence and paragraph spans.
//!
//! The optional collaborators (a Hugging Face tokenizer and UAX #29 sentence
//! bounds) are chosen once by [`BoundaryDetector::resolve`]. Every
//! implementation reports byte offsets into the text it was given, so the
//! chunker can slice the input without re-encoding.

use std::fmt;
use std::ops::Range;
use std::sync::{Arc, OnceLock};

use folio_core::{ChunkingSettings, SentenceDetector};
use regex::Regex;

/// Byte range into a content unit.
pub type Span = Range<usize>;

/// Measures text in the unit `max_size` is expressed in.
pub trait SizeCounter: Send + Sync + fmt::Debug {
    /// Short identifier used in logs.
    fn name(&self) -> &str;

    /// Byte offsets where each counted unit starts. Ascending, on char
    /// boundaries, and starting at 0 for non-empty text.
    fn unit_starts(&self, text: &str) -> Vec<usize>;

    fn count(&self, text: &str) -> usize {
        self.unit_starts(text).len()
    }
}

/// Splits text into sentences.
pub trait SentenceSegmenter: Send + Sync + fmt::Debug {
    fn name(&self) -> &str;

    /// Ordered spans that tile `text` exactly, trailing whitespace included.
    fn split_sentences(&self, text: &str) -> Vec<Span>;
}

/// Counts Unicode scalar values.
#[derive(Debug, Clone, Copy, Default)]
pub struct CharCounter;

impl SizeCounter for CharCounter {
    fn name(&self) -> &str {
        "chars"
    }

    fn unit_starts(&self, text: &str) -> Vec<usize> {
        text.char_indices().map(|(i, _)| i).collect()
    }

    fn count(&self, text: &str) -> usize {
        text.chars().count()
    }
}

/// Counts tokens of a Hugging Face tokenizer.
#[cfg(feature = "hf-tokenizer")]
pub struct TokenCounter {
    tokenizer: tokenizers::Tokenizer,
    source: String,
}

#[cfg(feature = "hf-tokenizer")]
impl TokenCounter {
    /// Load a `tokenizer.json`. Its truncation and padding are cleared so
    /// every token of a page is counted.
    pub fn from_file(path: &std::path::Path) -> Result<Self, String> {
        let mut tokenizer = tokenizers::Tokenizer::from_file(path).map_err(|e| e.to_string())?;
        tokenizer.with_truncation(None).map_err(|e| e.to_string())?;
        tokenizer.with_padding(None);
        Ok(Self {
            tokenizer,
            source: path.display().to_string(),
        })
    }
}

#[cfg(feature = "hf-tokenizer")]
impl fmt::Debug for TokenCounter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenCounter")
            .field("source", &self.source)
            .finish_non_exhaustive()
    }
}

#[cfg(feature = "hf-tokenizer")]
impl SizeCounter for TokenCounter {
    fn name(&self) -> &str {
        "tokens"
    }

    fn unit_starts(&self, text: &str) -> Vec<usize> {
        if text.is_empty() {
            return Vec::new();
        }

        let encoding = match self.tokenizer.encode(text, false) {
            Ok(encoding) => encoding,
            Err(e) => {
                tracing::warn!(error = %e, "Tokenizer failed, counting characters instead");
                return CharCounter.unit_starts(text);
            }
        };

        let mut starts = vec![0];
        for &(start, _) in encoding.get_offsets() {
            let mut start = start.min(text.len());
            while !text.is_char_boundary(start) {
                start -= 1;
            }
            if start > *starts.last().unwrap_or(&0) && start < text.len() {
                starts.push(start);
            }
        }
        starts
    }
}

/// UAX #29 sentence boundaries.
#[cfg(feature = "unicode-sentences")]
#[derive(Debug, Clone, Copy, Default)]
pub struct UnicodeSentenceSegmenter;

#[cfg(feature = "unicode-sentences")]
impl SentenceSegmenter for UnicodeSentenceSegmenter {
    fn name(&self) -> &str {
        "unicode"
    }

    fn split_sentences(&self, text: &str) -> Vec<Span> {
        use unicode_segmentation::UnicodeSegmentation;

        text.split_sentence_bound_indices()
            .map(|(start, sentence)| start..start + sentence.len())
            .collect()
    }
}

/// Sentence ends at `.`, `!` or `?` runs, optionally followed by closing
/// quotes or brackets, then whitespace.
#[derive(Debug, Clone, Copy, Default)]
pub struct PunctuationSegmenter;

impl SentenceSegmenter for PunctuationSegmenter {
    fn name(&self) -> &str {
        "punctuation"
    }

    fn split_sentences(&self, text: &str) -> Vec<Span> {
        let cuts = sentence_end_regex().find_iter(text).map(|m| m.end());
        tile(text, cuts)
    }
}

fn sentence_end_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"[.!?]+["'”’)\]]*\s+"#).expect("valid sentence regex"))
}

fn paragraph_break_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\n\s*\n").expect("valid paragraph regex"))
}

/// Turn ascending cut offsets into spans covering `0..text.len()`.
fn tile(text: &str, cuts: impl Iterator<Item = usize>) -> Vec<Span> {
    let mut spans = Vec::new();
    let mut start = 0;
    for cut in cuts {
        if cut > start && cut < text.len() {
            spans.push(start..cut);
            start = cut;
        }
    }
    if start < text.len() {
        spans.push(start..text.len());
    }
    spans
}

/// Sentence splitting and size counting behind one handle.
#[derive(Debug, Clone)]
pub struct BoundaryDetector {
    counter: Arc<dyn SizeCounter>,
    sentences: Arc<dyn SentenceSegmenter>,
}

impl BoundaryDetector {
    pub fn new(counter: Arc<dyn SizeCounter>, sentences: Arc<dyn SentenceSegmenter>) -> Self {
        Self { counter, sentences }
    }

    /// Character counting and punctuation sentences. Needs nothing external.
    pub fn fallback() -> Self {
        Self::new(Arc::new(CharCounter), Arc::new(PunctuationSegmenter))
    }

    /// Pick the best available collaborators for these settings.
    pub fn resolve(settings: &ChunkingSettings) -> Self {
        let counter = resolve_counter(settings);
        let sentences = resolve_segmenter(settings.sentence_detector);

        tracing::info!(
            counter = counter.name(),
            sentences = sentences.name(),
            "Boundary detector resolved"
        );

        Self { counter, sentences }
    }

    /// Process-wide detector resolved from default settings on first use.
    pub fn global() -> Arc<BoundaryDetector> {
        static DETECTOR: OnceLock<Arc<BoundaryDetector>> = OnceLock::new();
        DETECTOR
            .get_or_init(|| Arc::new(Self::resolve(&ChunkingSettings::default())))
            .clone()
    }

    pub fn counter_name(&self) -> &str {
        self.counter.name()
    }

    pub fn segmenter_name(&self) -> &str {
        self.sentences.name()
    }

    pub fn count_size(&self, text: &str) -> usize {
        self.counter.count(text)
    }

    pub fn unit_starts(&self, text: &str) -> Vec<usize> {
        self.counter.unit_starts(text)
    }

    pub fn split_sentences(&self, text: &str) -> Vec<Span> {
        self.sentences.split_sentences(text)
    }

    /// Paragraphs separated by blank lines. The separator stays with the
    /// paragraph before it, and whitespace-only pieces join a neighbour.
    pub fn split_paragraphs(&self, text: &str) -> Vec<Span> {
        let cuts = paragraph_break_regex().find_iter(text).map(|m| m.end());
        let pieces = tile(text, cuts);

        let mut merged: Vec<Span> = Vec::with_capacity(pieces.len());
        let mut pending: Option<usize> = None;
        for piece in pieces {
            let start = pending.take().unwrap_or(piece.start);
            if text[piece.clone()].trim().is_empty() {
                pending = Some(start);
                continue;
            }
            merged.push(start..piece.end);
        }
        if let Some(start) = pending {
            match merged.last_mut() {
                Some(last) => last.end = text.len(),
                None => merged.push(start..text.len()),
            }
        }
        merged
    }
}

impl Default for BoundaryDetector {
    fn default() -> Self {
        Self::fallback()
    }
}

#[cfg(feature = "hf-tokenizer")]
fn resolve_counter(settings: &ChunkingSettings) -> Arc<dyn SizeCounter> {
    let Some(path) = &settings.tokenizer_path else {
        return Arc::new(CharCounter);
    };
    match TokenCounter::from_file(path) {
        Ok(counter) => Arc::new(counter),
        Err(e) => {
            tracing::warn!(path = ?path, error = %e, "Tokenizer unavailable, sizes are in characters");
            Arc::new(CharCounter)
        }
    }
}

#[cfg(not(feature = "hf-tokenizer"))]
fn resolve_counter(settings: &ChunkingSettings) -> Arc<dyn SizeCounter> {
    if let Some(path) = &settings.tokenizer_path {
        tracing::warn!(path = ?path, "Built without tokenizer support, sizes are in characters");
    }
    Arc::new(CharCounter)
}

fn resolve_segmenter(preference: SentenceDetector) -> Arc<dyn SentenceSegmenter> {
    match preference {
        #[cfg(feature = "unicode-sentences")]
        SentenceDetector::Unicode => Arc::new(UnicodeSentenceSegmenter),
        #[cfg(not(feature = "unicode-sentences"))]
        SentenceDetector::Unicode => {
            tracing::debug!("Unicode sentence bounds not compiled in, using punctuation");
            Arc::new(PunctuationSegmenter)
        }
        SentenceDetector::Punctuation => Arc::new(PunctuationSegmenter),
    }
}
