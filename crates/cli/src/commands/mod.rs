//! Command handlers for the Folio CLI.
//!
//! This module organizes all CLI commands into separate submodules.

pub mod ingest;
pub mod inspect;

// Re-export command types for convenience
pub use ingest::IngestCommand;
pub use inspect::InspectCommand;

use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;
use folio_core::{config::AppConfig, AppResult, ConfigOverrides, SentenceDetector};
use folio_ingest::{BoundaryDetector, Chunker};

/// Chunking flags shared by commands that split text.
#[derive(Args, Debug, Clone, Default)]
pub struct ChunkArgs {
    /// Enable or disable chunking (true/false)
    #[arg(long, env = "FOLIO_ENABLE_CHUNKING")]
    pub enable_chunking: Option<bool>,

    /// Chunking strategy (fixed, sentence, semantic)
    #[arg(long, env = "FOLIO_CHUNK_STRATEGY")]
    pub strategy: Option<String>,

    /// Maximum chunk size, in tokens with a tokenizer, else characters
    #[arg(long, env = "FOLIO_MAX_CHUNK_SIZE")]
    pub max_size: Option<usize>,

    /// Overlap between consecutive chunks, same unit as max size
    #[arg(long, env = "FOLIO_CHUNK_OVERLAP")]
    pub overlap: Option<usize>,

    /// Path to a tokenizer.json used for token counting
    #[arg(long, env = "FOLIO_TOKENIZER")]
    pub tokenizer: Option<PathBuf>,

    /// Force the punctuation sentence splitter
    #[arg(long)]
    pub punctuation_sentences: bool,
}

impl ChunkArgs {
    fn overrides(&self, base: ConfigOverrides) -> ConfigOverrides {
        ConfigOverrides {
            enable_chunking: self.enable_chunking,
            strategy: self.strategy.clone(),
            max_size: self.max_size,
            overlap: self.overlap,
            tokenizer_path: self.tokenizer.clone(),
            sentence_detector: self
                .punctuation_sentences
                .then_some(SentenceDetector::Punctuation),
            ..base
        }
    }

    /// Apply the flags on top of `base`, validate once, and resolve boundary
    /// collaborators once.
    pub fn build_chunker(
        &self,
        config: AppConfig,
        base: ConfigOverrides,
    ) -> AppResult<(AppConfig, Arc<Chunker>)> {
        let config = config.with_overrides(self.overrides(base));
        let chunk_config = config.validate()?;
        let detector = Arc::new(BoundaryDetector::resolve(&config.chunking));

        tracing::info!(
            enabled = chunk_config.enabled(),
            strategy = %chunk_config.strategy(),
            max_size = chunk_config.max_size(),
            overlap = chunk_config.overlap(),
            counter = detector.counter_name(),
            "Chunking configured"
        );

        Ok((config, Arc::new(Chunker::new(chunk_config, detector))))
    }
}
