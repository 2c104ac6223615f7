//! Folio Core Library
//!
//! This crate provides the foundational utilities shared by the ingestion
//! pipeline and the `folio` binary:
//! - Error taxonomy (`AppError`, `AppResult` and the per-stage error enums)
//! - Logging infrastructure
//! - Configuration loading and chunking-settings validation

pub mod config;
pub mod error;
pub mod logging;

// Re-export commonly used types
pub use config::{
    AppConfig, ChunkConfig, ChunkStrategy, ChunkingSettings, ConfigOverrides, OutputSettings,
    SentenceDetector,
};
pub use error::{
    AppError, AppResult, ConfigurationError, DocumentError, PageError, SinkError,
};
