//! Error types for the Folio ingestion pipeline.
//!
//! `AppError` is the unified error returned across crate boundaries. The
//! stage-specific enums below carry the recoverability contract of each
//! stage: document and configuration errors are fatal for their scope, page
//! and sink errors are counted and skipped.

use std::path::PathBuf;

use thiserror::Error;

/// Unified error type for Folio.
///
/// All fallible functions return `Result<T, AppError>`.
/// We never panic; errors are represented and propagated.
#[derive(Error, Debug)]
pub enum AppError {
    /// Process configuration errors (file, environment, logging filter)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid chunking settings, detected before any document is processed
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    /// A document could not be opened; nothing from it was ingested
    #[error(transparent)]
    Document(#[from] DocumentError),

    /// The storage sink refused a unit
    #[error(transparent)]
    Sink(#[from] SinkError),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Fatal failure opening a document. Aborts that document's run before any
/// unit is produced.
#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("Document {path:?} is unreadable: {reason}")]
    Unreadable { path: PathBuf, reason: String },

    #[error("Document {path:?} is corrupted: {reason}")]
    Corrupted { path: PathBuf, reason: String },

    #[error("Document {path:?} is encrypted")]
    Encrypted { path: PathBuf },
}

impl DocumentError {
    /// Short machine-friendly kind, used in logs and reports.
    pub fn kind(&self) -> &'static str {
        match self {
            DocumentError::Unreadable { .. } => "unreadable",
            DocumentError::Corrupted { .. } => "corrupted",
            DocumentError::Encrypted { .. } => "encrypted",
        }
    }
}

/// Recoverable failure on a single page. The page is treated as empty and
/// index continuity is preserved.
#[derive(Error, Debug)]
pub enum PageError {
    #[error("Page {index} has no extractable text: {reason}")]
    Unextractable { index: usize, reason: String },
}

/// Invalid chunking configuration. Raised once at startup, never mid-run.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("Chunk overlap {overlap} must be smaller than max size {max_size}")]
    InvalidOverlap { overlap: usize, max_size: usize },

    #[error("Unknown chunk strategy '{0}'. Supported: fixed, sentence, semantic")]
    InvalidStrategy(String),

    #[error("Chunk max size must be positive")]
    InvalidMaxSize,
}

/// Storage sink failure for one unit. Counted as `failed`, the run continues.
#[derive(Error, Debug)]
pub enum SinkError {
    #[error("Sink rejected unit: {0}")]
    Rejected(String),

    #[error("Sink I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Sink serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for SinkError {
    fn from(err: serde_json::Error) -> Self {
        SinkError::Serialization(err.to_string())
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_error_kind() {
        let err = DocumentError::Encrypted {
            path: PathBuf::from("secret.pdf"),
        };
        assert_eq!(err.kind(), "encrypted");
        assert!(err.to_string().contains("secret.pdf"));
    }

    #[test]
    fn test_configuration_error_converts() {
        let err: AppError = ConfigurationError::InvalidOverlap {
            overlap: 10,
            max_size: 5,
        }
        .into();
        assert!(matches!(err, AppError::Configuration(_)));
        assert!(err.to_string().contains("must be smaller"));
    }
}
