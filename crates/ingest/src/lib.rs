//! Page-aware document decomposition and chunking.
//!
//! Documents are opened and read page by page, each page's label is decoded
//! from the document's numbering metadata, page text is split into
//! size-bounded, overlap-linked chunks, and the resulting units are handed
//! to a storage sink with their provenance.

pub mod chunk;
pub mod coordinator;
pub mod discover;
pub mod extract;
pub mod format;
pub mod labels;
pub mod progress;
pub mod sink;
pub mod types;

// Re-export commonly used types
pub use chunk::{reconstruct, BoundaryDetector, ChunkUnit, Chunker};
pub use coordinator::IngestionCoordinator;
pub use discover::{discover, DiscoverOptions};
pub use extract::{open_document, DocumentKind, DocumentOpener, FsOpener, SourceDocument};
pub use format::{format_unit, EntryFormat};
pub use labels::{LabelRange, PageLabelStyle, PageNumbering};
pub use progress::{ProgressEvent, ProgressReporter};
pub use sink::{JsonlSink, MemorySink, StdoutSink, StorageSink, UnitHandle};
pub use types::{
    BatchReport, DocumentFailure, IngestedUnit, Metadata, MetadataValue, PageUnit, RunReport,
};
