//! Storage sink abstraction for ingested units.
//!
//! The coordinator hands each finished unit to a [`StorageSink`] by value.
//! Serialization, deduplication and retries belong to the sink.

mod jsonl;
mod memory;
mod stdout;

pub use jsonl::JsonlSink;
pub use memory::MemorySink;
pub use stdout::StdoutSink;

use async_trait::async_trait;
use folio_core::SinkError;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::types::{keys, IngestedUnit};

/// Identifier a sink assigns to a stored unit.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UnitHandle(pub String);

impl std::fmt::Display for UnitHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Trait for storage backends.
///
/// Implementations must be safe to share between concurrent document runs.
#[async_trait]
pub trait StorageSink: Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &str;

    /// Store one unit. A failure affects only this unit.
    async fn store(&self, unit: IngestedUnit) -> Result<UnitHandle, SinkError>;

    /// Commit any pending writes (for backends that buffer).
    async fn flush(&self) -> Result<(), SinkError> {
        Ok(())
    }
}

/// Deterministic handle: SHA-256 over document id, page, chunk index and text.
pub fn unit_digest(unit: &IngestedUnit) -> UnitHandle {
    let mut hasher = Sha256::new();
    for key in [keys::DOCUMENT_ID, keys::FILEPATH, keys::PHYSICAL_PAGE_INDEX, keys::CHUNK_INDEX] {
        let value = unit.get(key).map(|v| v.to_string()).unwrap_or_default();
        hasher.update(value.as_bytes());
        hasher.update([0u8]);
    }
    hasher.update(unit.text.as_bytes());
    UnitHandle(format!("{:x}", hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk::ChunkUnit;
    use crate::types::Metadata;

    fn unit(text: &str, index: usize) -> IngestedUnit {
        let chunk = ChunkUnit {
            chunk_index: index,
            total_chunks: 2,
            text: text.to_string(),
            is_chunk: true,
            overlap_len: 0,
            byte_range: (0, text.len()),
        };
        IngestedUnit::new(&Metadata::new(), None, chunk)
    }

    #[test]
    fn test_unit_digest() {
        let handle = unit_digest(&unit("Hello, world!", 0));
        assert_eq!(handle.0.len(), 64);
        assert_eq!(handle, unit_digest(&unit("Hello, world!", 0)));
        assert_ne!(handle, unit_digest(&unit("Hello, world!", 1)));
        assert_ne!(handle, unit_digest(&unit("Different text", 0)));
    }
}
