//! Sink printing formatted entries to stdout.

use async_trait::async_trait;
use folio_core::SinkError;
use tokio::io::{self, AsyncWriteExt};
use tokio::sync::Mutex;

use super::{unit_digest, StorageSink, UnitHandle};
use crate::format::{format_unit, EntryFormat};
use crate::types::IngestedUnit;

/// Writes each unit to stdout in an [`EntryFormat`].
pub struct StdoutSink {
    format: EntryFormat,
    out: Mutex<io::Stdout>,
}

impl StdoutSink {
    pub fn new(format: EntryFormat) -> Self {
        Self {
            format,
            out: Mutex::new(io::stdout()),
        }
    }
}

#[async_trait]
impl StorageSink for StdoutSink {
    fn name(&self) -> &str {
        "stdout"
    }

    async fn store(&self, unit: IngestedUnit) -> Result<UnitHandle, SinkError> {
        let handle = unit_digest(&unit);
        let mut entry = format_unit(&unit, self.format);
        entry.push('\n');

        let mut out = self.out.lock().await;
        out.write_all(entry.as_bytes()).await?;
        Ok(handle)
    }

    async fn flush(&self) -> Result<(), SinkError> {
        self.out.lock().await.flush().await?;
        Ok(())
    }
}
