//! Append-only JSON lines sink.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use folio_core::SinkError;
use serde::Serialize;
use tokio::fs::{self, File, OpenOptions};
use tokio::io::{AsyncWriteExt, BufWriter};
use tokio::sync::Mutex;

use super::{unit_digest, StorageSink, UnitHandle};
use crate::types::{IngestedUnit, Metadata};

#[derive(Serialize)]
struct Record<'a> {
    id: &'a str,
    text: &'a str,
    metadata: &'a Metadata,
}

/// Writes one JSON object per unit to a file.
pub struct JsonlSink {
    path: PathBuf,
    writer: Mutex<BufWriter<File>>,
}

impl JsonlSink {
    /// Open `path` for appending, creating it and its parent directory.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, SinkError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await?;

        tracing::debug!(path = ?path, "Opened JSONL sink");

        Ok(Self {
            path,
            writer: Mutex::new(BufWriter::new(file)),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl StorageSink for JsonlSink {
    fn name(&self) -> &str {
        "jsonl"
    }

    async fn store(&self, unit: IngestedUnit) -> Result<UnitHandle, SinkError> {
        let handle = unit_digest(&unit);
        let mut line = serde_json::to_vec(&Record {
            id: &handle.0,
            text: &unit.text,
            metadata: &unit.metadata,
        })?;
        line.push(b'\n');

        let mut writer = self.writer.lock().await;
        writer.write_all(&line).await?;
        Ok(handle)
    }

    async fn flush(&self) -> Result<(), SinkError> {
        let mut writer = self.writer.lock().await;
        writer.flush().await?;
        Ok(())
    }
}
