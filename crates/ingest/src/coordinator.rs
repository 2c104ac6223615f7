//! Per-document ingestion runs.
//!
//! A run opens the document on a blocking worker, which extracts and chunks
//! pages in ascending order and streams them over a bounded channel. The
//! async side stamps provenance and hands units to the sink one at a time.
//! Cancellation is checked between pages.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use folio_core::{DocumentError, SinkError};
use futures::stream::{self, StreamExt};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use crate::chunk::{ChunkUnit, Chunker};
use crate::extract::{extract_page, DocumentKind, DocumentOpener, FsOpener};
use crate::progress::{record_unit, ProgressReporter};
use crate::sink::StorageSink;
use crate::types::{keys, BatchReport, DocumentFailure, IngestedUnit, Metadata, PageUnit, RunReport};

/// Default number of documents ingested at once by [`IngestionCoordinator::run_many`].
pub const DEFAULT_CONCURRENCY: usize = 4;

/// One extracted and chunked content unit, in page order.
struct PageOutcome {
    page: PageUnit,
    chunks: Vec<ChunkUnit>,
    paginated: bool,
}

/// What the extraction worker got through.
struct WorkerSummary {
    visited: usize,
    expected: usize,
}

/// Drives extraction and chunking per document and feeds the sink.
#[derive(Clone)]
pub struct IngestionCoordinator {
    chunker: Arc<Chunker>,
    sink: Arc<dyn StorageSink>,
    opener: Arc<dyn DocumentOpener>,
    progress: ProgressReporter,
    cancel: CancellationToken,
    concurrency: usize,
}

impl IngestionCoordinator {
    pub fn new(chunker: Arc<Chunker>, sink: Arc<dyn StorageSink>) -> Self {
        Self {
            chunker,
            sink,
            opener: Arc::new(FsOpener),
            progress: ProgressReporter::noop(),
            cancel: CancellationToken::new(),
            concurrency: DEFAULT_CONCURRENCY,
        }
    }

    pub fn with_opener(mut self, opener: Arc<dyn DocumentOpener>) -> Self {
        self.opener = opener;
        self
    }

    pub fn with_progress(mut self, progress: ProgressReporter) -> Self {
        self.progress = progress;
        self
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Flush the sink.
    pub async fn flush(&self) -> Result<(), SinkError> {
        self.sink.flush().await
    }

    /// Ingest one document.
    ///
    /// Fails only when the document cannot be opened, in which case nothing
    /// was stored. Page and sink failures are counted in the report.
    pub async fn run(&self, path: &Path, metadata: &Metadata) -> Result<RunReport, DocumentError> {
        let document_id = document_id(path);
        let span = tracing::info_span!("ingest", document_id = %document_id);
        self.run_inner(path, document_id, metadata).instrument(span).await
    }

    async fn run_inner(
        &self,
        path: &Path,
        document_id: String,
        metadata: &Metadata,
    ) -> Result<RunReport, DocumentError> {
        let mut report = RunReport::new(document_id.clone());
        if self.cancel.is_cancelled() {
            tracing::info!("Run cancelled before start");
            report.cancelled = true;
            return Ok(report);
        }

        let base = base_metadata(path, metadata);
        let (tx, mut rx) = mpsc::channel::<PageOutcome>(1);

        let worker = {
            let path = path.to_path_buf();
            let opener = self.opener.clone();
            let chunker = self.chunker.clone();
            let cancel = self.cancel.clone();
            let progress = self.progress.clone();
            let document_id = document_id.clone();

            tokio::task::spawn_blocking(move || -> Result<WorkerSummary, DocumentError> {
                let document = opener.open(&path)?;
                let paginated = document.kind() == DocumentKind::Paginated;
                let expected = if paginated { document.page_count() } else { 1 };
                let total = paginated.then_some(expected as u64);

                let mut visited = 0;
                for index in 0..expected {
                    if cancel.is_cancelled() {
                        break;
                    }

                    let page = extract_page(document.as_ref(), index);
                    progress.extract(index as u64 + 1, total, &document_id);

                    let chunks = chunker.split(&page.content);
                    progress.chunk(index as u64 + 1, total, chunks.len());

                    visited += 1;
                    let outcome = PageOutcome {
                        page,
                        chunks,
                        paginated,
                    };
                    if tx.blocking_send(outcome).is_err() {
                        break;
                    }
                }

                Ok(WorkerSummary { visited, expected })
            })
        };

        let mut stopped_early = false;
        while let Some(outcome) = rx.recv().await {
            self.store_page(&mut report, &base, &document_id, outcome).await;

            if self.cancel.is_cancelled() {
                stopped_early = true;
                break;
            }
        }
        drop(rx);

        let summary = worker.await.map_err(|e| DocumentError::Corrupted {
            path: path.to_path_buf(),
            reason: format!("extraction worker failed: {}", e),
        })?;
        let summary = match summary {
            Ok(summary) => summary,
            Err(e) => {
                tracing::error!(kind = e.kind(), error = %e, "Document could not be opened");
                return Err(e);
            }
        };

        report.cancelled = stopped_early || summary.visited < summary.expected;

        tracing::info!(
            succeeded = report.succeeded,
            skipped = report.skipped,
            failed = report.failed,
            units = report.content_units,
            cancelled = report.cancelled,
            "Document ingested"
        );

        Ok(report)
    }

    async fn store_page(
        &self,
        report: &mut RunReport,
        base: &Metadata,
        document_id: &str,
        outcome: PageOutcome,
    ) {
        let PageOutcome {
            page,
            chunks,
            paginated,
        } = outcome;
        report.content_units += 1;

        if chunks.is_empty() {
            tracing::info!(page = page.physical_index, "Skipping empty content unit");
            report.skipped += 1;
            return;
        }

        let provenance = paginated.then_some((document_id, &page));
        for chunk in chunks {
            let chunk_index = chunk.chunk_index;
            let unit = IngestedUnit::new(base, provenance, chunk);

            match self.sink.store(unit).await {
                Ok(handle) => {
                    report.succeeded += 1;
                    record_unit();
                    tracing::trace!(page = page.physical_index, chunk_index, %handle, "Stored unit");
                }
                Err(e) => {
                    report.failed += 1;
                    tracing::error!(
                        page = page.physical_index,
                        chunk_index,
                        sink = self.sink.name(),
                        error = %e,
                        "Sink failed to store unit"
                    );
                }
            }
        }

        self.progress.store(u64::from(report.succeeded), document_id);
    }

    /// Ingest several documents, up to the configured concurrency at once.
    /// Results keep input order.
    pub async fn run_many(&self, paths: &[PathBuf], metadata: &Metadata) -> BatchReport {
        self.progress.discover(paths.len() as u64, "batch");

        let results: Vec<(PathBuf, Result<RunReport, DocumentError>)> =
            stream::iter(paths.iter().cloned())
                .map(|path| async move {
                    let result = self.run(&path, metadata).await;
                    (path, result)
                })
                .buffered(self.concurrency)
                .collect()
                .await;

        let mut batch = BatchReport::default();
        for (path, result) in results {
            match result {
                Ok(report) => batch.runs.push(report),
                Err(e) => batch.errors.push(DocumentFailure {
                    path,
                    kind: e.kind().to_string(),
                    message: e.to_string(),
                }),
            }
        }

        tracing::info!(
            documents = batch.documents(),
            succeeded = batch.succeeded(),
            skipped = batch.skipped(),
            failed = batch.failed(),
            errors = batch.errors.len(),
            "Batch complete"
        );

        batch
    }
}

/// Document identifier: the file name, or the whole path when it has none.
pub fn document_id(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// File metadata, overridden by caller-supplied keys.
fn base_metadata(path: &Path, metadata: &Metadata) -> Metadata {
    let mut base = Metadata::new();
    base.insert(keys::FILENAME.into(), document_id(path).into());
    base.insert(keys::FILEPATH.into(), path.display().to_string().into());
    base.insert(
        keys::EXTENSION.into(),
        path.extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default()
            .into(),
    );
    base.extend(metadata.iter().map(|(k, v)| (k.clone(), v.clone())));
    base
}
