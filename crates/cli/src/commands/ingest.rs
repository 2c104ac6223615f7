//! Ingest command handler.
//!
//! Discovers documents under a path, chunks them page by page and writes the
//! resulting units to the configured sink.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;
use folio_core::{config::AppConfig, AppResult, ConfigOverrides};
use folio_ingest::{
    discover, types::keys, DiscoverOptions, EntryFormat, IngestionCoordinator, JsonlSink,
    Metadata, MetadataValue, ProgressEvent, ProgressReporter, StdoutSink, StorageSink,
};
use tokio_util::sync::CancellationToken;

use super::ChunkArgs;

/// Ingest a file or directory
#[derive(Args, Debug)]
pub struct IngestCommand {
    /// File or directory to ingest
    pub path: PathBuf,

    /// Only ingest paths matching this regex
    #[arg(long)]
    pub include: Option<String>,

    /// Skip paths matching this regex
    #[arg(long)]
    pub exclude: Option<String>,

    /// Knowledge base name recorded on every unit
    #[arg(long)]
    pub knowledge_base: Option<String>,

    /// Document type recorded on every unit
    #[arg(long)]
    pub doc_type: Option<String>,

    /// Extra metadata as key=value (repeatable)
    #[arg(long = "meta", value_parser = parse_key_value)]
    pub meta: Vec<(String, String)>,

    /// Print entries to stdout instead of writing JSON lines
    #[arg(long)]
    pub stdout: bool,

    /// JSON lines output file (default: <workspace>/.folio/units.jsonl)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Entry format for stdout (plain, markdown, json, xml)
    #[arg(long)]
    pub format: Option<String>,

    /// Documents ingested concurrently
    #[arg(long)]
    pub concurrency: Option<usize>,

    /// Print progress lines to stderr
    #[arg(long)]
    pub progress: bool,

    /// Output the run summary as JSON
    #[arg(long)]
    pub json: bool,

    #[command(flatten)]
    pub chunking: ChunkArgs,
}

impl IngestCommand {
    pub async fn execute(&self, config: AppConfig) -> AppResult<()> {
        tracing::info!("Executing ingest command for {:?}", self.path);

        let overrides = ConfigOverrides {
            concurrency: self.concurrency,
            output_sink: self.stdout.then(|| "stdout".to_string()),
            output_path: self.output.clone(),
            output_format: self.format.clone(),
            ..Default::default()
        };
        let (config, chunker) = self.chunking.build_chunker(config, overrides)?;

        let sink = open_sink(&config).await?;

        let options = DiscoverOptions::new(self.include.as_deref(), self.exclude.as_deref())?;
        let files = discover(&self.path, &options)?;
        if files.is_empty() {
            tracing::warn!("No supported documents found under {:?}", self.path);
        }

        let cancel = CancellationToken::new();
        let on_interrupt = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("Interrupted, finishing the current page");
                on_interrupt.cancel();
            }
        });

        let progress = if self.progress {
            ProgressReporter::new(Arc::new(|event: ProgressEvent| {
                eprintln!("{}", event.format_simple())
            }))
        } else {
            ProgressReporter::noop()
        };

        let coordinator = IngestionCoordinator::new(chunker, sink)
            .with_progress(progress)
            .with_cancellation(cancel)
            .with_concurrency(config.concurrency);

        let batch = coordinator.run_many(&files, &self.metadata()).await;
        coordinator.flush().await?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&batch)?);
        } else {
            for run in &batch.runs {
                eprintln!(
                    "{}: {} stored, {} skipped, {} failed{}",
                    run.document_id,
                    run.succeeded,
                    run.skipped,
                    run.failed,
                    if run.cancelled { " (cancelled)" } else { "" }
                );
            }
            for failure in &batch.errors {
                eprintln!("{:?}: {} ({})", failure.path, failure.message, failure.kind);
            }
            eprintln!(
                "Ingested {} documents: {} units stored, {} skipped, {} failed",
                batch.documents(),
                batch.succeeded(),
                batch.skipped(),
                batch.failed()
            );
        }

        Ok(())
    }

    fn metadata(&self) -> Metadata {
        let mut metadata = Metadata::new();
        if let Some(base) = &self.knowledge_base {
            metadata.insert("knowledge_base".into(), MetadataValue::from(base.as_str()));
        }
        if let Some(doc_type) = &self.doc_type {
            metadata.insert("doc_type".into(), MetadataValue::from(doc_type.as_str()));
        }
        for (key, value) in &self.meta {
            metadata.insert(key.clone(), parse_value(value));
        }
        metadata
    }
}

async fn open_sink(config: &AppConfig) -> AppResult<Arc<dyn StorageSink>> {
    match config.output.sink.as_str() {
        "stdout" => {
            let format: EntryFormat = config.output.format.parse()?;
            Ok(Arc::new(StdoutSink::new(format)))
        }
        _ => {
            let path = config.output_path();
            tracing::info!("Writing units to {:?}", path);
            Ok(Arc::new(JsonlSink::open(&path).await?))
        }
    }
}

fn parse_key_value(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{}'", raw))?;
    let key = key.trim();
    if key.is_empty() {
        return Err("metadata key must not be empty".to_string());
    }
    if key == keys::CHUNK_INDEX || key == keys::TOTAL_CHUNKS || key == keys::IS_CHUNK {
        return Err(format!("'{}' is set by the chunker", key));
    }
    Ok((key.to_string(), value.to_string()))
}

/// Integers and booleans keep their scalar type; everything else is text.
fn parse_value(raw: &str) -> MetadataValue {
    if let Ok(i) = raw.parse::<i64>() {
        return MetadataValue::Int(i);
    }
    match raw {
        "true" => MetadataValue::Bool(true),
        "false" => MetadataValue::Bool(false),
        _ => MetadataValue::from(raw),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_key_value() {
        assert_eq!(
            parse_key_value("team=search").unwrap(),
            ("team".to_string(), "search".to_string())
        );
        assert_eq!(
            parse_key_value("expr=a=b").unwrap(),
            ("expr".to_string(), "a=b".to_string())
        );
        assert!(parse_key_value("novalue").is_err());
        assert!(parse_key_value("=x").is_err());
        assert!(parse_key_value("chunk_index=3").is_err());
    }

    #[test]
    fn test_parse_value_types() {
        assert_eq!(parse_value("42"), MetadataValue::Int(42));
        assert_eq!(parse_value("true"), MetadataValue::Bool(true));
        assert_eq!(parse_value("v1.2"), MetadataValue::from("v1.2"));
    }
}
