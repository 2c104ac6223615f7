//! Inspect command handler.

use std::path::PathBuf;

use clap::Args;
use folio_core::{config::AppConfig, AppError, AppResult, ConfigOverrides};
use folio_ingest::{extract::extract_page, open_document, DocumentKind};
use serde::Serialize;

use super::ChunkArgs;

/// Show pages, labels and chunk boundaries of one document
#[derive(Args, Debug)]
pub struct InspectCommand {
    /// Document to inspect
    pub path: PathBuf,

    /// Print each chunk's text
    #[arg(long)]
    pub show_text: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    #[command(flatten)]
    pub chunking: ChunkArgs,
}

#[derive(Debug, Serialize)]
struct DocumentSummary {
    path: PathBuf,
    paginated: bool,
    pages: Vec<PageSummary>,
}

#[derive(Debug, Serialize)]
struct PageSummary {
    physical_index: usize,
    label: Option<String>,
    display_label: String,
    chars: usize,
    chunks: Vec<ChunkSummary>,
}

#[derive(Debug, Serialize)]
struct ChunkSummary {
    chunk_index: usize,
    byte_range: (usize, usize),
    overlap_len: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

impl InspectCommand {
    pub async fn execute(&self, config: AppConfig) -> AppResult<()> {
        tracing::info!("Executing inspect command for {:?}", self.path);

        let (_, chunker) = self
            .chunking
            .build_chunker(config, ConfigOverrides::default())?;
        let path = self.path.clone();
        let show_text = self.show_text;

        let summary = tokio::task::spawn_blocking(move || -> AppResult<DocumentSummary> {
            let document = open_document(&path)?;
            let paginated = document.kind() == DocumentKind::Paginated;
            let count = if paginated { document.page_count() } else { 1 };

            let pages = (0..count)
                .map(|index| {
                    let page = extract_page(document.as_ref(), index);
                    let chunks = chunker
                        .split(&page.content)
                        .into_iter()
                        .map(|chunk| ChunkSummary {
                            chunk_index: chunk.chunk_index,
                            byte_range: chunk.byte_range,
                            overlap_len: chunk.overlap_len,
                            text: show_text.then_some(chunk.text),
                        })
                        .collect();
                    PageSummary {
                        physical_index: page.physical_index,
                        display_label: page.display_label(),
                        label: page.label,
                        chars: page.content.chars().count(),
                        chunks,
                    }
                })
                .collect();

            Ok(DocumentSummary {
                path,
                paginated,
                pages,
            })
        })
        .await
        .map_err(|e| AppError::Other(format!("inspect worker failed: {}", e)))??;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&summary)?);
            return Ok(());
        }

        println!("{}", summary.path.display());
        if !summary.paginated {
            println!("  flat document");
        }
        for page in &summary.pages {
            if summary.paginated {
                println!(
                    "  page {} (physical {}): {} chars, {} chunks",
                    page.display_label,
                    page.physical_index + 1,
                    page.chars,
                    page.chunks.len()
                );
            } else {
                println!("  {} chars, {} chunks", page.chars, page.chunks.len());
            }
            for chunk in &page.chunks {
                println!(
                    "    [{}] bytes {}..{} overlap {}",
                    chunk.chunk_index, chunk.byte_range.0, chunk.byte_range.1, chunk.overlap_len
                );
                if let Some(text) = &chunk.text {
                    println!("{}", text);
                }
            }
        }

        Ok(())
    }
}
