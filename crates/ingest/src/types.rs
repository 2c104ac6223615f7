//! Ingestion type definitions.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::chunk::ChunkUnit;

/// Metadata keys written on every ingested unit.
pub mod keys {
    pub const DOCUMENT_ID: &str = "document_id";
    pub const PHYSICAL_PAGE_INDEX: &str = "physical_page_index";
    pub const PAGE_LABEL: &str = "page_label";
    pub const TOTAL_PAGES: &str = "total_pages";
    pub const CHUNK_INDEX: &str = "chunk_index";
    pub const TOTAL_CHUNKS: &str = "total_chunks";
    pub const IS_CHUNK: &str = "is_chunk";
    pub const FILENAME: &str = "filename";
    pub const FILEPATH: &str = "filepath";
    pub const EXTENSION: &str = "extension";
}

/// A scalar metadata value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetadataValue {
    Bool(bool),
    Int(i64),
    Text(String),
}

impl MetadataValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            MetadataValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            MetadataValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            MetadataValue::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl fmt::Display for MetadataValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetadataValue::Bool(b) => write!(f, "{}", b),
            MetadataValue::Int(i) => write!(f, "{}", i),
            MetadataValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<bool> for MetadataValue {
    fn from(value: bool) -> Self {
        MetadataValue::Bool(value)
    }
}

impl From<i64> for MetadataValue {
    fn from(value: i64) -> Self {
        MetadataValue::Int(value)
    }
}

impl From<usize> for MetadataValue {
    fn from(value: usize) -> Self {
        MetadataValue::Int(i64::try_from(value).unwrap_or(i64::MAX))
    }
}

impl From<&str> for MetadataValue {
    fn from(value: &str) -> Self {
        MetadataValue::Text(value.to_string())
    }
}

impl From<String> for MetadataValue {
    fn from(value: String) -> Self {
        MetadataValue::Text(value)
    }
}

/// Flat metadata map. Ordered so serialized units are byte-stable across runs.
pub type Metadata = BTreeMap<String, MetadataValue>;

/// One physical page of a paginated document, or the single content unit of
/// a flat document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageUnit {
    /// 0-based position in the document, gap-free
    pub physical_index: usize,

    /// Decoded page label, absent when no numbering range covers the page
    pub label: Option<String>,

    /// Extracted text, empty for image-only or unextractable pages
    pub content: String,

    /// Page count of the document, 0 for flat documents
    pub total_pages: usize,
}

impl PageUnit {
    /// Label for presentation: the decoded label, or `Page N` (1-based).
    pub fn display_label(&self) -> String {
        display_label(self.label.as_deref(), self.physical_index)
    }

    pub fn is_empty(&self) -> bool {
        self.content.trim().is_empty()
    }
}

/// Presentation label with the `Page N` fallback.
pub fn display_label(label: Option<&str>, physical_index: usize) -> String {
    match label.map(str::trim) {
        Some(label) if !label.is_empty() => label.to_string(),
        _ => format!("Page {}", physical_index + 1),
    }
}

/// Final record handed to the storage sink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestedUnit {
    pub text: String,
    pub metadata: Metadata,
}

impl IngestedUnit {
    /// Merge base, page and chunk provenance. Later layers win on key collisions.
    pub fn new(base: &Metadata, page: Option<(&str, &PageUnit)>, chunk: ChunkUnit) -> Self {
        let mut metadata = base.clone();

        if let Some((document_id, page)) = page {
            metadata.insert(keys::DOCUMENT_ID.into(), document_id.into());
            metadata.insert(keys::PHYSICAL_PAGE_INDEX.into(), page.physical_index.into());
            if let Some(label) = &page.label {
                metadata.insert(keys::PAGE_LABEL.into(), label.as_str().into());
            }
            metadata.insert(keys::TOTAL_PAGES.into(), page.total_pages.into());
        }

        metadata.insert(keys::CHUNK_INDEX.into(), chunk.chunk_index.into());
        metadata.insert(keys::TOTAL_CHUNKS.into(), chunk.total_chunks.into());
        metadata.insert(keys::IS_CHUNK.into(), chunk.is_chunk.into());

        Self {
            text: chunk.text,
            metadata,
        }
    }

    pub fn get(&self, key: &str) -> Option<&MetadataValue> {
        self.metadata.get(key)
    }

    pub fn document_id(&self) -> Option<&str> {
        self.get(keys::DOCUMENT_ID).and_then(MetadataValue::as_str)
    }

    pub fn physical_page_index(&self) -> Option<usize> {
        self.get(keys::PHYSICAL_PAGE_INDEX)
            .and_then(MetadataValue::as_i64)
            .and_then(|i| usize::try_from(i).ok())
    }

    pub fn page_label(&self) -> Option<&str> {
        self.get(keys::PAGE_LABEL).and_then(MetadataValue::as_str)
    }

    pub fn chunk_index(&self) -> Option<usize> {
        self.get(keys::CHUNK_INDEX)
            .and_then(MetadataValue::as_i64)
            .and_then(|i| usize::try_from(i).ok())
    }

    pub fn is_paginated(&self) -> bool {
        self.get(keys::PHYSICAL_PAGE_INDEX).is_some()
    }
}

/// Tally for one document run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    /// Document identifier (file name)
    pub document_id: String,

    /// Units accepted by the sink
    pub succeeded: u32,

    /// Content units skipped because they had no text
    pub skipped: u32,

    /// Units the sink refused
    pub failed: u32,

    /// Content units visited (pages, or 1 for flat documents)
    pub content_units: u32,

    /// The run stopped early on cancellation
    pub cancelled: bool,
}

impl RunReport {
    pub fn new(document_id: impl Into<String>) -> Self {
        Self {
            document_id: document_id.into(),
            ..Default::default()
        }
    }
}

/// Aggregate over several document runs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchReport {
    /// Per-document tallies, in input order
    pub runs: Vec<RunReport>,

    /// Documents that could not be opened
    pub errors: Vec<DocumentFailure>,
}

/// A document whose run aborted before producing any unit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentFailure {
    pub path: PathBuf,
    pub kind: String,
    pub message: String,
}

impl BatchReport {
    pub fn succeeded(&self) -> u32 {
        self.runs.iter().map(|r| r.succeeded).sum()
    }

    pub fn skipped(&self) -> u32 {
        self.runs.iter().map(|r| r.skipped).sum()
    }

    pub fn failed(&self) -> u32 {
        self.runs.iter().map(|r| r.failed).sum()
    }

    pub fn documents(&self) -> usize {
        self.runs.len() + self.errors.len()
    }
}
