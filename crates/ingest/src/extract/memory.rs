//! In-memory documents for tests and embedding callers.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use folio_core::{DocumentError, PageError};

use super::{DocumentKind, DocumentOpener, SourceDocument};
use crate::labels::PageNumbering;

/// A document held in memory. A `None` page has no extractable text.
#[derive(Debug, Clone)]
pub struct MemoryDocument {
    kind: DocumentKind,
    pages: Vec<Option<String>>,
    numbering: PageNumbering,
}

impl MemoryDocument {
    pub fn paginated(pages: Vec<Option<String>>, numbering: PageNumbering) -> Self {
        Self {
            kind: DocumentKind::Paginated,
            pages,
            numbering,
        }
    }

    pub fn flat(text: impl Into<String>) -> Self {
        Self {
            kind: DocumentKind::Flat,
            pages: vec![Some(text.into())],
            numbering: PageNumbering::default(),
        }
    }
}

impl SourceDocument for MemoryDocument {
    fn kind(&self) -> DocumentKind {
        self.kind
    }

    fn page_count(&self) -> usize {
        match self.kind {
            DocumentKind::Paginated => self.pages.len(),
            DocumentKind::Flat => 0,
        }
    }

    fn page_text(&self, index: usize) -> Result<String, PageError> {
        match self.pages.get(index) {
            Some(Some(text)) => Ok(text.clone()),
            Some(None) => Err(PageError::Unextractable {
                index,
                reason: "no text layer".to_string(),
            }),
            None => Err(PageError::Unextractable {
                index,
                reason: "page out of range".to_string(),
            }),
        }
    }

    fn page_label(&self, index: usize) -> Option<String> {
        self.numbering.label_for(index)
    }
}

/// Opener serving registered in-memory documents by path.
#[derive(Debug, Clone, Default)]
pub struct MemoryOpener {
    documents: HashMap<PathBuf, MemoryDocument>,
}

impl MemoryOpener {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(mut self, path: impl Into<PathBuf>, document: MemoryDocument) -> Self {
        self.documents.insert(path.into(), document);
        self
    }
}

impl DocumentOpener for MemoryOpener {
    fn open(&self, path: &Path) -> Result<Box<dyn SourceDocument>, DocumentError> {
        self.documents
            .get(path)
            .cloned()
            .map(|doc| Box::new(doc) as Box<dyn SourceDocument>)
            .ok_or_else(|| DocumentError::Unreadable {
                path: path.to_path_buf(),
                reason: "no such document".to_string(),
            })
    }
}
