//! Page extraction from source documents.
//!
//! A [`SourceDocument`] is opened once per run and read in ascending page
//! order. Opening and reading are blocking; the coordinator keeps both on a
//! worker thread, so implementations need not be `Send`.

pub mod memory;
mod pdf;
mod text;

pub use pdf::PdfDocument;
pub use text::{FlatDocument, TEXT_EXTENSIONS};

use std::path::Path;

use folio_core::{DocumentError, PageError};

use crate::types::PageUnit;

/// Whether a document has physical pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    /// Pages with numbering metadata
    Paginated,
    /// One content unit, no page provenance
    Flat,
}

/// Read-only handle to an opened document.
pub trait SourceDocument {
    fn kind(&self) -> DocumentKind;

    /// Number of physical pages, 0 for flat documents.
    fn page_count(&self) -> usize;

    /// Text of one page. Flat documents expose their content at index 0.
    fn page_text(&self, index: usize) -> Result<String, PageError>;

    /// Decoded label of a page, if a numbering range covers it.
    fn page_label(&self, index: usize) -> Option<String>;
}

/// Opens documents by path.
pub trait DocumentOpener: Send + Sync {
    fn open(&self, path: &Path) -> Result<Box<dyn SourceDocument>, DocumentError>;
}

/// Opens files from the local filesystem by extension.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsOpener;

impl DocumentOpener for FsOpener {
    fn open(&self, path: &Path) -> Result<Box<dyn SourceDocument>, DocumentError> {
        open_document(path)
    }
}

/// Open a `.pdf` as paginated, or a supported text file as flat.
pub fn open_document(path: &Path) -> Result<Box<dyn SourceDocument>, DocumentError> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    match extension.as_str() {
        "pdf" => Ok(Box::new(PdfDocument::open(path)?)),
        ext if TEXT_EXTENSIONS.contains(&ext) => Ok(Box::new(FlatDocument::open(path)?)),
        _ => Err(DocumentError::Unreadable {
            path: path.to_path_buf(),
            reason: format!("unsupported file type '{}'", extension),
        }),
    }
}

/// Extract one page. Failures and empty pages are logged and yield empty
/// content; the physical index is kept either way.
pub fn extract_page(document: &dyn SourceDocument, index: usize) -> PageUnit {
    let content = match document.page_text(index) {
        Ok(text) => text,
        Err(e) => {
            tracing::warn!(page = index, error = %e, "Page text unavailable, treating as empty");
            String::new()
        }
    };

    let page = PageUnit {
        physical_index: index,
        label: document.page_label(index),
        content,
        total_pages: document.page_count(),
    };

    if page.is_empty() && document.kind() == DocumentKind::Paginated {
        tracing::warn!(
            page = index,
            label = page.label.as_deref().unwrap_or(""),
            "Page has no text"
        );
    }

    page
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::memory::MemoryDocument;
    use crate::labels::{LabelRange, PageLabelStyle, PageNumbering};

    #[test]
    fn test_image_only_page_keeps_index() {
        let numbering = PageNumbering::new(vec![
            LabelRange::new(1, PageLabelStyle::LowerRoman).starting_at(4),
            LabelRange::new(2, PageLabelStyle::Decimal).starting_at(5),
        ]);
        let doc = MemoryDocument::paginated(
            vec![None, Some("Preface text".into()), Some("Body text".into())],
            numbering,
        );

        let pages: Vec<_> = (0..doc.page_count()).map(|i| extract_page(&doc, i)).collect();
        let view: Vec<(&str, Option<&str>)> = pages
            .iter()
            .map(|p| (p.content.as_str(), p.label.as_deref()))
            .collect();

        assert_eq!(
            view,
            vec![("", None), ("Preface text", Some("iv")), ("Body text", Some("5"))]
        );
        assert!(pages.iter().enumerate().all(|(i, p)| p.physical_index == i));
        assert!(pages.iter().all(|p| p.total_pages == 3));
    }

    #[test]
    fn test_unsupported_extension_is_unreadable() {
        let err = open_document(Path::new("archive.zip")).err().unwrap();
        assert_eq!(err.kind(), "unreadable");
    }

    #[test]
    fn test_missing_text_file_is_unreadable() {
        let err = open_document(Path::new("/nonexistent/notes.md")).err().unwrap();
        assert_eq!(err.kind(), "unreadable");
    }
}
