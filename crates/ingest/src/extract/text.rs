//! Flat text documents.

use std::fs;
use std::path::Path;

use folio_core::{DocumentError, PageError};

use super::{DocumentKind, SourceDocument};

/// Extensions read as flat UTF-8 text.
pub const TEXT_EXTENSIONS: &[&str] = &[
    "txt", "md", "markdown", "py", "js", "ts", "tsx", "jsx", "java", "go", "rs", "c", "cpp", "h",
    "hpp", "rb", "php", "sh", "bash", "json", "yaml", "yml", "toml", "xml", "ini", "env", "html",
    "css", "scss", "csv", "sql",
];

/// A whole text file as one content unit.
#[derive(Debug, Clone)]
pub struct FlatDocument {
    content: String,
}

impl FlatDocument {
    pub fn open(path: &Path) -> Result<Self, DocumentError> {
        let bytes = fs::read(path).map_err(|e| DocumentError::Unreadable {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        if bytes.contains(&0) {
            return Err(DocumentError::Corrupted {
                path: path.to_path_buf(),
                reason: "binary content in text file".to_string(),
            });
        }

        Ok(Self::from_text(String::from_utf8_lossy(&bytes).into_owned()))
    }

    pub fn from_text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }
}

impl SourceDocument for FlatDocument {
    fn kind(&self) -> DocumentKind {
        DocumentKind::Flat
    }

    fn page_count(&self) -> usize {
        0
    }

    fn page_text(&self, index: usize) -> Result<String, PageError> {
        if index != 0 {
            return Err(PageError::Unextractable {
                index,
                reason: "flat documents have a single content unit".to_string(),
            });
        }
        Ok(self.content.clone())
    }

    fn page_label(&self, _index: usize) -> Option<String> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_reads_utf8_lossy() {
        let mut file = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
        file.write_all(b"caf\xc3\xa9 and \xff bytes").unwrap();

        let doc = FlatDocument::open(file.path()).unwrap();
        assert_eq!(doc.kind(), DocumentKind::Flat);
        assert_eq!(doc.page_count(), 0);
        let text = doc.page_text(0).unwrap();
        assert!(text.starts_with("café and "));
        assert!(text.contains('\u{FFFD}'));
    }

    #[test]
    fn test_nul_bytes_are_corrupted() {
        let mut file = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
        file.write_all(b"abc\0def").unwrap();

        let err = FlatDocument::open(file.path()).unwrap_err();
        assert_eq!(err.kind(), "corrupted");
    }

    #[test]
    fn test_only_index_zero_exists() {
        let doc = FlatDocument::from_text("body");
        assert!(doc.page_text(1).is_err());
        assert_eq!(doc.page_label(0), None);
    }
}
