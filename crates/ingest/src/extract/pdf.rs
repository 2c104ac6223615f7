//! Paginated PDF documents backed by lopdf.

use std::fs;
use std::path::{Path, PathBuf};

use folio_core::{DocumentError, PageError};
use lopdf::{Dictionary, Document, Object};

use super::{DocumentKind, SourceDocument};
use crate::labels::{LabelRange, PageLabelStyle, PageNumbering};

/// Maximum nesting of a `/PageLabels` number tree.
const MAX_TREE_DEPTH: usize = 32;

/// An opened PDF with its decoded page numbering.
pub struct PdfDocument {
    path: PathBuf,
    document: Document,
    /// 1-based PDF page numbers in physical order
    pages: Vec<u32>,
    numbering: PageNumbering,
}

impl PdfDocument {
    pub fn open(path: &Path) -> Result<Self, DocumentError> {
        let bytes = fs::read(path).map_err(|e| DocumentError::Unreadable {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Self::from_bytes(path, &bytes)
    }

    /// Parse an in-memory PDF. `path` is only used for error context.
    pub fn from_bytes(path: &Path, bytes: &[u8]) -> Result<Self, DocumentError> {
        let document = match Document::load_mem(bytes) {
            Ok(document) => document,
            Err(_) if contains(bytes, b"/Encrypt") => {
                return Err(DocumentError::Encrypted {
                    path: path.to_path_buf(),
                })
            }
            Err(e) => {
                return Err(DocumentError::Corrupted {
                    path: path.to_path_buf(),
                    reason: e.to_string(),
                })
            }
        };

        if document.trailer.get(b"Encrypt").is_ok() {
            return Err(DocumentError::Encrypted {
                path: path.to_path_buf(),
            });
        }

        let pages: Vec<u32> = document.get_pages().into_keys().collect();
        let numbering = match read_page_labels(&document) {
            Ok(numbering) => numbering,
            Err(reason) => {
                tracing::warn!(path = ?path, %reason, "Ignoring malformed page labels");
                PageNumbering::default()
            }
        };

        tracing::debug!(
            path = ?path,
            pages = pages.len(),
            label_ranges = numbering.ranges().len(),
            "Opened PDF"
        );

        Ok(Self {
            path: path.to_path_buf(),
            document,
            pages,
            numbering,
        })
    }

    pub fn numbering(&self) -> &PageNumbering {
        &self.numbering
    }
}

impl SourceDocument for PdfDocument {
    fn kind(&self) -> DocumentKind {
        DocumentKind::Paginated
    }

    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn page_text(&self, index: usize) -> Result<String, PageError> {
        let page_number = self.pages.get(index).ok_or_else(|| PageError::Unextractable {
            index,
            reason: format!("{:?} has {} pages", self.path, self.pages.len()),
        })?;

        self.document
            .extract_text(&[*page_number])
            .map_err(|e| PageError::Unextractable {
                index,
                reason: e.to_string(),
            })
    }

    fn page_label(&self, index: usize) -> Option<String> {
        self.numbering.label_for(index)
    }
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|w| w == needle)
}

/// Follow references until a direct object is reached.
fn resolve<'a>(document: &'a Document, object: &'a Object) -> Option<&'a Object> {
    let mut current = object;
    for _ in 0..MAX_TREE_DEPTH {
        match current {
            Object::Reference(id) => current = document.get_object(*id).ok()?,
            other => return Some(other),
        }
    }
    None
}

fn as_dict<'a>(document: &'a Document, object: &'a Object) -> Option<&'a Dictionary> {
    match resolve(document, object)? {
        Object::Dictionary(dict) => Some(dict),
        Object::Stream(stream) => Some(&stream.dict),
        _ => None,
    }
}

fn as_array<'a>(document: &'a Document, object: &'a Object) -> Option<&'a [Object]> {
    match resolve(document, object)? {
        Object::Array(items) => Some(items),
        _ => None,
    }
}

fn as_integer(document: &Document, object: &Object) -> Option<i64> {
    match resolve(document, object)? {
        Object::Integer(value) => Some(*value),
        _ => None,
    }
}

/// Read the catalog's `/PageLabels` number tree. A document without one has
/// an empty numbering.
fn read_page_labels(document: &Document) -> Result<PageNumbering, String> {
    let catalog = document
        .trailer
        .get(b"Root")
        .ok()
        .and_then(|root| as_dict(document, root))
        .ok_or("missing document catalog")?;

    let Ok(tree) = catalog.get(b"PageLabels") else {
        return Ok(PageNumbering::default());
    };
    let tree = as_dict(document, tree).ok_or("/PageLabels is not a dictionary")?;

    let mut ranges = Vec::new();
    collect_ranges(document, tree, 0, &mut ranges)?;
    Ok(PageNumbering::new(ranges))
}

fn collect_ranges(
    document: &Document,
    node: &Dictionary,
    depth: usize,
    ranges: &mut Vec<LabelRange>,
) -> Result<(), String> {
    if depth > MAX_TREE_DEPTH {
        return Err("page label tree too deep".to_string());
    }

    if let Ok(nums) = node.get(b"Nums") {
        let nums = as_array(document, nums).ok_or("/Nums is not an array")?;
        for pair in nums.chunks(2) {
            let [key, value] = pair else {
                return Err("odd-length /Nums array".to_string());
            };
            let start = as_integer(document, key)
                .and_then(|k| usize::try_from(k).ok())
                .ok_or("non-integer page label key")?;
            let entry = as_dict(document, value).ok_or("page label entry is not a dictionary")?;
            ranges.push(label_range(document, start, entry));
        }
    }

    if let Ok(kids) = node.get(b"Kids") {
        let kids = as_array(document, kids).ok_or("/Kids is not an array")?;
        for kid in kids {
            let kid = as_dict(document, kid).ok_or("page label kid is not a dictionary")?;
            collect_ranges(document, kid, depth + 1, ranges)?;
        }
    }

    Ok(())
}

/// Build a range from a page label dictionary (`/S`, `/P`, `/St`).
fn label_range(document: &Document, start: usize, entry: &Dictionary) -> LabelRange {
    let style = match entry.get(b"S").ok().and_then(|s| resolve(document, s)) {
        Some(Object::Name(name)) => PageLabelStyle::from_pdf_name(name),
        _ => PageLabelStyle::NoStyle,
    };

    let prefix = match entry.get(b"P").ok().and_then(|p| resolve(document, p)) {
        Some(Object::String(bytes, _)) => decode_text_string(bytes),
        _ => String::new(),
    };

    let first_ordinal = entry
        .get(b"St")
        .ok()
        .and_then(|st| as_integer(document, st))
        .and_then(|st| usize::try_from(st).ok())
        .filter(|&st| st >= 1)
        .unwrap_or(1);

    LabelRange {
        start,
        style,
        prefix,
        first_ordinal,
    }
}

/// PDF text strings are UTF-16BE with a byte order mark, or single-byte.
fn decode_text_string(bytes: &[u8]) -> String {
    match bytes {
        [0xFE, 0xFF, rest @ ..] => {
            let units: Vec<u16> = rest
                .chunks_exact(2)
                .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
                .collect();
            String::from_utf16_lossy(&units)
        }
        _ => bytes.iter().map(|&b| char::from(b)).collect(),
    }
}
