//! Presentation of ingested units as citations.

use std::fmt;
use std::str::FromStr;

use folio_core::AppError;
use serde_json::json;

use crate::types::{display_label, IngestedUnit};

/// Output format for a single unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EntryFormat {
    #[default]
    Plain,
    Markdown,
    Json,
    Xml,
}

impl EntryFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryFormat::Plain => "plain",
            EntryFormat::Markdown => "markdown",
            EntryFormat::Json => "json",
            EntryFormat::Xml => "xml",
        }
    }
}

impl fmt::Display for EntryFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntryFormat {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "plain" | "text" => Ok(EntryFormat::Plain),
            "markdown" | "md" => Ok(EntryFormat::Markdown),
            "json" => Ok(EntryFormat::Json),
            "xml" => Ok(EntryFormat::Xml),
            other => Err(AppError::Config(format!(
                "Unknown output format '{}'. Supported: plain, markdown, json, xml",
                other
            ))),
        }
    }
}

/// Page citation of a paginated unit, `None` for flat units.
///
/// Reads `Document: book.pdf, Page iv (physical page 7)`; an unlabeled page
/// falls back to `Page 7`.
pub fn page_citation(unit: &IngestedUnit) -> Option<String> {
    let index = unit.physical_page_index()?;
    let document = unit.document_id().unwrap_or("unknown");
    Some(format!(
        "Document: {}, {} (physical page {})",
        document,
        citation_label(unit.page_label(), index),
        index + 1
    ))
}

fn citation_label(label: Option<&str>, index: usize) -> String {
    match label {
        Some(label) if !label.trim().is_empty() => format!("Page {}", label.trim()),
        _ => display_label(None, index),
    }
}

/// Render a unit in the given format.
pub fn format_unit(unit: &IngestedUnit, format: EntryFormat) -> String {
    let citation = page_citation(unit);

    match format {
        EntryFormat::Plain => match citation {
            Some(citation) => format!("--- {} ---\n{}\n--- End Entry ---", citation, unit.text),
            None => format!("--- Entry ---\n{}\n--- End Entry ---", unit.text),
        },
        EntryFormat::Markdown => match citation {
            Some(citation) => format!("## {}\n\n{}\n\n---\n", citation, unit.text),
            None => format!("## Entry\n\n{}\n\n---\n", unit.text),
        },
        EntryFormat::Json => {
            let mut value = json!({
                "content": unit.text,
                "metadata": unit.metadata,
            });
            if let Some(index) = unit.physical_page_index() {
                value["page_info"] = json!({
                    "document_id": unit.document_id(),
                    "page_label": unit.page_label(),
                    "physical_page_index": index,
                    "display_label": display_label(unit.page_label(), index),
                });
            }
            serde_json::to_string_pretty(&value).unwrap_or_default()
        }
        EntryFormat::Xml => {
            let metadata = serde_json::to_string(&unit.metadata).unwrap_or_default();
            let page = citation
                .map(|c| format!("<page>{}</page>", escape_xml(&c)))
                .unwrap_or_default();
            format!(
                "<entry><content>{}</content>{}<metadata>{}</metadata></entry>",
                escape_xml(&unit.text),
                page,
                escape_xml(&metadata)
            )
        }
    }
}

fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk::ChunkUnit;
    use crate::types::{Metadata, PageUnit};

    fn unit(label: Option<&str>, paginated: bool) -> IngestedUnit {
        let page = PageUnit {
            physical_index: 6,
            label: label.map(str::to_string),
            content: "Body <b> & more".to_string(),
            total_pages: 10,
        };
        let chunk = ChunkUnit {
            chunk_index: 0,
            total_chunks: 1,
            text: page.content.clone(),
            is_chunk: false,
            overlap_len: 0,
            byte_range: (0, page.content.len()),
        };
        let provenance = paginated.then_some(("book.pdf", &page));
        IngestedUnit::new(&Metadata::new(), provenance, chunk)
    }

    #[test]
    fn test_citation_uses_label() {
        let citation = page_citation(&unit(Some("iv"), true)).unwrap();
        assert_eq!(citation, "Document: book.pdf, Page iv (physical page 7)");
    }

    #[test]
    fn test_citation_falls_back_to_physical_page() {
        let citation = page_citation(&unit(None, true)).unwrap();
        assert_eq!(citation, "Document: book.pdf, Page 7 (physical page 7)");
    }

    #[test]
    fn test_flat_unit_has_no_citation() {
        let unit = unit(None, false);
        assert!(page_citation(&unit).is_none());
        assert!(format_unit(&unit, EntryFormat::Plain).starts_with("--- Entry ---"));
    }

    #[test]
    fn test_xml_escapes_content() {
        let xml = format_unit(&unit(Some("iv"), true), EntryFormat::Xml);
        assert!(xml.contains("<content>Body &lt;b&gt; &amp; more</content>"));
        assert!(xml.contains("<page>Document: book.pdf, Page iv (physical page 7)</page>"));
    }

    #[test]
    fn test_json_carries_page_info() {
        let rendered = format_unit(&unit(None, true), EntryFormat::Json);
        let value: serde_json::Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(value["page_info"]["physical_page_index"], 6);
        assert_eq!(value["page_info"]["display_label"], "Page 7");
        assert!(value["page_info"]["page_label"].is_null());
    }

    #[test]
    fn test_parse_format() {
        assert_eq!("Markdown".parse::<EntryFormat>().unwrap(), EntryFormat::Markdown);
        assert!("yaml".parse::<EntryFormat>().is_err());
    }
}
