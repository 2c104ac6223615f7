//! Source discovery.

use std::path::{Path, PathBuf};

use folio_core::{AppError, AppResult};
use regex::Regex;
use walkdir::WalkDir;

use crate::extract::TEXT_EXTENSIONS;

/// Include/exclude filters applied to full paths.
#[derive(Debug, Clone, Default)]
pub struct DiscoverOptions {
    include: Option<Regex>,
    exclude: Option<Regex>,
}

impl DiscoverOptions {
    pub fn new(include: Option<&str>, exclude: Option<&str>) -> AppResult<Self> {
        Ok(Self {
            include: include.map(|p| compile("include", p)).transpose()?,
            exclude: exclude.map(|p| compile("exclude", p)).transpose()?,
        })
    }

    fn accepts(&self, path: &Path) -> bool {
        let text = path.to_string_lossy();
        if let Some(include) = &self.include {
            if !include.is_match(&text) {
                return false;
            }
        }
        if let Some(exclude) = &self.exclude {
            if exclude.is_match(&text) {
                return false;
            }
        }
        true
    }
}

fn compile(which: &str, pattern: &str) -> AppResult<Regex> {
    Regex::new(pattern)
        .map_err(|e| AppError::Config(format!("Invalid {} pattern '{}': {}", which, pattern, e)))
}

/// Whether `path` has an extension the extractor can open.
pub fn is_supported(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| {
            let e = e.to_ascii_lowercase();
            e == "pdf" || TEXT_EXTENSIONS.contains(&e.as_str())
        })
        .unwrap_or(false)
}

/// Collect ingestible files under `path`, sorted.
///
/// A single file is returned as-is, without extension or pattern checks.
pub fn discover(path: &Path, options: &DiscoverOptions) -> AppResult<Vec<PathBuf>> {
    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }
    if !path.is_dir() {
        return Err(AppError::Config(format!("Path not found: {:?}", path)));
    }

    let mut files: Vec<PathBuf> = WalkDir::new(path)
        .follow_links(false)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| is_supported(p) && options.accepts(p))
        .collect();
    files.sort();

    tracing::info!(path = ?path, files = files.len(), "Discovery complete");
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn fixture() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("docs/drafts")).unwrap();
        fs::write(dir.path().join("docs/guide.md"), "# Guide").unwrap();
        fs::write(dir.path().join("docs/drafts/wip.md"), "wip").unwrap();
        fs::write(dir.path().join("docs/book.PDF"), "%PDF").unwrap();
        fs::write(dir.path().join("docs/image.png"), [0u8, 1, 2]).unwrap();
        fs::write(dir.path().join("main.rs"), "fn main() {}").unwrap();
        dir
    }

    fn names(root: &Path, files: &[PathBuf]) -> Vec<String> {
        files
            .iter()
            .map(|f| f.strip_prefix(root).unwrap().to_string_lossy().replace('\\', "/"))
            .collect()
    }

    #[test]
    fn test_discovers_supported_sorted() {
        let dir = fixture();
        let files = discover(dir.path(), &DiscoverOptions::default()).unwrap();
        assert_eq!(
            names(dir.path(), &files),
            vec!["docs/book.PDF", "docs/drafts/wip.md", "docs/guide.md", "main.rs"]
        );
    }

    #[test]
    fn test_include_and_exclude() {
        let dir = fixture();
        let options = DiscoverOptions::new(Some(r"\.md$"), Some("drafts")).unwrap();
        let files = discover(dir.path(), &options).unwrap();
        assert_eq!(names(dir.path(), &files), vec!["docs/guide.md"]);
    }

    #[test]
    fn test_single_file_bypasses_filters() {
        let dir = fixture();
        let image = dir.path().join("docs/image.png");
        let options = DiscoverOptions::new(Some("nothing"), None).unwrap();
        assert_eq!(discover(&image, &options).unwrap(), vec![image]);
    }

    #[test]
    fn test_invalid_pattern_is_config_error() {
        let err = DiscoverOptions::new(Some("(unclosed"), None).unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }

    #[test]
    fn test_missing_path() {
        assert!(discover(Path::new("/nonexistent/folio"), &DiscoverOptions::default()).is_err());
    }
}
