use shared::types::{RagError, Result};
use shared::utils::is_supported_document;
use std::path::Path;

/// Plain text of one source page, as handed over by the extraction layer.
#[derive(Debug, Clone)]
pub struct PageText {
    pub text: String,
    /// 1-indexed page number.
    pub page: u32,
}

/// Turns a document file into per-page plain text. PDF pages keep their
/// real page numbers; plain-text files load as a single page 1.
pub struct DocumentLoader;

impl DocumentLoader {
    pub fn new() -> Self {
        Self
    }

    pub fn load(&self, path: &Path) -> Result<Vec<PageText>> {
        if !is_supported_document(path) {
            return Err(RagError::UnreadableDocument {
                path: path.display().to_string(),
                reason: "unsupported format (expected .pdf, .txt or .md)".to_string(),
            });
        }
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "pdf" => self.load_pdf(path),
            _ => self.load_plain_text(path),
        }
    }

    fn load_pdf(&self, path: &Path) -> Result<Vec<PageText>> {
        let pages = pdf_extract::extract_text_by_pages(path).map_err(|e| {
            RagError::UnreadableDocument {
                path: path.display().to_string(),
                reason: e.to_string(),
            }
        })?;
        Ok(pages
            .into_iter()
            .enumerate()
            .map(|(i, text)| PageText {
                text,
                page: i as u32 + 1,
            })
            .collect())
    }

    fn load_plain_text(&self, path: &Path) -> Result<Vec<PageText>> {
        let text =
            std::fs::read_to_string(path).map_err(|e| RagError::UnreadableDocument {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;
        Ok(vec![PageText { text, page: 1 }])
    }
}

impl Default for DocumentLoader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn missing_file_is_unreadable() {
        let loader = DocumentLoader::new();
        let err = loader.load(&PathBuf::from("does-not-exist.txt")).unwrap_err();
        assert!(matches!(err, RagError::UnreadableDocument { .. }));
    }

    #[test]
    fn unsupported_extension_is_unreadable() {
        let loader = DocumentLoader::new();
        let err = loader.load(&PathBuf::from("report.xlsx")).unwrap_err();
        assert!(matches!(err, RagError::UnreadableDocument { .. }));
    }
}
