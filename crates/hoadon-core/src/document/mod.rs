//! Document text module: turns an uploaded document into per-page text.

mod pdf;

pub use pdf::PdfDocument;

use std::path::Path;

use tracing::debug;

use crate::error::DocumentError;

/// Result type for document operations.
pub type Result<T> = std::result::Result<T, DocumentError>;

/// Anything that can yield ordered per-page plain text.
///
/// An unreadable page yields an empty string rather than an error.
pub trait DocumentSource {
    /// Number of pages in the document.
    fn page_count(&self) -> usize;

    /// Text of every page, in order.
    fn page_texts(&self) -> Result<Vec<String>>;

    /// Read the whole document.
    fn read(&self) -> Result<RawDocumentText> {
        Ok(RawDocumentText::from_pages(self.page_texts()?))
    }
}

/// The text of one document: its pages, and their concatenation with a
/// line break after each page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawDocumentText {
    pages: Vec<String>,
    text: String,
}

impl RawDocumentText {
    pub fn from_pages(pages: Vec<String>) -> Self {
        let mut text = String::with_capacity(pages.iter().map(|p| p.len() + 1).sum());
        for page in &pages {
            text.push_str(page);
            text.push('\n');
        }
        Self { pages, text }
    }

    pub fn pages(&self) -> &[String] {
        &self.pages
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// No readable text on any page.
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// A plain-text document. Form feeds (`\x0c`) separate pages.
#[derive(Debug, Clone)]
pub struct PlainTextDocument {
    content: String,
}

impl PlainTextDocument {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }

    pub fn open(path: &Path) -> Result<Self> {
        Ok(Self::new(std::fs::read_to_string(path)?))
    }
}

impl DocumentSource for PlainTextDocument {
    fn page_count(&self) -> usize {
        self.content.split('\x0c').count()
    }

    fn page_texts(&self) -> Result<Vec<String>> {
        Ok(self.content.split('\x0c').map(str::to_string).collect())
    }
}

/// Open a document by file extension (`.pdf`, `.txt`) and read its text.
///
/// `max_pages` of 0 reads every page.
pub fn load_document(path: &Path, max_pages: usize) -> Result<RawDocumentText> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    let mut document = match extension.as_str() {
        "pdf" => {
            let data = std::fs::read(path)?;
            PdfDocument::from_bytes(&data)?.with_max_pages(max_pages).read()?
        }
        "txt" | "text" => PlainTextDocument::open(path)?.read()?,
        _ => return Err(DocumentError::Unsupported(extension)),
    };

    if max_pages > 0 && document.pages.len() > max_pages {
        document = RawDocumentText::from_pages(document.pages.into_iter().take(max_pages).collect());
    }

    debug!(
        "Read {} pages ({} chars) from {}",
        document.pages.len(),
        document.text.len(),
        path.display()
    );
    Ok(document)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_pages_joined_with_trailing_newline() {
        let doc = RawDocumentText::from_pages(vec!["Trang 1".to_string(), String::new(), "Trang 3".to_string()]);
        assert_eq!(doc.text(), "Trang 1\n\nTrang 3\n");
        assert_eq!(doc.pages().len(), 3);
    }

    #[test]
    fn test_empty_document_is_blank_not_error() {
        let doc = PlainTextDocument::new("").read().unwrap();
        assert!(doc.is_blank());
        assert_eq!(doc.text(), "\n");
    }

    #[test]
    fn test_form_feed_splits_pages() {
        let doc = PlainTextDocument::new("một\x0chai");
        assert_eq!(doc.page_count(), 2);
        assert_eq!(doc.read().unwrap().pages(), &["một".to_string(), "hai".to_string()]);
    }

    #[test]
    fn test_load_document_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hd.txt");
        fs::write(&path, "a\x0cb\x0cc").unwrap();

        let doc = load_document(&path, 2).unwrap();
        assert_eq!(doc.text(), "a\nb\n");

        let bad = dir.path().join("hd.docx");
        fs::write(&bad, "x").unwrap();
        assert!(matches!(load_document(&bad, 0), Err(DocumentError::Unsupported(_))));
    }

    #[test]
    fn test_garbage_pdf_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.pdf");
        fs::write(&path, b"not a pdf at all").unwrap();

        assert!(matches!(load_document(&path, 0), Err(DocumentError::Parse(_))));
    }
}
