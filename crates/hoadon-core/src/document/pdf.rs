//! PDF text extraction using lopdf and pdf-extract.

use lopdf::Document;
use tracing::{debug, warn};

use super::{DocumentSource, Result};
use crate::error::DocumentError;

/// A loaded PDF whose text layer can be read page by page.
pub struct PdfDocument {
    document: Document,
    raw_data: Vec<u8>,
    max_pages: usize,
}

impl PdfDocument {
    /// Load a PDF from bytes. Empty-password encryption is removed.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let mut document =
            Document::load_mem(data).map_err(|e| DocumentError::Parse(e.to_string()))?;

        let raw_data = if document.is_encrypted() {
            if document.decrypt("").is_err() {
                return Err(DocumentError::Encrypted);
            }
            debug!("Decrypted PDF with empty password");

            // pdf-extract works on bytes, so keep the decrypted copy
            let mut decrypted = Vec::new();
            document
                .save_to(&mut decrypted)
                .map_err(|e| DocumentError::Parse(format!("failed to save decrypted PDF: {}", e)))?;
            decrypted
        } else {
            data.to_vec()
        };

        if document.get_pages().is_empty() {
            return Err(DocumentError::NoPages);
        }

        debug!("Loaded PDF with {} pages", document.get_pages().len());
        Ok(Self {
            document,
            raw_data,
            max_pages: 0,
        })
    }

    /// Read at most `max_pages` pages (0 = all).
    pub fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.max_pages = max_pages;
        self
    }

    fn page_limit(&self) -> usize {
        let count = self.page_count();
        if self.max_pages == 0 {
            count
        } else {
            count.min(self.max_pages)
        }
    }

    /// Whole-document extraction, used when no page yields text on its own.
    fn extract_whole_text(&self) -> Result<String> {
        pdf_extract::extract_text_from_mem(&self.raw_data)
            .map_err(|e| DocumentError::TextExtraction(e.to_string()))
    }
}

impl DocumentSource for PdfDocument {
    fn page_count(&self) -> usize {
        self.document.get_pages().len()
    }

    fn page_texts(&self) -> Result<Vec<String>> {
        let limit = self.page_limit();

        let pages: Vec<String> = self
            .document
            .get_pages()
            .keys()
            .take(limit)
            .map(|&number| {
                self.document.extract_text(&[number]).unwrap_or_else(|e| {
                    warn!("Page {} has no readable text: {}", number, e);
                    String::new()
                })
            })
            .collect();

        if pages.iter().all(|p| p.trim().is_empty()) {
            // Some encodings only come out through pdf-extract's font handling.
            debug!("Per-page extraction found no text, trying whole-document extraction");
            match self.extract_whole_text() {
                Ok(text) if !text.trim().is_empty() => return Ok(vec![text]),
                Ok(_) => debug!("PDF has no text layer"),
                Err(e) => warn!("Whole-document extraction failed: {}", e),
            }
        }

        Ok(pages)
    }
}
