//! Invoice field extraction module.

mod parser;
pub mod rules;

pub use parser::{
    classify_line, extract_monetary_fields, ExtractionResult, InvoiceFieldParser, LineClass,
    MonetaryFields,
};

use crate::document::RawDocumentText;

/// Trait for invoice field extractors.
///
/// Extraction never fails: anything not found is left at its default and
/// reported as a warning.
pub trait InvoiceExtractor {
    /// Extract a candidate from plain text.
    fn extract_from_text(&self, text: &str) -> ExtractionResult;

    /// Extract a candidate from a document's page texts.
    fn extract_from_document(&self, document: &RawDocumentText) -> ExtractionResult {
        self.extract_from_text(document.text())
    }
}
