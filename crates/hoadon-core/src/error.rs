//! Error types for the hoadon-core library.

use thiserror::Error;

use crate::approval::Refusal;

/// Error type for loading configuration and documents.
///
/// Review refusals and store failures have their own types ([`SaveError`],
/// [`StoreError`]) because callers handle them separately.
#[derive(Error, Debug)]
pub enum HoadonError {
    /// Document text extraction error.
    #[error("document error: {0}")]
    Document(#[from] DocumentError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors raised while turning a document into page text.
#[derive(Error, Debug)]
pub enum DocumentError {
    /// Failed to open/parse the PDF file.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// Failed to extract text from the document.
    #[error("failed to extract text: {0}")]
    TextExtraction(String),

    /// The PDF is encrypted and cannot be processed.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The PDF is empty or has no pages.
    #[error("PDF has no pages")]
    NoPages,

    /// The file type is not one we can read text from.
    #[error("unsupported document type: {0}")]
    Unsupported(String),

    /// I/O error while reading the document.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors from the persistence collaborator. Surfaced verbatim to callers.
#[derive(Error, Debug)]
pub enum StoreError {
    /// No record with the given id.
    #[error("invoice {0} not found")]
    NotFound(u64),

    /// The record is already deleted; deletion never reverses.
    #[error("invoice {0} is already deleted")]
    AlreadyDeleted(u64),

    /// A stored line could not be decoded.
    #[error("corrupt record on line {line}: {reason}")]
    Corrupt { line: usize, reason: String },

    /// Serialization failure.
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Why a save action did not produce a persisted record.
#[derive(Error, Debug)]
pub enum SaveError {
    /// The session refused to save (non-fatal; state unchanged).
    #[error(transparent)]
    Refused(#[from] Refusal),

    /// The persistence call itself failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Result type for the hoadon library.
pub type Result<T> = std::result::Result<T, HoadonError>;
