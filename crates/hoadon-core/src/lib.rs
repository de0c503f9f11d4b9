//! Core library for invoice field extraction and reconciliation.
//!
//! This crate provides:
//! - Document text reading (PDF text layer, plain text)
//! - Grouped-number tokenizing and rule-based field extraction
//! - Gap-filling of missing amounts and the total match verdict
//! - A bounded-edit review session with administrative escalation
//! - A JSON-lines invoice store

pub mod approval;
pub mod document;
pub mod error;
pub mod invoice;
pub mod models;
pub mod reconcile;
pub mod store;

pub use approval::{approve_edit, reject_edit, EditState, EditWarning, Refusal, ReviewSession, EDIT_CEILING};
pub use document::{load_document, DocumentSource, PdfDocument, PlainTextDocument, RawDocumentText};
pub use error::{DocumentError, HoadonError, Result, SaveError, StoreError};
pub use invoice::{ExtractionResult, InvoiceExtractor, InvoiceFieldParser};
pub use models::config::HoadonConfig;
pub use models::invoice::{ExtractedFields, InvoiceRecord, InvoiceStatus, InvoiceType, RecordDraft};
pub use reconcile::{analyze, analyze_document, analyze_file, match_verdict, reconcile, AnalysisMode, MatchVerdict, Reconciliation};
pub use store::{InvoiceStore, JsonlStore, MemoryStore};
