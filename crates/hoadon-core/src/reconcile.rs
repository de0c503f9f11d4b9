//! Gap-filling of missing monetary fields and the match verdict.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::document::{load_document, RawDocumentText};
use crate::error::Result;
use crate::invoice::{ExtractionResult, InvoiceExtractor, InvoiceFieldParser};
use crate::models::invoice::ExtractedFields;

/// Divisor used to derive a pre-tax amount from a total (fixed 8% VAT).
pub const VAT_DIVISOR: Decimal = Decimal::from_parts(108, 0, 0, false, 2);

/// Totals closer than this (in currency units) are a match.
pub const MATCH_TOLERANCE: Decimal = Decimal::from_parts(10, 0, 0, false, 0);

/// How hard to look for the total.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisMode {
    /// Use the classified total line; fall back to the largest amount only
    /// when none was found.
    #[default]
    Normal,
    /// Always take the largest amount in the document as the total.
    Deep,
}

impl fmt::Display for AnalysisMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnalysisMode::Normal => f.write_str("normal"),
            AnalysisMode::Deep => f.write_str("deep"),
        }
    }
}

impl FromStr for AnalysisMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "normal" => Ok(AnalysisMode::Normal),
            "deep" => Ok(AnalysisMode::Deep),
            other => Err(format!("unknown analysis mode: {other}")),
        }
    }
}

/// Whether the components add up to the document total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchVerdict {
    pub matched: bool,
    /// `|total - (pre_tax + tax)|`, saturated at `Decimal::MAX` when the
    /// sum is not representable.
    pub difference: Decimal,
}

/// Compare a document total against the sum of its two components.
///
/// Components whose sum overflows never match.
pub fn match_verdict(extracted_total: Decimal, pre_tax: Decimal, tax: Decimal) -> MatchVerdict {
    let difference = pre_tax
        .checked_add(tax)
        .and_then(|sum| extracted_total.checked_sub(sum))
        .map(|diff| diff.abs())
        .unwrap_or(Decimal::MAX);
    MatchVerdict {
        matched: difference < MATCH_TOLERANCE,
        difference,
    }
}

/// A fully populated candidate plus how it was obtained.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reconciliation {
    pub fields: ExtractedFields,
    /// The total as reconciled from the document; later edits are always
    /// compared against this value.
    pub extracted_total: Decimal,
    pub verdict: MatchVerdict,
    pub mode: AnalysisMode,
    /// Total was replaced by the document's largest amount.
    pub total_from_max: bool,
    /// Pre-tax amount was derived from the total.
    pub pre_tax_derived: bool,
    /// Tax amount was derived as total minus pre-tax.
    pub tax_derived: bool,
    /// Fields the extractor could not find.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

/// Fill missing monetary fields and compute the match verdict.
pub fn reconcile(mut fields: ExtractedFields, mode: AnalysisMode) -> Reconciliation {
    let mut total_from_max = false;
    if mode == AnalysisMode::Deep || fields.total_amount.is_zero() {
        if let Some(max) = fields.max_number() {
            debug!("Taking largest amount {} as total ({} mode)", max, mode);
            fields.total_amount = max;
            total_from_max = true;
        }
    }

    // Both checks look at the extracted values, not at each other's output.
    let pre_tax_derived = fields.pre_tax_amount.is_zero();
    let tax_derived = fields.tax_amount.is_zero();

    if pre_tax_derived {
        fields.pre_tax_amount = (fields.total_amount / VAT_DIVISOR).round();
    }
    if tax_derived {
        fields.tax_amount = fields
            .total_amount
            .checked_sub(fields.pre_tax_amount)
            .unwrap_or(Decimal::ZERO);
    }

    let verdict = match_verdict(fields.total_amount, fields.pre_tax_amount, fields.tax_amount);

    info!(
        "Reconciled total={} pre_tax={} tax={} matched={} (diff {})",
        fields.total_amount, fields.pre_tax_amount, fields.tax_amount, verdict.matched, verdict.difference
    );

    Reconciliation {
        extracted_total: fields.total_amount,
        fields,
        verdict,
        mode,
        total_from_max,
        pre_tax_derived,
        tax_derived,
        warnings: Vec::new(),
    }
}

/// Extract and reconcile in one step.
pub fn analyze(text: &str, mode: AnalysisMode) -> Reconciliation {
    with_warnings(InvoiceFieldParser::new().extract_from_text(text), mode)
}

/// Extract and reconcile a document's page text.
pub fn analyze_document(document: &RawDocumentText, mode: AnalysisMode) -> Reconciliation {
    with_warnings(InvoiceFieldParser::new().extract_from_document(document), mode)
}

/// Read a document from disk, then extract and reconcile it.
///
/// `max_pages` of 0 reads every page.
pub fn analyze_file(path: &Path, max_pages: usize, mode: AnalysisMode) -> Result<Reconciliation> {
    let document = load_document(path, max_pages)?;
    Ok(analyze_document(&document, mode))
}

fn with_warnings(result: ExtractionResult, mode: AnalysisMode) -> Reconciliation {
    let mut reconciliation = reconcile(result.fields, mode);
    reconciliation.warnings = result.warnings;
    reconciliation
}
