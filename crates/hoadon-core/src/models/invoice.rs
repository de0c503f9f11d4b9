//! Invoice data models: the extracted candidate and the persisted record.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The candidate record produced by one "analyze" action.
///
/// Replaced wholesale on re-analysis, never merged with a previous candidate.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractedFields {
    /// Invoice date as `DD/MM/YYYY`, or empty.
    pub date: String,

    /// Seller name (text after the last colon of the seller line).
    pub seller: String,

    /// Buyer name.
    pub buyer: String,

    /// Invoice number, digits only, zero-padded to 7 characters.
    pub invoice_number: String,

    /// Invoice symbol / serial code.
    pub invoice_symbol: String,

    /// Amount before tax.
    pub pre_tax_amount: Decimal,

    /// Tax amount.
    pub tax_amount: Decimal,

    /// Grand total.
    pub total_amount: Decimal,

    /// Every distinct grouped amount found anywhere in the document.
    #[serde(default)]
    pub all_numbers: BTreeSet<Decimal>,
}

impl ExtractedFields {
    /// Whether `amount` literally occurs in the source document.
    ///
    /// Strict equality: an amount off by a single unit is reported missing.
    pub fn contains_amount(&self, amount: Decimal) -> bool {
        self.all_numbers.contains(&amount)
    }

    /// Largest amount found in the document, if any.
    pub fn max_number(&self) -> Option<Decimal> {
        self.all_numbers.iter().next_back().copied()
    }
}

/// Direction of an invoice relative to the business.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum InvoiceType {
    /// Purchase invoice (đầu vào).
    #[default]
    #[serde(rename = "IN")]
    In,
    /// Sales invoice (đầu ra).
    #[serde(rename = "OUT")]
    Out,
}

impl InvoiceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvoiceType::In => "IN",
            InvoiceType::Out => "OUT",
        }
    }
}

impl fmt::Display for InvoiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InvoiceType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "in" | "đầu vào" => Ok(InvoiceType::In),
            "out" | "đầu ra" => Ok(InvoiceType::Out),
            other => Err(format!("unknown invoice type: {other}")),
        }
    }
}

/// Lifecycle status of a persisted invoice. `Active` → `Deleted` only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    #[default]
    Active,
    Deleted,
}

impl InvoiceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvoiceStatus::Active => "active",
            InvoiceStatus::Deleted => "deleted",
        }
    }
}

/// Operator-entered values that accompany a save action.
///
/// Starts out as a copy of the candidate's text fields; the operator may
/// overwrite any of them before saving.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordDraft {
    pub invoice_type: InvoiceType,
    pub memo: String,
    pub date: String,
    pub invoice_number: String,
    pub invoice_symbol: String,
    pub seller: String,
    pub buyer: String,
}

impl RecordDraft {
    /// Draft pre-filled from an extracted candidate.
    pub fn from_fields(fields: &ExtractedFields, invoice_type: InvoiceType) -> Self {
        Self {
            invoice_type,
            memo: String::new(),
            date: fields.date.clone(),
            invoice_number: fields.invoice_number.clone(),
            invoice_symbol: fields.invoice_symbol.clone(),
            seller: fields.seller.clone(),
            buyer: fields.buyer.clone(),
        }
    }

    /// Set the memo; an empty memo falls back to `default_memo`
    /// (typically the source file name).
    pub fn with_memo(mut self, memo: Option<&str>, default_memo: &str) -> Self {
        self.memo = match memo.map(str::trim) {
            Some(m) if !m.is_empty() => m.to_string(),
            _ => default_memo.to_string(),
        };
        self
    }
}

/// A finalized invoice, as handed to the persistence collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceRecord {
    /// Assigned by the store; monotonically increasing.
    pub id: u64,

    #[serde(rename = "type")]
    pub invoice_type: InvoiceType,

    pub date: String,
    pub invoice_number: String,
    pub invoice_symbol: String,
    pub seller_name: String,
    pub buyer_name: String,
    pub pre_tax_amount: Decimal,
    pub tax_amount: Decimal,
    pub total_amount: Decimal,
    pub status: InvoiceStatus,
    pub edit_count: u32,

    /// Saved past the edit ceiling; waiting for an administrator.
    #[serde(default)]
    pub request_edit: bool,

    /// `%Y-%m-%d %H:%M:%S`, local time.
    pub created_at: String,

    #[serde(default)]
    pub memo: String,
}

impl InvoiceRecord {
    pub fn is_active(&self) -> bool {
        self.status == InvoiceStatus::Active
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_contains_amount_is_strict() {
        let mut fields = ExtractedFields::default();
        fields.all_numbers.insert(Decimal::from(1_080_000));

        assert!(fields.contains_amount(Decimal::from(1_080_000)));
        assert!(!fields.contains_amount(Decimal::from(1_080_001)));
        assert!(!fields.contains_amount(Decimal::from(1_079_999)));
    }

    #[test]
    fn test_max_number() {
        let mut fields = ExtractedFields::default();
        assert_eq!(fields.max_number(), None);

        fields.all_numbers.insert(Decimal::from(5_000));
        fields.all_numbers.insert(Decimal::from(1_200_000));
        fields.all_numbers.insert(Decimal::from(80_000));
        assert_eq!(fields.max_number(), Some(Decimal::from(1_200_000)));
    }

    #[test]
    fn test_invoice_type_parsing() {
        assert_eq!("in".parse::<InvoiceType>(), Ok(InvoiceType::In));
        assert_eq!("OUT".parse::<InvoiceType>(), Ok(InvoiceType::Out));
        assert_eq!("Đầu ra".parse::<InvoiceType>(), Ok(InvoiceType::Out));
        assert!("sideways".parse::<InvoiceType>().is_err());
    }

    #[test]
    fn test_draft_memo_falls_back_to_default() {
        let fields = ExtractedFields::default();
        let draft = RecordDraft::from_fields(&fields, InvoiceType::Out).with_memo(Some("  "), "hd_001.pdf");
        assert_eq!(draft.memo, "hd_001.pdf");

        let draft = RecordDraft::from_fields(&fields, InvoiceType::Out).with_memo(Some("Tiền cát"), "hd_001.pdf");
        assert_eq!(draft.memo, "Tiền cát");
    }

    #[test]
    fn test_record_wire_names() {
        let record = InvoiceRecord {
            id: 3,
            invoice_type: InvoiceType::Out,
            date: "05/03/2024".to_string(),
            invoice_number: "0000123".to_string(),
            invoice_symbol: "1C24TAA".to_string(),
            seller_name: "Công ty A".to_string(),
            buyer_name: "Công ty B".to_string(),
            pre_tax_amount: Decimal::from(1_000_000),
            tax_amount: Decimal::from(80_000),
            total_amount: Decimal::from(1_080_000),
            status: InvoiceStatus::Active,
            edit_count: 1,
            request_edit: false,
            created_at: "2024-03-05 10:00:00".to_string(),
            memo: "Tiền cát".to_string(),
        };

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["type"], "OUT");
        assert_eq!(value["status"], "active");
        assert_eq!(value["seller_name"], "Công ty A");
        assert_eq!(value["total_amount"], 1_080_000.0);

        let back: InvoiceRecord = serde_json::from_value(value).unwrap();
        assert_eq!(back, record);
    }
}
