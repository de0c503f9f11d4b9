//! Rule-based invoice field parser.

use std::collections::BTreeSet;

use rust_decimal::Decimal;
use tracing::{debug, info};

use crate::models::invoice::ExtractedFields;

use super::rules::{
    amounts::extract_numbers_from_line,
    dates::extract_date,
    identifiers::{extract_invoice_number, extract_invoice_symbol},
    parties::extract_parties,
    patterns::{RATE_KEYWORD, SUBTOTAL_KEYWORDS, TAX_KEYWORD, TOTAL_KEYWORDS},
};
use super::InvoiceExtractor;

/// Result of invoice extraction.
#[derive(Debug, Clone)]
pub struct ExtractionResult {
    /// Extracted candidate.
    pub fields: ExtractedFields,
    /// Fields that could not be found (left at their defaults).
    pub warnings: Vec<String>,
}

/// Which monetary field a line feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineClass {
    Total,
    PreTax,
    Tax,
}

/// Classify a line by its keywords. Groups are tested in order and are
/// mutually exclusive: total, then subtotal, then tax (but not tax rate).
pub fn classify_line(line: &str) -> Option<LineClass> {
    let lower = line.to_lowercase();

    if TOTAL_KEYWORDS.iter().any(|kw| lower.contains(kw)) {
        Some(LineClass::Total)
    } else if SUBTOTAL_KEYWORDS.iter().any(|kw| lower.contains(kw)) {
        Some(LineClass::PreTax)
    } else if lower.contains(TAX_KEYWORD) && !lower.contains(RATE_KEYWORD) {
        Some(LineClass::Tax)
    } else {
        None
    }
}

/// Monetary fields gathered from a line-by-line pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MonetaryFields {
    pub pre_tax: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
    pub all_numbers: BTreeSet<Decimal>,
}

/// Walk every line, collecting all amounts and assigning each classified
/// line's largest amount to its field.
///
/// A later qualifying line always overwrites an earlier one: totals footers
/// come after line items.
pub fn extract_monetary_fields(text: &str) -> MonetaryFields {
    let mut result = MonetaryFields::default();

    for line in text.split('\n') {
        let nums = extract_numbers_from_line(line);
        result.all_numbers.extend(nums.iter().copied());

        let Some(value) = nums.into_iter().max() else {
            continue;
        };

        let Some(class) = classify_line(line) else {
            continue;
        };
        match class {
            LineClass::Total => result.total = value,
            LineClass::PreTax => result.pre_tax = value,
            LineClass::Tax => result.tax = value,
        }
        debug!("Line {:?} -> {:?} = {}", line.trim(), class, value);
    }

    result
}

/// Rule-based parser for Vietnamese invoices.
#[derive(Debug, Clone, Copy, Default)]
pub struct InvoiceFieldParser;

impl InvoiceFieldParser {
    pub fn new() -> Self {
        Self
    }

    /// Parse a candidate from document text, collecting warnings for fields
    /// left empty. Never fails.
    pub fn parse(&self, text: &str) -> ExtractionResult {
        let mut warnings = Vec::new();

        info!("Parsing invoice from {} characters of text", text.len());

        let invoice_number = extract_invoice_number(text);
        if invoice_number.is_empty() {
            warnings.push("Could not extract invoice number".to_string());
        }

        let invoice_symbol = extract_invoice_symbol(text);
        if invoice_symbol.is_empty() {
            warnings.push("Could not extract invoice symbol".to_string());
        }

        let date = extract_date(text);
        if date.is_empty() {
            warnings.push("Could not extract invoice date".to_string());
        }

        let money = extract_monetary_fields(text);
        if money.total.is_zero() {
            warnings.push("No total line found".to_string());
        }

        let parties = extract_parties(text.split('\n'));
        if parties.seller.is_empty() {
            warnings.push("Could not extract seller".to_string());
        }
        if parties.buyer.is_empty() {
            warnings.push("Could not extract buyer".to_string());
        }

        let fields = ExtractedFields {
            date,
            seller: parties.seller,
            buyer: parties.buyer,
            invoice_number,
            invoice_symbol,
            pre_tax_amount: money.pre_tax,
            tax_amount: money.tax,
            total_amount: money.total,
            all_numbers: money.all_numbers,
        };

        debug!(
            "Extracted invoice {:?}: total={} pre_tax={} tax={} ({} distinct amounts)",
            fields.invoice_number,
            fields.total_amount,
            fields.pre_tax_amount,
            fields.tax_amount,
            fields.all_numbers.len()
        );

        ExtractionResult { fields, warnings }
    }
}

impl InvoiceExtractor for InvoiceFieldParser {
    fn extract_from_text(&self, text: &str) -> ExtractionResult {
        self.parse(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SAMPLE: &str = "HÓA ĐƠN GIÁ TRỊ GIA TĂNG
Ký hiệu: 1C24TAA
Số hóa đơn: 123
Ngày 05 tháng 03 năm 2024
Đơn vị bán hàng: CÔNG TY TNHH ABC
Mã số thuế: 0101234567
Người mua hàng: CÔNG TY CP XYZ
STT | Tên hàng | Thành tiền
1 | Cát xây dựng | 600.000
2 | Đá 1x2 | 400.000
Cộng tiền hàng: 1.000.000
Thuế suất GTGT: 8%
Tiền thuế GTGT: 80.000
Tổng cộng tiền thanh toán: 1.080.000
";

    #[test]
    fn test_parse_sample_invoice() {
        let result = InvoiceFieldParser::new().extract_from_text(SAMPLE);
        assert!(result.warnings.is_empty(), "{:?}", result.warnings);
        let fields = result.fields;

        assert_eq!(fields.invoice_number, "0000123");
        assert_eq!(fields.invoice_symbol, "1C24TAA");
        assert_eq!(fields.date, "05/03/2024");
        assert_eq!(fields.seller, "CÔNG TY TNHH ABC");
        assert_eq!(fields.buyer, "CÔNG TY CP XYZ");
        assert_eq!(fields.pre_tax_amount, Decimal::from(1_000_000));
        assert_eq!(fields.tax_amount, Decimal::from(80_000));
        assert_eq!(fields.total_amount, Decimal::from(1_080_000));

        let expected: BTreeSet<Decimal> = [600_000, 400_000, 1_000_000, 80_000, 1_080_000]
            .into_iter()
            .map(Decimal::from)
            .collect();
        assert_eq!(fields.all_numbers, expected);
    }

    #[test]
    fn test_classification_precedence() {
        assert_eq!(classify_line("Tổng cộng tiền hàng"), Some(LineClass::Total));
        assert_eq!(classify_line("Cộng tiền hàng"), Some(LineClass::PreTax));
        assert_eq!(classify_line("Thành tiền trước thuế"), Some(LineClass::PreTax));
        assert_eq!(classify_line("Tiền thuế GTGT"), Some(LineClass::Tax));
        assert_eq!(classify_line("Thuế suất GTGT"), None);
        assert_eq!(classify_line("Đơn giá"), None);
    }

    #[test]
    fn test_last_total_wins() {
        let text = "Tổng cộng: 500.000\nGhi chú\nTổng cộng: 600.000";
        let money = extract_monetary_fields(text);
        assert_eq!(money.total, Decimal::from(600_000));
    }

    #[test]
    fn test_line_maximum_is_used() {
        let money = extract_monetary_fields("Tổng cộng 80.000 1.080.000 1.000.000");
        assert_eq!(money.total, Decimal::from(1_080_000));
    }

    #[test]
    fn test_unclassified_numbers_still_collected() {
        let money = extract_monetary_fields("Đơn giá 25.000\nSố lượng 3");
        assert_eq!(money.total, Decimal::ZERO);
        assert!(money.all_numbers.contains(&Decimal::from(25_000)));
    }

    #[test]
    fn test_empty_text_gives_default_candidate() {
        let result = InvoiceFieldParser::new().parse("");
        assert_eq!(result.fields, ExtractedFields::default());
        assert_eq!(
            result.warnings,
            vec![
                "Could not extract invoice number",
                "Could not extract invoice symbol",
                "Could not extract invoice date",
                "No total line found",
                "Could not extract seller",
                "Could not extract buyer",
            ]
        );
    }

    #[test]
    fn test_parse_is_idempotent() {
        let parser = InvoiceFieldParser::new();
        assert_eq!(parser.parse(SAMPLE).fields, parser.parse(SAMPLE).fields);
    }
}
