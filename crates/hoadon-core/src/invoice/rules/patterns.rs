//! Common regex patterns and keyword tables for Vietnamese invoice extraction.
//!
//! Digit classes are spelled `[0-9]`: `\d` in the `regex` crate also matches
//! non-ASCII digits, which `str::parse` then rejects.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Grouped amount candidate: 1-3 digits, then one or more `.ddd` / `,ddd`
    // groups. Neighbour checks live in `amounts::extract_numbers_from_line`.
    pub static ref GROUPED_NUMBER: Regex = Regex::new(
        r"[0-9]{1,3}(?:[.,][0-9]{3})+"
    ).unwrap();

    // Invoice number. "Số"/"No" are the generic fallback labels.
    pub static ref INVOICE_NUMBER: Regex = Regex::new(
        r"(?i)(?:Số hóa đơn|Số HĐ|Số|No)[:\s.]*([0-9]{1,8})\b"
    ).unwrap();

    // Invoice symbol / serial.
    pub static ref INVOICE_SYMBOL: Regex = Regex::new(
        r"(?i)(?:Ký hiệu|Mẫu số|Serial)[:\s.]*([A-Z0-9]{1,2}[A-Z0-9/\-]{3,10})"
    ).unwrap();

    // "Ngày 05 tháng 3 năm 2024"
    pub static ref DATE_LONG: Regex = Regex::new(
        r"(?:Ngày|ngày)\s+([0-9]{1,2})\s+(?:tháng|Tháng)\s+([0-9]{1,2})\s+(?:năm|Năm)\s+([0-9]{4})"
    ).unwrap();

    // "05/03/2024"
    pub static ref DATE_SLASH: Regex = Regex::new(
        r"([0-9]{2}/[0-9]{2}/[0-9]{4})"
    ).unwrap();

    // Counterparty labels, anchored at the start of a trimmed line.
    pub static ref SELLER_LABEL: Regex = Regex::new(
        r"(?i)^(?:Đơn vị bán|Người bán|Bên A|Nhà cung cấp)"
    ).unwrap();

    pub static ref BUYER_LABEL: Regex = Regex::new(
        r"(?i)^(?:Đơn vị mua|Người mua|Khách hàng|Bên B)"
    ).unwrap();
}

/// Lower-cased keywords marking a grand-total line.
pub const TOTAL_KEYWORDS: &[&str] = &["thanh toán", "tổng cộng"];

/// Lower-cased keywords marking a line-items subtotal (pre-tax) line.
pub const SUBTOTAL_KEYWORDS: &[&str] = &["tiền hàng", "thành tiền"];

/// Lower-cased keyword marking a tax line.
pub const TAX_KEYWORD: &str = "thuế";

/// A tax line that also names the rate ("thuế suất") is not a tax amount.
pub const RATE_KEYWORD: &str = "suất";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invoice_number_labels() {
        let caps = INVOICE_NUMBER.captures("Số hóa đơn: 123").unwrap();
        assert_eq!(&caps[1], "123");

        let caps = INVOICE_NUMBER.captures("SỐ HĐ. 00045").unwrap();
        assert_eq!(&caps[1], "00045");

        let caps = INVOICE_NUMBER.captures("Invoice No: 98765").unwrap();
        assert_eq!(&caps[1], "98765");
    }

    #[test]
    fn test_invoice_number_rejects_long_runs() {
        // Nine digits cannot end on a word boundary after at most eight.
        assert!(INVOICE_NUMBER.captures("Số 123456789").is_none());
    }

    #[test]
    fn test_counterparty_labels_are_anchored() {
        assert!(SELLER_LABEL.is_match("Đơn vị bán hàng: Công ty A"));
        assert!(SELLER_LABEL.is_match("NGƯỜI BÁN: Công ty A"));
        assert!(!SELLER_LABEL.is_match("Ký bởi Người bán"));
        assert!(BUYER_LABEL.is_match("Khách hàng: Công ty B"));
    }
}
