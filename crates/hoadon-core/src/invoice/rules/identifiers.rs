//! Invoice number and invoice symbol extraction.

use super::patterns::{INVOICE_NUMBER, INVOICE_SYMBOL};

/// Width invoice numbers are left-padded to with zeros.
pub const INVOICE_NUMBER_WIDTH: usize = 7;

/// First labelled invoice number, zero-padded to [`INVOICE_NUMBER_WIDTH`].
pub fn extract_invoice_number(text: &str) -> String {
    INVOICE_NUMBER
        .captures(text)
        .map(|caps| format!("{:0>width$}", &caps[1], width = INVOICE_NUMBER_WIDTH))
        .unwrap_or_default()
}

/// First labelled invoice symbol (e.g. `1C24TAA`, `AA/24E`).
pub fn extract_invoice_symbol(text: &str) -> String {
    INVOICE_SYMBOL
        .captures(text)
        .map(|caps| caps[1].to_string())
        .unwrap_or_default()
}
