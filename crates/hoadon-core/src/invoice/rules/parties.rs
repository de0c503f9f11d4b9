//! Seller / buyer extraction from the document header.

use super::patterns::{BUYER_LABEL, SELLER_LABEL};

/// Only the first lines of a document are scanned for counterparties.
pub const PARTY_SCAN_LINES: usize = 35;

/// Extracted counterparty names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Parties {
    pub seller: String,
    pub buyer: String,
}

/// Scan the first [`PARTY_SCAN_LINES`] lines for seller and buyer labels.
///
/// The scan never stops early: a later matching line overwrites an earlier
/// one for the same role. A line starting with a seller label is never
/// considered for the buyer.
pub fn extract_parties<'a, I>(lines: I) -> Parties
where
    I: IntoIterator<Item = &'a str>,
{
    let mut parties = Parties::default();

    for line in lines.into_iter().take(PARTY_SCAN_LINES) {
        let line = line.trim();
        if SELLER_LABEL.is_match(line) {
            parties.seller = value_after_last_colon(line);
        } else if BUYER_LABEL.is_match(line) {
            parties.buyer = value_after_last_colon(line);
        }
    }

    parties
}

/// Text after the last `:` (the whole line if it has none), trimmed.
fn value_after_last_colon(line: &str) -> String {
    line.rsplit(':').next().unwrap_or(line).trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_extract_parties() {
        let text = "HÓA ĐƠN GTGT\nĐơn vị bán hàng: CÔNG TY TNHH ABC\nMã số thuế: 0101234567\nNgười mua hàng: Nguyễn Văn B";
        let parties = extract_parties(text.split('\n'));
        assert_eq!(parties.seller, "CÔNG TY TNHH ABC");
        assert_eq!(parties.buyer, "Nguyễn Văn B");
    }

    #[test]
    fn test_last_match_within_window_wins() {
        let text = "Người bán: Công ty A\nBên A: Công ty A2\nKhách hàng: X\nBên B: Y";
        let parties = extract_parties(text.split('\n'));
        assert_eq!(parties.seller, "Công ty A2");
        assert_eq!(parties.buyer, "Y");
    }

    #[test]
    fn test_value_after_last_colon() {
        let parties = extract_parties(["  Nhà cung cấp: Chi nhánh: Hà Nội  "]);
        assert_eq!(parties.seller, "Hà Nội");

        let parties = extract_parties(["Khách hàng lẻ"]);
        assert_eq!(parties.buyer, "Khách hàng lẻ");
    }

    #[test]
    fn test_scan_window_is_35_lines() {
        let mut lines: Vec<String> = (0..PARTY_SCAN_LINES - 1).map(|i| format!("dòng {i}")).collect();
        lines.push("Người bán: Trong cửa sổ".to_string());
        lines.push("Người bán: Ngoài cửa sổ".to_string());
        lines.push("Người mua: Ngoài cửa sổ".to_string());

        let parties = extract_parties(lines.iter().map(String::as_str));
        assert_eq!(parties.seller, "Trong cửa sổ");
        assert_eq!(parties.buyer, "");
    }
}
