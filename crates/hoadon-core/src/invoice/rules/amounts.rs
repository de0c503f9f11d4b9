//! Grouped-digit amount extraction (VND style: `1.080.000` or `1,080,000`).

use rust_decimal::Decimal;
use std::str::FromStr;
use tracing::trace;

use super::patterns::GROUPED_NUMBER;

/// Values in this inclusive range are read as calendar years, never money.
pub const YEAR_RANGE: (i64, i64) = (1990, 2030);

/// The candidate at `bytes[start..end]` is not part of a longer number:
/// no digit directly before it, no leading `0` followed by a digit, and not
/// followed by a separator that starts another (non-3-digit) group.
fn is_standalone(bytes: &[u8], start: usize, end: usize) -> bool {
    if start > 0 && bytes[start - 1].is_ascii_digit() {
        return false;
    }
    if bytes[start] == b'0' && bytes.get(start + 1).is_some_and(u8::is_ascii_digit) {
        return false;
    }
    let trailing_group = matches!(bytes.get(end), Some(b'.' | b','))
        && bytes.get(end + 1).is_some_and(u8::is_ascii_digit);
    !trailing_group
}

/// Extract every amount on one line, in order of appearance.
///
/// Duplicates are kept; year-like values (see [`YEAR_RANGE`]) are dropped.
pub fn extract_numbers_from_line(line: &str) -> Vec<Decimal> {
    let bytes = line.as_bytes();
    let mut results = Vec::new();
    let mut pos = 0;

    while let Some(m) = GROUPED_NUMBER.find_at(line, pos) {
        if !is_standalone(bytes, m.start(), m.end()) {
            // Candidate matches always start on an ASCII digit.
            pos = m.start() + 1;
            continue;
        }
        pos = m.end();

        let Some(amount) = parse_grouped_amount(m.as_str()) else {
            continue;
        };
        if is_year_like(amount) {
            trace!("Skipping year-like number {}", m.as_str());
            continue;
        }
        results.push(amount);
    }

    results
}

/// Parse a grouped literal by dropping every `.`/`,` separator.
pub fn parse_grouped_amount(s: &str) -> Option<Decimal> {
    let digits: String = s.chars().filter(|c| *c != '.' && *c != ',').collect();
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    Decimal::from_str(&digits).ok()
}

/// Whether the value looks like a calendar year.
pub fn is_year_like(value: Decimal) -> bool {
    let (low, high) = YEAR_RANGE;
    value >= Decimal::from(low) && value <= Decimal::from(high)
}

/// Format an amount as whole VND with `.` thousand separators (`1.080.000`).
pub fn format_vnd(amount: Decimal) -> String {
    let rounded = amount.round();
    let negative = rounded.is_sign_negative() && !rounded.is_zero();
    let digits = rounded.abs().trunc().to_string();

    let chars: Vec<char> = digits.chars().collect();
    let mut formatted = String::new();

    for (i, c) in chars.iter().enumerate() {
        if i > 0 && (chars.len() - i) % 3 == 0 {
            formatted.push('.');
        }
        formatted.push(*c);
    }

    if negative {
        format!("-{}", formatted)
    } else {
        formatted
    }
}
