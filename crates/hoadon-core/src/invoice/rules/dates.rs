//! Invoice date extraction.

use super::patterns::{DATE_LONG, DATE_SLASH};

/// Extract the invoice date as `DD/MM/YYYY`, or an empty string when none
/// is found.
///
/// The long Vietnamese form wins over the slash form wherever they appear,
/// and its day and month are zero-padded. The slash form is taken verbatim.
pub fn extract_date(text: &str) -> String {
    if let Some(caps) = DATE_LONG.captures(text) {
        let day: u32 = caps[1].parse().unwrap_or(0);
        let month: u32 = caps[2].parse().unwrap_or(0);
        return format!("{:02}/{:02}/{}", day, month, &caps[3]);
    }

    DATE_SLASH
        .find(text)
        .map(|m| m.as_str().to_string())
        .unwrap_or_default()
}
