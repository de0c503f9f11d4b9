//! Rule-based field extractors for Vietnamese invoices.

pub mod amounts;
pub mod dates;
pub mod identifiers;
pub mod parties;
pub mod patterns;

pub use amounts::{extract_numbers_from_line, format_vnd, parse_grouped_amount};
pub use dates::extract_date;
pub use identifiers::{extract_invoice_number, extract_invoice_symbol};
pub use parties::{extract_parties, Parties};
