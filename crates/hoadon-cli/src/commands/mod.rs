//! CLI subcommands.

pub mod analyze;
pub mod batch;
pub mod config;
pub mod records;
pub mod save;

use std::path::Path;
use std::str::FromStr;

use console::style;
use rust_decimal::Decimal;
use tracing::debug;

use hoadon_core::invoice::rules::parse_grouped_amount;
use hoadon_core::{load_document, AnalysisMode, HoadonConfig, JsonlStore, RawDocumentText};

/// Load the configuration named on the command line, else the default
/// config file if one exists, else built-in defaults.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<HoadonConfig> {
    if let Some(path) = config_path {
        return HoadonConfig::from_file(Path::new(path))
            .map_err(|e| anyhow::anyhow!("Failed to load config {}: {}", path, e));
    }

    let default_path = config::default_config_path();
    if default_path.exists() {
        debug!("Using config file {}", default_path.display());
        Ok(HoadonConfig::from_file(&default_path)?)
    } else {
        Ok(HoadonConfig::default())
    }
}

pub fn open_store(config: &HoadonConfig) -> JsonlStore {
    JsonlStore::new(&config.store.path)
}

/// `--deep` wins over the configured default.
pub fn resolve_mode(deep: bool, config: &HoadonConfig) -> AnalysisMode {
    if deep {
        AnalysisMode::Deep
    } else {
        config.extraction.default_mode
    }
}

/// Accepts `1080000`, `1.080.000` and `1,080,000`.
///
/// Amounts are whole, non-negative currency units, small enough that a
/// pre-tax and tax pair always adds up.
pub fn parse_amount(s: &str) -> Result<Decimal, String> {
    let s = s.trim();
    let value = parse_amount_literal(s).ok_or_else(|| format!("not an amount: {s}"))?;

    if value.is_sign_negative() {
        return Err(format!("amount must not be negative: {s}"));
    }
    if !value.fract().is_zero() {
        return Err(format!("amount must be in whole units: {s}"));
    }
    if value.checked_add(value).is_none() {
        return Err(format!("amount is too large: {s}"));
    }
    Ok(value.normalize())
}

fn parse_amount_literal(s: &str) -> Option<Decimal> {
    if let Ok(value) = Decimal::from_str(s) {
        if !(s.contains('.') && s.split('.').skip(1).all(|g| g.len() == 3)) {
            return Some(value);
        }
    }

    let grouped = s.split(['.', ',']).skip(1).all(|g| g.len() == 3);
    grouped.then(|| parse_grouped_amount(s)).flatten()
}

/// Read a document's text. An unreadable document is reported and yields
/// `None`; a missing file is an error.
pub fn read_document(path: &Path, config: &HoadonConfig) -> anyhow::Result<Option<RawDocumentText>> {
    if !path.exists() {
        anyhow::bail!("Input file not found: {}", path.display());
    }

    match load_document(path, config.pdf.max_pages) {
        Ok(document) => {
            if document.is_blank() {
                eprintln!(
                    "{} No text layer found in {}; fields will be empty",
                    style("⚠").yellow(),
                    path.display()
                );
            }
            Ok(Some(document))
        }
        Err(e) => {
            eprintln!(
                "{} Could not read {}: {}",
                style("⚠").yellow(),
                path.display(),
                e
            );
            Ok(None)
        }
    }
}

/// File name used as the default memo.
pub fn file_name(path: &Path) -> String {
    path.file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("")
        .to_string()
}
