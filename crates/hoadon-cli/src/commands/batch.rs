//! Batch command - analyze many invoices and summarize them.

use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{error, warn};

use hoadon_core::{analyze_file, Reconciliation};

use super::{load_config, resolve_mode};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Glob pattern for input files
    #[arg(required = true)]
    input: String,

    /// Take the largest amount in each document as its total
    #[arg(long)]
    deep: bool,

    /// Write a summary CSV to this path
    #[arg(long)]
    summary: Option<PathBuf>,

    /// Continue on error
    #[arg(long)]
    continue_on_error: bool,
}

/// Outcome for one file.
struct BatchResult {
    path: PathBuf,
    reconciliation: Option<Reconciliation>,
    error: Option<String>,
    processing_time_ms: u64,
}

pub fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;
    let mode = resolve_mode(args.deep, &config);

    let files: Vec<PathBuf> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| {
            let ext = p.extension().and_then(|e| e.to_str()).unwrap_or("");
            matches!(ext.to_lowercase().as_str(), "pdf" | "txt" | "text")
        })
        .collect();

    if files.is_empty() {
        anyhow::bail!("No matching files found for pattern: {}", args.input);
    }

    println!(
        "{} Found {} files to analyze",
        style("ℹ").blue(),
        files.len()
    );

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")?
            .progress_chars("=>-"),
    );

    let mut results = Vec::with_capacity(files.len());

    for path in files {
        let file_start = Instant::now();
        let outcome = analyze_file(&path, config.pdf.max_pages, mode);
        let processing_time_ms = file_start.elapsed().as_millis() as u64;

        match outcome {
            Ok(reconciliation) => results.push(BatchResult {
                path,
                reconciliation: Some(reconciliation),
                error: None,
                processing_time_ms,
            }),
            Err(e) => {
                if args.continue_on_error {
                    warn!("Failed to analyze {}: {}", path.display(), e);
                    results.push(BatchResult {
                        path,
                        reconciliation: None,
                        error: Some(e.to_string()),
                        processing_time_ms,
                    });
                } else {
                    pb.abandon();
                    error!("Failed to analyze {}: {}", path.display(), e);
                    anyhow::bail!("Analysis failed for {}: {}", path.display(), e);
                }
            }
        }

        pb.inc(1);
    }

    pb.finish_and_clear();

    if let Some(summary_path) = &args.summary {
        write_summary(summary_path, &results)?;
        println!(
            "{} Summary written to {}",
            style("✓").green(),
            summary_path.display()
        );
    }

    let failed: Vec<_> = results.iter().filter(|r| r.error.is_some()).collect();
    let mismatched = results
        .iter()
        .filter_map(|r| r.reconciliation.as_ref())
        .filter(|r| !r.verdict.matched)
        .count();

    println!();
    println!(
        "{} Analyzed {} files in {:?}",
        style("✓").green(),
        results.len(),
        start.elapsed()
    );
    println!(
        "   {} matched, {} mismatched, {} failed",
        style(results.len() - failed.len() - mismatched).green(),
        style(mismatched).yellow(),
        style(failed.len()).red()
    );

    if !failed.is_empty() {
        println!();
        println!("{}", style("Failed files:").red());
        for result in &failed {
            println!(
                "  - {}: {}",
                result.path.display(),
                result.error.as_deref().unwrap_or("unknown error")
            );
        }
    }

    Ok(())
}

fn write_summary(path: &Path, results: &[BatchResult]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record([
        "filename",
        "status",
        "invoice_number",
        "invoice_symbol",
        "date",
        "seller",
        "buyer",
        "pre_tax_amount",
        "tax_amount",
        "total_amount",
        "matched",
        "difference",
        "processing_time_ms",
        "warnings",
        "error",
    ])?;

    for result in results {
        let filename = result.path.file_name().and_then(|s| s.to_str()).unwrap_or("");

        if let Some(r) = &result.reconciliation {
            let fields = &r.fields;
            wtr.write_record([
                filename,
                "success",
                &fields.invoice_number,
                &fields.invoice_symbol,
                &fields.date,
                &fields.seller,
                &fields.buyer,
                &fields.pre_tax_amount.to_string(),
                &fields.tax_amount.to_string(),
                &fields.total_amount.to_string(),
                &r.verdict.matched.to_string(),
                &r.verdict.difference.to_string(),
                &result.processing_time_ms.to_string(),
                &r.warnings.join("; "),
                "",
            ])?;
        } else {
            wtr.write_record([
                filename,
                "error",
                "",
                "",
                "",
                "",
                "",
                "",
                "",
                "",
                "",
                "",
                &result.processing_time_ms.to_string(),
                "",
                result.error.as_deref().unwrap_or(""),
            ])?;
        }
    }

    wtr.flush()?;
    Ok(())
}
