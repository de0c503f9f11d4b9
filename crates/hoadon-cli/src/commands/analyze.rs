//! Analyze command - extract and reconcile a single invoice.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use console::style;
use serde::Serialize;
use tracing::{debug, info};

use hoadon_core::invoice::rules::format_vnd;
use hoadon_core::{analyze_document, Reconciliation};

use super::{load_config, read_document, resolve_mode};

/// Arguments for the analyze command.
#[derive(Args)]
pub struct AnalyzeArgs {
    /// Input file (PDF or text)
    #[arg(required = true)]
    input: PathBuf,

    /// Take the largest amount in the document as the total
    #[arg(long)]
    deep: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output
    Csv,
    /// Plain text summary
    Text,
}

#[derive(Serialize)]
struct AnalyzeReport<'a> {
    file: String,
    #[serde(flatten)]
    reconciliation: &'a Reconciliation,
}

pub fn run(args: AnalyzeArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;
    let mode = resolve_mode(args.deep, &config);

    info!("Analyzing {} ({} mode)", args.input.display(), mode);

    let Some(document) = read_document(&args.input, &config)? else {
        return Ok(());
    };

    let reconciliation = analyze_document(&document, mode);
    for warning in &reconciliation.warnings {
        eprintln!("{} {}", style("⚠").yellow(), warning);
    }

    let output = match args.format {
        OutputFormat::Json => serde_json::to_string_pretty(&AnalyzeReport {
            file: args.input.display().to_string(),
            reconciliation: &reconciliation,
        })?,
        OutputFormat::Csv => format_csv(&reconciliation)?,
        OutputFormat::Text => format_text(&reconciliation),
    };

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

fn format_text(r: &Reconciliation) -> String {
    let fields = &r.fields;
    let mut output = String::new();

    output.push_str(&format!("Invoice: {}\n", fields.invoice_number));
    output.push_str(&format!("Symbol:  {}\n", fields.invoice_symbol));
    output.push_str(&format!("Date:    {}\n", fields.date));
    output.push_str(&format!("Seller:  {}\n", fields.seller));
    output.push_str(&format!("Buyer:   {}\n", fields.buyer));
    output.push('\n');

    output.push_str(&format!(
        "Pre-tax: {}{}\n",
        format_vnd(fields.pre_tax_amount),
        if r.pre_tax_derived { " (derived)" } else { "" }
    ));
    output.push_str(&format!(
        "Tax:     {}{}\n",
        format_vnd(fields.tax_amount),
        if r.tax_derived { " (derived)" } else { "" }
    ));
    output.push_str(&format!(
        "Total:   {}{}\n",
        format_vnd(fields.total_amount),
        if r.total_from_max { " (largest amount)" } else { "" }
    ));
    output.push('\n');

    if r.verdict.matched {
        output.push_str(&format!("{} Amounts match the total\n", style("✓").green()));
    } else {
        output.push_str(&format!(
            "{} Amounts differ from the total by {}\n",
            style("✗").red(),
            format_vnd(r.verdict.difference)
        ));
    }

    output
}

fn format_csv(r: &Reconciliation) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    let fields = &r.fields;

    wtr.write_record([
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
    ])?;

    wtr.write_record([
        fields.invoice_number.as_str(),
        fields.invoice_symbol.as_str(),
        fields.date.as_str(),
        fields.seller.as_str(),
        fields.buyer.as_str(),
        &fields.pre_tax_amount.to_string(),
        &fields.tax_amount.to_string(),
        &fields.total_amount.to_string(),
        &r.verdict.matched.to_string(),
        &r.verdict.difference.to_string(),
    ])?;

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}
