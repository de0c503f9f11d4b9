//! Save command - run a review session for one invoice and persist it.

use std::path::PathBuf;

use clap::Args;
use console::style;
use rust_decimal::Decimal;
use tracing::info;

use hoadon_core::invoice::rules::format_vnd;
use hoadon_core::{analyze_document, InvoiceType, RecordDraft, Refusal, ReviewSession, SaveError};

use super::{file_name, load_config, open_store, parse_amount, read_document, resolve_mode};

/// Arguments for the save command.
#[derive(Args)]
pub struct SaveArgs {
    /// Input file (PDF or text)
    #[arg(required = true)]
    input: PathBuf,

    /// Invoice direction: in (purchase) or out (sales)
    #[arg(short = 't', long = "type", value_parser = parse_invoice_type)]
    invoice_type: InvoiceType,

    /// Memo (default: the file name)
    #[arg(short, long)]
    memo: Option<String>,

    /// Replace the amounts: PRE_TAX TAX. Repeat for further edits.
    #[arg(long, num_args = 2, value_names = ["PRE_TAX", "TAX"], value_parser = parse_amount)]
    edit: Vec<Decimal>,

    /// Ask an administrator for more edits once none remain
    #[arg(long)]
    escalate: bool,

    /// Take the largest amount in the document as the total
    #[arg(long)]
    deep: bool,

    /// Override the extracted date
    #[arg(long)]
    date: Option<String>,

    /// Override the extracted invoice number
    #[arg(long)]
    number: Option<String>,

    /// Override the extracted invoice symbol
    #[arg(long)]
    symbol: Option<String>,

    /// Override the extracted seller
    #[arg(long)]
    seller: Option<String>,

    /// Override the extracted buyer
    #[arg(long)]
    buyer: Option<String>,
}

fn parse_invoice_type(s: &str) -> Result<InvoiceType, String> {
    s.parse()
}

pub fn run(args: SaveArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let mode = resolve_mode(args.deep, &config);

    let Some(document) = read_document(&args.input, &config)? else {
        anyhow::bail!("Nothing saved: {} could not be read", args.input.display());
    };

    let mut session = ReviewSession::new(analyze_document(&document, mode));
    info!(
        "Reviewing {} (total {})",
        args.input.display(),
        session.extracted_total()
    );

    for amounts in args.edit.chunks_exact(2) {
        if let Err(refusal) = apply_edit(&mut session, amounts[0], amounts[1]) {
            eprintln!("{} Edit refused: {}", style("⚠").yellow(), refusal);
            break;
        }
    }

    if args.escalate {
        match session.escalate() {
            Ok(()) => println!(
                "{} Edit approval requested; the record is saved as pending",
                style("ℹ").blue()
            ),
            Err(refusal) => eprintln!("{} Escalation refused: {}", style("⚠").yellow(), refusal),
        }
    }

    let mut draft = RecordDraft::from_fields(session.fields(), args.invoice_type)
        .with_memo(args.memo.as_deref(), &file_name(&args.input));
    apply_overrides(&mut draft, &args);

    let mut store = open_store(&config);
    let record = match session.save(draft, &mut store) {
        Ok(record) => record,
        Err(SaveError::Refused(refusal)) => anyhow::bail!("Not saved: {}", refusal),
        Err(e) => return Err(e.into()),
    };

    println!(
        "{} Saved invoice #{} ({} {}/{}, total {})",
        style("✓").green(),
        record.id,
        record.invoice_type,
        record.invoice_symbol,
        record.invoice_number,
        format_vnd(record.total_amount)
    );
    if record.request_edit {
        println!("   {}", style("pending edit approval").yellow());
    }

    Ok(())
}

/// One unlock-and-confirm cycle, reporting the verdict and whether each
/// typed amount appears in the document.
fn apply_edit(session: &mut ReviewSession, pre_tax: Decimal, tax: Decimal) -> Result<(), Refusal> {
    session.request_edit()?;
    let verdict = session.confirm_amounts(pre_tax, tax)?;

    for (label, amount) in [("pre-tax", pre_tax), ("tax", tax)] {
        if !session.check_exists(amount) {
            eprintln!(
                "{} {} amount {} does not appear in the document",
                style("⚠").yellow(),
                label,
                format_vnd(amount)
            );
        }
    }

    if verdict.matched {
        println!("{} Edited amounts match the document total", style("✓").green());
    } else {
        println!(
            "{} Edited amounts differ from the document total by {}",
            style("✗").red(),
            format_vnd(verdict.difference)
        );
    }

    if let Some(warning) = session.warning() {
        println!("{} {}", style("ℹ").blue(), warning);
    }

    Ok(())
}

fn apply_overrides(draft: &mut RecordDraft, args: &SaveArgs) {
    let overrides = [
        (&mut draft.date, &args.date),
        (&mut draft.invoice_number, &args.number),
        (&mut draft.invoice_symbol, &args.symbol),
        (&mut draft.seller, &args.seller),
        (&mut draft.buyer, &args.buyer),
    ];

    for (field, value) in overrides {
        if let Some(value) = value {
            *field = value.trim().to_string();
        }
    }
}
