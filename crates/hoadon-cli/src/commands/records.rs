//! Record commands - list saved invoices and apply administrative
//! transitions.

use clap::Args;
use console::style;

use hoadon_core::invoice::rules::format_vnd;
use hoadon_core::{approve_edit, reject_edit, InvoiceRecord, InvoiceStore};

use super::{load_config, open_store};

/// Arguments for the list command.
#[derive(Args)]
pub struct ListArgs {
    /// Include deleted invoices
    #[arg(short, long)]
    all: bool,
}

/// Arguments for commands acting on one invoice.
#[derive(Args)]
pub struct IdArgs {
    /// Invoice id
    id: u64,
}

pub fn list(args: ListArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let store = open_store(&config);

    let records: Vec<InvoiceRecord> = store
        .list()?
        .into_iter()
        .filter(|r| args.all || r.is_active())
        .collect();

    if records.is_empty() {
        println!("{} No invoices saved", style("ℹ").blue());
        return Ok(());
    }

    println!(
        "{:>4}  {:<4} {:<10}  {:<10} {:<8} {:<30} {:>14}  {:<8} {}",
        "ID", "TYPE", "DATE", "SYMBOL", "NUMBER", "SELLER", "TOTAL", "STATUS", "EDITS"
    );
    for r in &records {
        let status = if r.is_active() {
            style(r.status.as_str()).green()
        } else {
            style(r.status.as_str()).red()
        };
        let pending = if r.request_edit {
            style(" pending").yellow().to_string()
        } else {
            String::new()
        };

        println!(
            "{:>4}  {:<4} {:<10}  {:<10} {:<8} {:<30} {:>14}  {:<8} {}{}",
            r.id,
            r.invoice_type,
            r.date,
            r.invoice_symbol,
            r.invoice_number,
            truncate(&r.seller_name, 30),
            format_vnd(r.total_amount),
            status,
            r.edit_count,
            pending
        );
    }

    Ok(())
}

pub fn approve(args: IdArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let mut store = open_store(&config);

    let mut record = store.get(args.id)?;
    approve_edit(&mut record)?;
    store.update(&record)?;

    println!(
        "{} Approved edits for invoice #{}",
        style("✓").green(),
        record.id
    );
    Ok(())
}

pub fn reject(args: IdArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let mut store = open_store(&config);

    let mut record = store.get(args.id)?;
    reject_edit(&mut record)?;
    store.update(&record)?;

    println!(
        "{} Rejected edit request for invoice #{}",
        style("✓").green(),
        record.id
    );
    Ok(())
}

pub fn delete(args: IdArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let mut store = open_store(&config);

    let record = store.mark_deleted(args.id)?;

    println!("{} Deleted invoice #{}", style("✓").green(), record.id);
    Ok(())
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let mut out: String = s.chars().take(max - 1).collect();
        out.push('…');
        out
    }
}
