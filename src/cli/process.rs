//! `process` and `classify` commands

use std::io::Write;
use std::path::PathBuf;

use clap::Args;

use super::{member_label, select_transactions, write_output, OutputFormat, Workspace};
use crate::display::{format_classification_table, format_shares_table};
use crate::error::ShareResult;
use crate::export::{export_shares_csv, export_shares_json};
use crate::models::YearMonth;
use crate::services::{process_batch, ProcessedTransaction, ShareOutcome};
use crate::storage::persist_results;

/// Arguments for `process`
#[derive(Args, Debug)]
pub struct ProcessArgs {
    /// Only process transactions dated in this month (YYYY-MM)
    #[arg(short, long)]
    pub month: Option<YearMonth>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,

    /// Write output to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Don't persist results to the results directory
    #[arg(long)]
    pub dry_run: bool,
}

/// Arguments for `classify`
#[derive(Args, Debug)]
pub struct ClassifyArgs {
    /// Only classify transactions dated in this month (YYYY-MM)
    #[arg(short, long)]
    pub month: Option<YearMonth>,
}

/// Classify, split and persist the snapshot's transactions
pub fn handle_process_command(ws: &Workspace, args: ProcessArgs) -> ShareResult<()> {
    let snapshot = ws.load_snapshot()?;
    let ctx = ws.context(&snapshot)?;
    let transactions = select_transactions(&snapshot, args.month);

    let report = process_batch(&ctx, &transactions, &snapshot.overrides);

    if !args.dry_run && !report.processed.is_empty() {
        let months = persist_results(&ws.paths.results_dir(), ctx.household_id, &report.processed)?;
        for month in months {
            eprintln!("Saved results: {}", ws.paths.results_file(month).display());
        }
    }

    match args.format {
        OutputFormat::Table => {
            let name_of = |id| member_label(&snapshot, id);
            write_output(args.output.as_deref(), |w| {
                write!(w, "{}", format_classification_table(&report.processed, ws.symbol()))?;
                writeln!(w)?;
                write!(w, "{}", format_shares_table(&report.processed, ws.symbol(), &name_of))?;
                writeln!(
                    w,
                    "\n{} shared, {} excluded, {} failed",
                    report.shared_count(),
                    report.excluded_count(),
                    report.failed().count()
                )?;
                for month in &report.configuration_gaps {
                    writeln!(w, "warning: no burden ratio for {}; split equally", month)?;
                }
                Ok(())
            })?;
        }
        OutputFormat::Csv => {
            write_output(args.output.as_deref(), |w| export_shares_csv(&report.processed, w))?;
        }
        OutputFormat::Json => {
            write_output(args.output.as_deref(), |w| {
                export_shares_json(ctx.household_id, &report, w)
            })?;
        }
    }

    Ok(())
}

/// Show how each transaction is classified, without computing shares
pub fn handle_classify_command(ws: &Workspace, args: ClassifyArgs) -> ShareResult<()> {
    let snapshot = ws.load_snapshot()?;
    let ctx = ws.context(&snapshot)?;

    let rows: Vec<ProcessedTransaction> = select_transactions(&snapshot, args.month)
        .iter()
        .map(|txn| {
            let classification = ctx.classify(txn);
            ProcessedTransaction {
                external_id: txn.external_id.clone(),
                date: txn.date,
                month: txn.month(),
                description: txn.description.clone(),
                amount: txn.share_amount().unwrap_or(txn.amount),
                classification,
                configuration_gap: false,
                outcome: ShareOutcome::NotShared,
            }
        })
        .collect();

    print!("{}", format_classification_table(&rows, ws.symbol()));
    Ok(())
}
