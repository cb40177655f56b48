//! `ratio` commands

use std::collections::BTreeSet;
use std::io::Write;

use clap::Subcommand;

use super::{member_label, write_output, Workspace};
use crate::error::{ShareError, ShareResult};
use crate::models::YearMonth;
use crate::services::{apply_default_ratio, resolve_ratio};

/// Burden ratio subcommands
#[derive(Subcommand, Debug)]
pub enum RatioCommands {
    /// Validate configured ratios and list months that have none
    Check {
        /// Only check this month (YYYY-MM)
        #[arg(short, long)]
        month: Option<YearMonth>,
    },

    /// Recompute a month's shares from its ratio, ignoring manual overrides
    Apply {
        /// Month to recompute (YYYY-MM)
        month: YearMonth,
    },
}

/// Handle ratio commands
pub fn handle_ratio_command(ws: &Workspace, cmd: RatioCommands) -> ShareResult<()> {
    match cmd {
        RatioCommands::Check { month } => handle_check(ws, month),
        RatioCommands::Apply { month } => handle_apply(ws, month),
    }
}

fn handle_check(ws: &Workspace, month: Option<YearMonth>) -> ShareResult<()> {
    let snapshot = ws.load_snapshot()?;
    let ctx = ws.context(&snapshot)?;

    let mut invalid = 0;
    for ratio in ctx
        .ratios
        .iter()
        .filter(|r| month.map_or(true, |m| r.effective_month == m))
    {
        match ratio.validate() {
            Ok(()) => println!("ok       {}", ratio),
            Err(e) => {
                invalid += 1;
                println!("invalid  {}: {}", ratio, e);
            }
        }
        for member in &ctx.members {
            if ratio.percentage_for(*member).is_none() {
                println!(
                    "         {} has no percentage and carries nothing by default",
                    member_label(&snapshot, *member)
                );
            }
        }
    }

    let needed: BTreeSet<YearMonth> = snapshot
        .transactions
        .iter()
        .filter(|txn| month.map_or(true, |m| m.contains(txn.date)))
        .filter(|txn| ctx.classify(txn).status.requires_split())
        .map(|txn| txn.month())
        .collect();
    for gap in needed.iter().filter(|m| resolve_ratio(**m, &ctx.ratios).is_none()) {
        println!("missing  {} (shares fall back to an equal split)", gap);
    }

    if invalid > 0 {
        return Err(ShareError::validation(
            "ratios",
            format!("{} burden ratio(s) failed validation", invalid),
        ));
    }
    Ok(())
}

fn handle_apply(ws: &Workspace, month: YearMonth) -> ShareResult<()> {
    let snapshot = ws.load_snapshot()?;
    let ctx = ws.context(&snapshot)?;
    let transactions = snapshot.transactions_in(month);

    let results = apply_default_ratio(&ctx, &transactions);
    write_output(None, |w| {
        for (external_id, result) in &results {
            match result {
                Ok(breakdown) => {
                    let shares: Vec<String> = breakdown
                        .shares
                        .iter()
                        .map(|s| {
                            format!(
                                "{}={}",
                                member_label(&snapshot, s.member_id),
                                s.amount.format_with_symbol(ws.symbol())
                            )
                        })
                        .collect();
                    writeln!(w, "{:<16} {}", external_id.as_str(), shares.join("  "))?;
                }
                Err(e) if e.is_configuration_gap() => {
                    return Err(ShareError::ConfigurationGap { month });
                }
                Err(e) => writeln!(w, "{:<16} skipped: {}", external_id.as_str(), e)?,
            }
        }
        Ok(())
    })
}
