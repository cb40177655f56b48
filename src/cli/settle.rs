//! `settle` command

use std::path::PathBuf;

use clap::Args;

use super::{member_label, write_output, Workspace};
use crate::error::{ShareError, ShareResult};
use crate::models::YearMonth;
use crate::reports::SettlementReport;
use crate::services::process_batch;
use crate::storage::load_results;

/// Arguments for `settle`
#[derive(Args, Debug)]
pub struct SettleArgs {
    /// Month to settle (YYYY-MM)
    pub month: YearMonth,

    /// Use the saved results instead of recomputing from the snapshot
    #[arg(long)]
    pub saved: bool,

    /// Export to a CSV file
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Print or export each member's position for a month
pub fn handle_settle_command(ws: &Workspace, args: SettleArgs) -> ShareResult<()> {
    let snapshot = ws.load_snapshot()?;
    let ctx = ws.context(&snapshot)?;

    let processed = if args.saved {
        let results = load_results(&ws.paths.results_dir(), args.month)?.ok_or_else(|| {
            ShareError::NotFound {
                entity_type: "Results",
                identifier: args.month.to_string(),
            }
        })?;
        if results.household_id != ctx.household_id {
            return Err(ShareError::Storage(format!(
                "Saved results for {} belong to {}",
                args.month, results.household_id
            )));
        }
        results.transactions
    } else {
        process_batch(&ctx, &snapshot.transactions_in(args.month), &snapshot.overrides).processed
    };

    let report = SettlementReport::generate(args.month, &ctx.members, &processed);

    match args.output {
        Some(path) => write_output(Some(path.as_path()), |w| report.export_csv(w)),
        None => {
            let symbol = ws.symbol().to_string();
            print!(
                "{}",
                report.format_terminal(|id| member_label(&snapshot, id), &symbol)
            );
            Ok(())
        }
    }
}
