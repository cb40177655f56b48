//! CSV export of computed shares
//!
//! One row per member share. Transactions without shares (excluded or
//! rejected) get a single row with the member columns left blank.

use std::io::Write;

use crate::error::ShareResult;
use crate::services::{ProcessedTransaction, ShareOutcome};

const HEADER: [&str; 13] = [
    "external_id",
    "date",
    "month",
    "status",
    "ledger_label",
    "major_category",
    "minor_category",
    "amount",
    "member_id",
    "share",
    "overridden",
    "payer",
    "error",
];

/// Write processed transactions as CSV
pub fn export_shares_csv<W: Write>(processed: &[ProcessedTransaction], writer: W) -> ShareResult<()> {
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(HEADER)?;

    for row in processed {
        let base = [
            row.external_id.to_string(),
            row.date.to_string(),
            row.month.to_string(),
            row.classification.status.to_string(),
            row.classification.status.ledger_label().to_string(),
            row.classification.category.major_name.clone(),
            row.classification.category.minor_name.clone(),
            row.amount.yen().to_string(),
        ];

        match &row.outcome {
            ShareOutcome::Shared(breakdown) => {
                let payer = breakdown
                    .payer
                    .map(|p| p.get().to_string())
                    .unwrap_or_default();
                for share in &breakdown.shares {
                    let mut record = base.to_vec();
                    record.extend([
                        share.member_id.get().to_string(),
                        share.amount.yen().to_string(),
                        breakdown.overridden.contains(&share.member_id).to_string(),
                        payer.clone(),
                        String::new(),
                    ]);
                    csv.write_record(&record)?;
                }
            }
            ShareOutcome::NotShared => {
                let mut record = base.to_vec();
                record.extend(std::iter::repeat(String::new()).take(5));
                csv.write_record(&record)?;
            }
            ShareOutcome::Failed { field, message } => {
                let mut record = base.to_vec();
                record.extend(std::iter::repeat(String::new()).take(4));
                record.push(format!("{}: {}", field, message));
                csv.write_record(&record)?;
            }
        }
    }

    csv.flush()?;
    Ok(())
}
