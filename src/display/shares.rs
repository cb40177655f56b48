//! Table rendering for classified transactions and their shares

use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::models::MemberId;
use crate::services::{ProcessedTransaction, ShareOutcome};

#[derive(Tabled)]
struct ClassificationRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Amount")]
    amount: String,
    #[tabled(rename = "Status")]
    status: &'static str,
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Note")]
    note: String,
}

#[derive(Tabled)]
struct ShareRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Member")]
    member: String,
    #[tabled(rename = "Share")]
    share: String,
    #[tabled(rename = "")]
    flags: String,
}

/// One row per transaction with its status and category
pub fn format_classification_table(processed: &[ProcessedTransaction], symbol: &str) -> String {
    if processed.is_empty() {
        return "No transactions found.\n".to_string();
    }

    let rows = processed.iter().map(|p| {
        let mut category = p.classification.category.to_string();
        if p.classification.uncategorized {
            category = format!("({})", p.classification.category.major_name);
        }

        let note = match (&p.outcome, p.classification.personal_member) {
            (ShareOutcome::Failed { field, message }, _) => format!("{}: {}", field, message),
            (_, Some(member)) => format!("personal to {}", member),
            _ if p.configuration_gap => "no ratio, split equally".to_string(),
            _ => String::new(),
        };

        ClassificationRow {
            id: p.external_id.to_string(),
            date: p.date.format("%Y-%m-%d").to_string(),
            amount: p.amount.format_with_symbol(symbol),
            status: p.classification.status.ledger_label(),
            category,
            note,
        }
    });

    let mut table = Table::new(rows);
    table.with(Style::rounded());
    format!("{}\n", table)
}

/// One row per member share; overridden shares and the payer are flagged
pub fn format_shares_table(
    processed: &[ProcessedTransaction],
    symbol: &str,
    name_of: &dyn Fn(MemberId) -> String,
) -> String {
    let mut rows = Vec::new();
    for p in processed {
        let Some(breakdown) = p.outcome.breakdown() else {
            continue;
        };
        for share in &breakdown.shares {
            let mut flags = Vec::new();
            if breakdown.payer == Some(share.member_id) {
                flags.push("payer");
            }
            if breakdown.overridden.contains(&share.member_id) {
                flags.push("override");
            }
            rows.push(ShareRow {
                id: p.external_id.to_string(),
                member: name_of(share.member_id),
                share: share.amount.format_with_symbol(symbol),
                flags: flags.join(", "),
            });
        }
    }

    if rows.is_empty() {
        return "No shares computed.\n".to_string();
    }

    let mut table = Table::new(rows);
    table.with(Style::rounded());
    format!("{}\n", table)
}
