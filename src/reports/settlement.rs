//! Monthly settlement report
//!
//! Totals each member's position for a month from processed transactions:
//! what they carry of shared spending, what they advanced for others and
//! what they owe back for advances made by someone else.

use std::collections::BTreeMap;
use std::io::Write;

use crate::error::{ShareError, ShareResult};
use crate::models::{MemberId, Money, ProcessingStatus, YearMonth};
use crate::services::{ProcessedTransaction, ShareOutcome};

/// One member's position for the month
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberSettlement {
    pub member_id: MemberId,
    /// Sum of household-share portions
    pub household_burden: Money,
    /// Gross amount of advance payments this member made
    pub advances_paid: Money,
    /// What other members owe this member for those advances
    pub receivable: Money,
    /// What this member owes for advances made by others
    pub debts_owed: Money,
}

impl MemberSettlement {
    fn new(member_id: MemberId) -> Self {
        Self {
            member_id,
            household_burden: Money::zero(),
            advances_paid: Money::zero(),
            receivable: Money::zero(),
            debts_owed: Money::zero(),
        }
    }

    /// Positive when others owe this member
    pub fn net_balance(&self) -> Money {
        self.receivable - self.debts_owed
    }
}

/// Settlement Report
#[derive(Debug, Clone)]
pub struct SettlementReport {
    pub month: YearMonth,
    /// Sorted by member id
    pub members: Vec<MemberSettlement>,
    /// Total of household-share transactions
    pub total_shared: Money,
    pub shared_count: usize,
    pub advance_count: usize,
    pub excluded_count: usize,
    /// Rows the calculator rejected
    pub failed_count: usize,
}

impl SettlementReport {
    /// Aggregate the rows of `processed` dated in `month`
    ///
    /// Every id in `members` gets a row even without activity; members only
    /// seen in shares are added too.
    pub fn generate(
        month: YearMonth,
        members: &[MemberId],
        processed: &[ProcessedTransaction],
    ) -> Self {
        let mut rows: BTreeMap<MemberId, MemberSettlement> = members
            .iter()
            .map(|&id| (id, MemberSettlement::new(id)))
            .collect();
        let mut report = Self {
            month,
            members: Vec::new(),
            total_shared: Money::zero(),
            shared_count: 0,
            advance_count: 0,
            excluded_count: 0,
            failed_count: 0,
        };

        for row in processed.iter().filter(|p| p.month == month) {
            let breakdown = match &row.outcome {
                ShareOutcome::Shared(breakdown) => breakdown,
                ShareOutcome::NotShared => {
                    report.excluded_count += 1;
                    continue;
                }
                ShareOutcome::Failed { .. } => {
                    report.failed_count += 1;
                    continue;
                }
            };

            match row.classification.status {
                ProcessingStatus::HouseholdShare => {
                    report.shared_count += 1;
                    report.total_shared += row.amount;
                    for share in &breakdown.shares {
                        entry(&mut rows, share.member_id).household_burden += share.amount;
                    }
                }
                ProcessingStatus::AdvancePayment => {
                    report.advance_count += 1;
                    let mut owed_to_payer = Money::zero();
                    for share in breakdown.shares.iter().filter(|s| s.amount.is_negative()) {
                        owed_to_payer += share.amount.abs();
                        entry(&mut rows, share.member_id).debts_owed += share.amount.abs();
                    }
                    if let Some(payer) = breakdown.payer {
                        let payer_row = entry(&mut rows, payer);
                        payer_row.advances_paid += row.amount;
                        payer_row.receivable += owed_to_payer;
                    }
                }
                _ => report.excluded_count += 1,
            }
        }

        report.members = rows.into_values().collect();
        report
    }

    pub fn member(&self, id: MemberId) -> Option<&MemberSettlement> {
        self.members.iter().find(|m| m.member_id == id)
    }

    /// Format the report for terminal display
    pub fn format_terminal(&self, name_of: impl Fn(MemberId) -> String, symbol: &str) -> String {
        let mut output = String::new();

        output.push_str(&format!("Settlement Report: {}\n", self.month));
        output.push_str(&"=".repeat(72));
        output.push('\n');
        output.push_str(&format!(
            "Shared spending: {} ({} transactions)\n",
            self.total_shared.format_with_symbol(symbol),
            self.shared_count
        ));
        output.push_str(&format!(
            "Advances: {}  Excluded: {}  Failed: {}\n\n",
            self.advance_count, self.excluded_count, self.failed_count
        ));

        output.push_str(&format!(
            "{:<16} {:>12} {:>12} {:>12} {:>12}\n",
            "Member", "Burden", "Advanced", "Owes", "Net"
        ));
        output.push_str(&"-".repeat(72));
        output.push('\n');

        for row in &self.members {
            output.push_str(&format!(
                "{:<16} {:>12} {:>12} {:>12} {:>12}\n",
                name_of(row.member_id),
                row.household_burden.format_with_symbol(symbol),
                row.advances_paid.format_with_symbol(symbol),
                row.debts_owed.format_with_symbol(symbol),
                row.net_balance().format_with_symbol(symbol)
            ));
        }

        output
    }

    /// Export the report to CSV
    pub fn export_csv<W: Write>(&self, writer: W) -> ShareResult<()> {
        let mut csv = csv::Writer::from_writer(writer);
        csv.write_record([
            "month",
            "member_id",
            "household_burden",
            "advances_paid",
            "receivable",
            "debts_owed",
            "net_balance",
        ])?;

        for row in &self.members {
            csv.write_record([
                self.month.to_string(),
                row.member_id.get().to_string(),
                row.household_burden.yen().to_string(),
                row.advances_paid.yen().to_string(),
                row.receivable.yen().to_string(),
                row.debts_owed.yen().to_string(),
                row.net_balance().yen().to_string(),
            ])?;
        }

        csv.flush()
            .map_err(|e| ShareError::Export(format!("Failed to flush CSV: {}", e)))
    }
}

fn entry(rows: &mut BTreeMap<MemberId, MemberSettlement>, id: MemberId) -> &mut MemberSettlement {
    rows.entry(id).or_insert_with(|| MemberSettlement::new(id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        AdvanceDebtBasis, BurdenRatio, Category, CategoryId, CostType, HouseholdId, Money,
        Transaction,
    };
    use crate::services::{process_batch, ClassificationPrecedence, HouseholdContext};
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    fn m(id: i64) -> MemberId {
        MemberId::new(id)
    }

    fn january() -> YearMonth {
        YearMonth::new(2025, 1).unwrap()
    }

    fn processed() -> Vec<ProcessedTransaction> {
        let ctx = HouseholdContext {
            household_id: HouseholdId::new(1),
            members: vec![m(1), m(2)],
            categories: vec![
                Category::new(CategoryId::new(1), "食費", "食料品", CostType::Variable),
                Category::new(CategoryId::new(2), "立替", "旅行", CostType::Advance),
            ],
            exclusion_rules: vec![],
            aliases: vec![],
            ratios: vec![BurdenRatio::new(HouseholdId::new(1), january())
                .with_detail(m(1), Decimal::from(60))
                .with_detail(m(2), Decimal::from(40))],
            precedence: ClassificationPrecedence::default(),
            advance_basis: AdvanceDebtBasis::PortionOwed,
        };

        let day = |d| NaiveDate::from_ymd_opt(2025, 1, d).unwrap();
        let mut groceries = Transaction::new("MF-1", day(3), Money::from_yen(-10000));
        groceries.category_id = Some(CategoryId::new(1));
        let mut trip = Transaction::new("MF-2", day(9), Money::from_yen(-5000));
        trip.category_id = Some(CategoryId::new(2));
        let mut transfer = Transaction::new("MF-3", day(20), Money::from_yen(-7000));
        transfer.is_transfer = true;
        let mut february = Transaction::new(
            "MF-4",
            NaiveDate::from_ymd_opt(2025, 2, 1).unwrap(),
            Money::from_yen(-999),
        );
        february.category_id = Some(CategoryId::new(1));

        process_batch(&ctx, &[groceries, trip, transfer, february], &[]).processed
    }

    #[test]
    fn test_generate_settlement() {
        let report = SettlementReport::generate(january(), &[m(1), m(2)], &processed());

        assert_eq!(report.total_shared, Money::from_yen(10000));
        assert_eq!(report.shared_count, 1);
        assert_eq!(report.advance_count, 1);
        assert_eq!(report.excluded_count, 1);
        assert_eq!(report.failed_count, 0);

        let first = report.member(m(1)).unwrap();
        assert_eq!(first.household_burden, Money::from_yen(6000));
        assert_eq!(first.advances_paid, Money::from_yen(5000));
        assert_eq!(first.receivable, Money::from_yen(2000));
        assert_eq!(first.net_balance(), Money::from_yen(2000));

        let second = report.member(m(2)).unwrap();
        assert_eq!(second.household_burden, Money::from_yen(4000));
        assert_eq!(second.debts_owed, Money::from_yen(2000));
        assert_eq!(second.net_balance(), Money::from_yen(-2000));
    }

    #[test]
    fn test_idle_members_still_listed() {
        let report = SettlementReport::generate(january(), &[m(1), m(2), m(3)], &[]);
        assert_eq!(report.members.len(), 3);
        assert!(report.member(m(3)).unwrap().net_balance().is_zero());
    }

    #[test]
    fn test_format_terminal() {
        let report = SettlementReport::generate(january(), &[m(1), m(2)], &processed());
        let output = report.format_terminal(|id| id.to_string(), "¥");
        assert!(output.contains("Settlement Report: 2025-01"));
        assert!(output.contains("member-2"));
        assert!(output.contains("¥6,000"));
    }

    #[test]
    fn test_export_csv() {
        let report = SettlementReport::generate(january(), &[m(1), m(2)], &processed());
        let mut buf = Vec::new();
        report.export_csv(&mut buf).unwrap();

        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1], "2025-01,1,6000,5000,2000,0,2000");
        assert_eq!(lines[2], "2025-01,2,4000,0,0,2000,-2000");
    }
}
