//! Transaction model
//!
//! An imported bank/card row as the import pipeline hands it over, plus the
//! processing status the classifier assigns to it.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::{CategoryId, ExclusionRuleId, ExternalId};
use super::money::Money;
use super::month::YearMonth;

/// How a transaction is processed for household accounting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "ruleId")]
pub enum ProcessingStatus {
    /// Split across all members by the default or overridden ratio (按分_家計)
    HouseholdShare,
    /// One member paid, the others owe back (按分_立替)
    AdvancePayment,
    /// Interbank or account transfer
    ExcludedTransfer,
    /// The source system flags the row as not counted
    ExcludedNotCalculationTarget,
    /// The category matches a household exclusion rule
    ExcludedByRule(ExclusionRuleId),
    /// The memo names a member; personal spending
    ExcludedPersonal,
}

impl ProcessingStatus {
    /// Whether the share calculator applies to this status
    pub fn requires_split(&self) -> bool {
        matches!(self, Self::HouseholdShare | Self::AdvancePayment)
    }

    /// Whether this status removes the transaction from household totals
    pub fn is_excluded(&self) -> bool {
        !self.requires_split()
    }

    /// The label the household ledger uses for this status
    pub fn ledger_label(&self) -> &'static str {
        match self {
            Self::HouseholdShare => "按分_家計",
            Self::AdvancePayment => "按分_立替",
            Self::ExcludedTransfer => "除外_振替",
            Self::ExcludedNotCalculationTarget => "除外_計算対象外",
            Self::ExcludedByRule(_) => "除外_ルール",
            Self::ExcludedPersonal => "除外_個人",
        }
    }
}

impl fmt::Display for ProcessingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HouseholdShare => write!(f, "Household share"),
            Self::AdvancePayment => write!(f, "Advance payment"),
            Self::ExcludedTransfer => write!(f, "Excluded (transfer)"),
            Self::ExcludedNotCalculationTarget => write!(f, "Excluded (not counted)"),
            Self::ExcludedByRule(id) => write!(f, "Excluded ({})", id),
            Self::ExcludedPersonal => write!(f, "Excluded (personal)"),
        }
    }
}

/// An imported transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// Stable key from the source export
    pub external_id: ExternalId,

    /// Transaction date
    pub date: NaiveDate,

    /// Description as printed by the bank
    #[serde(default)]
    pub description: String,

    /// Memo/notes
    #[serde(default)]
    pub memo: String,

    /// Amount (negative for outflow)
    pub amount: Money,

    /// Category reference (None if the export left it blank)
    #[serde(default)]
    pub category_id: Option<CategoryId>,

    /// Whether the row is a transfer between accounts
    #[serde(default)]
    pub is_transfer: bool,

    /// The source system's own "include in totals" flag
    #[serde(default = "default_counts_toward_totals")]
    pub counts_toward_totals: bool,
}

fn default_counts_toward_totals() -> bool {
    true
}

impl Transaction {
    /// Create a new counted, non-transfer transaction
    pub fn new(external_id: impl Into<ExternalId>, date: NaiveDate, amount: Money) -> Self {
        Self {
            external_id: external_id.into(),
            date,
            description: String::new(),
            memo: String::new(),
            amount,
            category_id: None,
            is_transfer: false,
            counts_toward_totals: true,
        }
    }

    /// The month used to resolve the burden ratio
    pub fn month(&self) -> YearMonth {
        YearMonth::from_date(self.date)
    }

    /// The amount handed to the share calculator
    ///
    /// `None` for an amount of `i64::MIN` yen, which has no absolute value.
    pub fn share_amount(&self) -> Option<Money> {
        self.amount.checked_abs()
    }
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}",
            self.date.format("%Y-%m-%d"),
            self.description,
            self.amount
        )
    }
}
