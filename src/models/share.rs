//! Share overrides and computed shares
//!
//! `ShareOverride` is the record that crosses the boundary with the override
//! endpoints unchanged:
//! `{ "externalId": string, "memberId": int, "kind": "PERCENT" | "FIXED_AMOUNT", "value": number }`.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::{ExternalId, MemberId};
use super::money::Money;

/// How an override value is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OverrideKind {
    /// Percentage of the transaction amount
    Percent,
    /// Whole-yen amount
    FixedAmount,
}

impl fmt::Display for OverrideKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Percent => write!(f, "PERCENT"),
            Self::FixedAmount => write!(f, "FIXED_AMOUNT"),
        }
    }
}

/// A manual per-transaction, per-member correction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareOverride {
    pub external_id: ExternalId,
    pub member_id: MemberId,
    pub kind: OverrideKind,
    #[serde(with = "rust_decimal::serde::float")]
    pub value: Decimal,
}

impl ShareOverride {
    pub fn percent(external_id: impl Into<ExternalId>, member_id: MemberId, value: Decimal) -> Self {
        Self {
            external_id: external_id.into(),
            member_id,
            kind: OverrideKind::Percent,
            value,
        }
    }

    pub fn fixed(external_id: impl Into<ExternalId>, member_id: MemberId, amount: Money) -> Self {
        Self {
            external_id: external_id.into(),
            member_id,
            kind: OverrideKind::FixedAmount,
            value: amount.to_decimal(),
        }
    }

    /// Whether this override can designate an advance-payment payer
    pub fn is_positive(&self) -> bool {
        self.value > Decimal::ZERO
    }
}

/// One member's signed portion of a transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComputedShare {
    pub member_id: MemberId,
    pub amount: Money,
}

impl ComputedShare {
    pub fn new(member_id: MemberId, amount: Money) -> Self {
        Self { member_id, amount }
    }
}

impl fmt::Display for ComputedShare {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.member_id, self.amount)
    }
}

/// Where the default (non-overridden) portions came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShareBasis {
    /// The month's burden ratio
    Ratio,
    /// No ratio was available; members split equally
    EqualSplit,
}

/// What non-payers carry for an advance payment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AdvanceDebtBasis {
    /// Each non-payer owes their own ratio portion; the payer absorbs theirs
    #[default]
    PortionOwed,
    /// Non-payers owe the whole amount between them, weighted by their portions
    FullReimbursement,
}

/// The calculator's result for one transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareBreakdown {
    /// Shares sorted by member id
    pub shares: Vec<ComputedShare>,
    pub basis: ShareBasis,
    /// Members whose share came from an override
    pub overridden: Vec<MemberId>,
    /// Set for advance payments only
    pub payer: Option<MemberId>,
}

impl ShareBreakdown {
    /// Sum of all signed shares
    pub fn total(&self) -> Money {
        self.shares.iter().map(|s| s.amount).sum()
    }

    /// The share computed for a member
    pub fn share_of(&self, member_id: MemberId) -> Option<Money> {
        self.shares
            .iter()
            .find(|s| s.member_id == member_id)
            .map(|s| s.amount)
    }
}
