//! Burden ratio models
//!
//! A household configures how shared spending is split between members and
//! versions that split by effective month. Each ratio holds one detail row per
//! member; the detail percentages are expected to sum to 100.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use super::ids::{HouseholdId, MemberId};
use super::month::YearMonth;

/// One member's percentage within a burden ratio
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BurdenRatioDetail {
    pub member_id: MemberId,
    pub percentage: Decimal,
}

impl BurdenRatioDetail {
    pub fn new(member_id: MemberId, percentage: Decimal) -> Self {
        Self {
            member_id,
            percentage,
        }
    }
}

/// A household's split, effective for one month
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BurdenRatio {
    pub household_id: HouseholdId,
    pub effective_month: YearMonth,
    pub details: Vec<BurdenRatioDetail>,
}

impl BurdenRatio {
    /// Allowed distance of the percentage total from 100
    pub fn tolerance() -> Decimal {
        Decimal::new(1, 2)
    }

    pub fn new(household_id: HouseholdId, effective_month: YearMonth) -> Self {
        Self {
            household_id,
            effective_month,
            details: Vec::new(),
        }
    }

    /// Builder-style detail insertion
    pub fn with_detail(mut self, member_id: MemberId, percentage: Decimal) -> Self {
        self.details.push(BurdenRatioDetail::new(member_id, percentage));
        self
    }

    /// Sum of all detail percentages, or `None` if it overflows
    pub fn total_percentage(&self) -> Option<Decimal> {
        self.details
            .iter()
            .try_fold(Decimal::ZERO, |acc, d| acc.checked_add(d.percentage))
    }

    /// The percentage configured for a member, if any
    pub fn percentage_for(&self, member_id: MemberId) -> Option<Decimal> {
        self.details
            .iter()
            .find(|d| d.member_id == member_id)
            .map(|d| d.percentage)
    }

    /// Validate the ratio the way the ratio editor does before saving
    pub fn validate(&self) -> Result<(), RatioValidationError> {
        if self.details.is_empty() {
            return Err(RatioValidationError::NoDetails);
        }

        let mut seen = HashSet::new();
        for detail in &self.details {
            if detail.percentage < Decimal::ZERO {
                return Err(RatioValidationError::NegativePercentage(detail.member_id));
            }
            if !seen.insert(detail.member_id) {
                return Err(RatioValidationError::DuplicateMember(detail.member_id));
            }
        }

        let total = self
            .total_percentage()
            .ok_or(RatioValidationError::TotalOverflow)?;
        if (total - Decimal::ONE_HUNDRED).abs() > Self::tolerance() {
            return Err(RatioValidationError::TotalNotHundred(total));
        }

        Ok(())
    }
}

impl fmt::Display for BurdenRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .details
            .iter()
            .map(|d| format!("{}={}%", d.member_id, d.percentage.normalize()))
            .collect();
        write!(f, "{} [{}]", self.effective_month, parts.join(", "))
    }
}

/// Validation errors for burden ratios
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RatioValidationError {
    NoDetails,
    NegativePercentage(MemberId),
    DuplicateMember(MemberId),
    TotalNotHundred(Decimal),
    TotalOverflow,
}

impl fmt::Display for RatioValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoDetails => write!(f, "Burden ratio has no member percentages"),
            Self::NegativePercentage(member) => {
                write!(f, "Percentage for {} cannot be negative", member)
            }
            Self::DuplicateMember(member) => {
                write!(f, "{} appears more than once in the ratio", member)
            }
            Self::TotalNotHundred(total) => {
                write!(f, "Percentages sum to {}, expected 100", total.normalize())
            }
            Self::TotalOverflow => write!(f, "Percentages are too large to sum"),
        }
    }
}

impl std::error::Error for RatioValidationError {}
