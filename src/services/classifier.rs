//! Transaction classifier
//!
//! Assigns exactly one [`ProcessingStatus`] to a transaction. The checks run
//! in a configurable precedence order and the first one that fires wins; a
//! transaction no check claims is shared by the household.
//!
//! Default order:
//!
//! 1. transfer flag → `ExcludedTransfer`
//! 2. not counted by the source → `ExcludedNotCalculationTarget`
//! 3. exclusion rule on the category → `ExcludedByRule(id)`
//! 4. memo names a member → `ExcludedPersonal`
//! 5. advance cost type → `AdvancePayment`
//! 6. otherwise → `HouseholdShare`

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::{
    Category, CategoryLabel, CostType, ExclusionRule, ExclusionRuleId, MemberId,
    ProcessingStatus, Transaction, UserAlias,
};

use super::matcher::{alias_owner, matches_exclusion};

/// One classification check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassificationCheck {
    Transfer,
    NotCalculationTarget,
    ExclusionRule,
    PersonalAlias,
    AdvanceCategory,
}

impl ClassificationCheck {
    /// All checks in the default precedence order
    pub fn all() -> &'static [Self] {
        &[
            Self::Transfer,
            Self::NotCalculationTarget,
            Self::ExclusionRule,
            Self::PersonalAlias,
            Self::AdvanceCategory,
        ]
    }
}

impl fmt::Display for ClassificationCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Transfer => "transfer",
            Self::NotCalculationTarget => "not_calculation_target",
            Self::ExclusionRule => "exclusion_rule",
            Self::PersonalAlias => "personal_alias",
            Self::AdvanceCategory => "advance_category",
        };
        f.write_str(name)
    }
}

/// The order checks are evaluated in
///
/// Always a permutation of [`ClassificationCheck::all`], so every check runs
/// and none runs twice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    try_from = "Vec<ClassificationCheck>",
    into = "Vec<ClassificationCheck>"
)]
pub struct ClassificationPrecedence(Vec<ClassificationCheck>);

impl ClassificationPrecedence {
    pub fn new(order: Vec<ClassificationCheck>) -> Result<Self, PrecedenceError> {
        for (i, check) in order.iter().enumerate() {
            if order[..i].contains(check) {
                return Err(PrecedenceError::Duplicate(*check));
            }
        }
        for check in ClassificationCheck::all() {
            if !order.contains(check) {
                return Err(PrecedenceError::Missing(*check));
            }
        }
        Ok(Self(order))
    }

    pub fn checks(&self) -> &[ClassificationCheck] {
        &self.0
    }
}

impl Default for ClassificationPrecedence {
    fn default() -> Self {
        Self(ClassificationCheck::all().to_vec())
    }
}

impl TryFrom<Vec<ClassificationCheck>> for ClassificationPrecedence {
    type Error = PrecedenceError;

    fn try_from(value: Vec<ClassificationCheck>) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ClassificationPrecedence> for Vec<ClassificationCheck> {
    fn from(precedence: ClassificationPrecedence) -> Self {
        precedence.0
    }
}

/// Error type for an invalid precedence order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrecedenceError {
    Duplicate(ClassificationCheck),
    Missing(ClassificationCheck),
}

impl fmt::Display for PrecedenceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Duplicate(check) => write!(f, "Check '{}' listed more than once", check),
            Self::Missing(check) => write!(f, "Check '{}' missing from precedence", check),
        }
    }
}

impl std::error::Error for PrecedenceError {}

/// The attributes of a transaction the classifier looks at
#[derive(Debug, Clone, Copy)]
pub struct ClassifyInput<'a> {
    pub is_transfer: bool,
    pub counts_toward_totals: bool,
    pub memo: &'a str,
    /// The resolved category; `None` if the row is uncategorized or the
    /// reference points at nothing
    pub category: Option<&'a Category>,
}

impl<'a> ClassifyInput<'a> {
    pub fn from_transaction(txn: &'a Transaction, category: Option<&'a Category>) -> Self {
        Self {
            is_transfer: txn.is_transfer,
            counts_toward_totals: txn.counts_toward_totals,
            memo: &txn.memo,
            category,
        }
    }
}

/// Household configuration the classifier consults
#[derive(Debug, Clone, Copy)]
pub struct ClassificationContext<'a> {
    pub aliases: &'a [UserAlias],
    pub exclusion_rules: &'a [ExclusionRule],
    pub precedence: &'a ClassificationPrecedence,
}

/// The classifier's verdict for one transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Classification {
    pub status: ProcessingStatus,
    pub applied_exclusion_rule_id: Option<ExclusionRuleId>,
    /// The member whose alias matched, for `ExcludedPersonal`
    pub personal_member: Option<MemberId>,
    /// The name pair used for matching
    pub category: CategoryLabel,
    /// True when the synthetic "uncategorized" bucket was substituted
    pub uncategorized: bool,
}

impl Classification {
    fn new(status: ProcessingStatus, category: CategoryLabel, uncategorized: bool) -> Self {
        Self {
            status,
            applied_exclusion_rule_id: None,
            personal_member: None,
            category,
            uncategorized,
        }
    }
}

/// Classify a transaction
///
/// Total over its domain: every input gets exactly one status.
pub fn classify(input: &ClassifyInput<'_>, ctx: &ClassificationContext<'_>) -> Classification {
    let (label, cost_type, uncategorized) = match input.category {
        Some(category) => (category.label(), category.cost_type, false),
        None => (CategoryLabel::uncategorized(), CostType::Variable, true),
    };

    for check in ctx.precedence.checks() {
        match check {
            ClassificationCheck::Transfer if input.is_transfer => {
                return Classification::new(ProcessingStatus::ExcludedTransfer, label, uncategorized);
            }
            ClassificationCheck::NotCalculationTarget if !input.counts_toward_totals => {
                return Classification::new(
                    ProcessingStatus::ExcludedNotCalculationTarget,
                    label,
                    uncategorized,
                );
            }
            ClassificationCheck::ExclusionRule => {
                if let Some(rule_id) =
                    matches_exclusion(&label.major_name, &label.minor_name, ctx.exclusion_rules)
                {
                    let mut result = Classification::new(
                        ProcessingStatus::ExcludedByRule(rule_id),
                        label,
                        uncategorized,
                    );
                    result.applied_exclusion_rule_id = Some(rule_id);
                    return result;
                }
            }
            ClassificationCheck::PersonalAlias => {
                if let Some(member) = alias_owner(input.memo, ctx.aliases) {
                    let mut result =
                        Classification::new(ProcessingStatus::ExcludedPersonal, label, uncategorized);
                    result.personal_member = Some(member);
                    return result;
                }
            }
            ClassificationCheck::AdvanceCategory if cost_type == CostType::Advance => {
                return Classification::new(ProcessingStatus::AdvancePayment, label, uncategorized);
            }
            _ => {}
        }
    }

    tracing::debug!(category = %label, "no exclusion applies; sharing with household");
    Classification::new(ProcessingStatus::HouseholdShare, label, uncategorized)
}
