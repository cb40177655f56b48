//! Batch driver for import and override endpoints
//!
//! Wires the classifier, ratio resolver and share calculator together for a
//! whole batch. The household configuration is passed in explicitly as a
//! [`HouseholdContext`]; nothing here reads process-wide state.
//!
//! Transactions are independent of each other. A failing transaction is
//! recorded in its own outcome and never aborts the batch.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

use crate::error::{ShareError, ShareResult};
use crate::models::{
    AdvanceDebtBasis, BurdenRatio, Category, CategoryId, ExclusionRule, ExternalId, HouseholdId,
    MemberId, Money, ShareBreakdown, ShareOverride, Transaction, UserAlias, YearMonth,
};

use super::classifier::{
    classify, Classification, ClassificationContext, ClassificationPrecedence, ClassifyInput,
};
use super::ratio::{resolve_ratio, resolve_ratio_required};
use super::shares::{compute_shares, ShareInput};

/// Everything the engine needs to know about one household
#[derive(Debug, Clone)]
pub struct HouseholdContext {
    pub household_id: HouseholdId,
    pub members: Vec<MemberId>,
    pub categories: Vec<Category>,
    pub exclusion_rules: Vec<ExclusionRule>,
    pub aliases: Vec<UserAlias>,
    /// Ratio history of this household only
    pub ratios: Vec<BurdenRatio>,
    pub precedence: ClassificationPrecedence,
    pub advance_basis: AdvanceDebtBasis,
}

impl HouseholdContext {
    /// Look up a transaction's category; dangling references resolve to None
    pub fn category(&self, id: Option<CategoryId>) -> Option<&Category> {
        id.and_then(|id| self.categories.iter().find(|c| c.id == id))
    }

    pub fn classification_context(&self) -> ClassificationContext<'_> {
        ClassificationContext {
            aliases: &self.aliases,
            exclusion_rules: &self.exclusion_rules,
            precedence: &self.precedence,
        }
    }

    /// Classify one transaction
    pub fn classify(&self, txn: &Transaction) -> Classification {
        let category = self.category(txn.category_id);
        classify(
            &ClassifyInput::from_transaction(txn, category),
            &self.classification_context(),
        )
    }
}

/// What happened to a transaction's shares
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ShareOutcome {
    /// Excluded by the classifier; no shares
    NotShared,
    /// Shares computed
    Shared(ShareBreakdown),
    /// The calculator rejected the input
    Failed { field: String, message: String },
}

impl ShareOutcome {
    fn from_result(result: ShareResult<ShareBreakdown>) -> Self {
        match result {
            Ok(breakdown) => Self::Shared(breakdown),
            Err(ShareError::Validation { field, message }) => Self::Failed { field, message },
            Err(other) => Self::Failed {
                field: String::new(),
                message: other.to_string(),
            },
        }
    }

    pub fn breakdown(&self) -> Option<&ShareBreakdown> {
        match self {
            Self::Shared(breakdown) => Some(breakdown),
            _ => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

/// A classified transaction and its shares, keyed for upsert by external id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessedTransaction {
    pub external_id: ExternalId,
    pub date: NaiveDate,
    pub month: YearMonth,
    pub description: String,
    /// Absolute amount the shares are computed from
    pub amount: Money,
    pub classification: Classification,
    /// True when the transaction needed a split but no ratio was configured
    pub configuration_gap: bool,
    pub outcome: ShareOutcome,
}

/// Result of processing a batch
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchReport {
    pub processed: Vec<ProcessedTransaction>,
    /// Rows replaced by a later row with the same external id
    pub duplicates_replaced: usize,
    /// Months that needed a ratio and had none
    pub configuration_gaps: Vec<YearMonth>,
}

impl BatchReport {
    pub fn shared_count(&self) -> usize {
        self.processed
            .iter()
            .filter(|p| p.outcome.breakdown().is_some())
            .count()
    }

    pub fn excluded_count(&self) -> usize {
        self.processed
            .iter()
            .filter(|p| p.outcome == ShareOutcome::NotShared)
            .count()
    }

    pub fn failed(&self) -> impl Iterator<Item = &ProcessedTransaction> {
        self.processed.iter().filter(|p| p.outcome.is_failed())
    }
}

/// Classify and split a batch of imported transactions
///
/// Rows sharing an external id are upserted: the last one wins and keeps the
/// position of the first.
pub fn process_batch(
    ctx: &HouseholdContext,
    transactions: &[Transaction],
    overrides: &[ShareOverride],
) -> BatchReport {
    let by_transaction = group_overrides(overrides);
    let mut report = BatchReport::default();
    let mut positions: HashMap<&ExternalId, usize> = HashMap::new();

    for txn in transactions {
        let tx_overrides = by_transaction
            .get(&txn.external_id)
            .map(Vec::as_slice)
            .unwrap_or(&[]);
        let processed = process_one(ctx, txn, tx_overrides);

        if let ShareOutcome::Failed { field, message } = &processed.outcome {
            tracing::debug!(
                external_id = %txn.external_id,
                %field,
                "share calculation rejected: {}",
                message
            );
        }

        match positions.get(&txn.external_id) {
            Some(&index) => {
                report.processed[index] = processed;
                report.duplicates_replaced += 1;
            }
            None => {
                positions.insert(&txn.external_id, report.processed.len());
                report.processed.push(processed);
            }
        }
    }

    let gaps: BTreeSet<YearMonth> = report
        .processed
        .iter()
        .filter(|p| p.configuration_gap)
        .map(|p| p.month)
        .collect();
    for month in &gaps {
        tracing::warn!(household = %ctx.household_id, %month, "no burden ratio configured");
    }
    report.configuration_gaps = gaps.into_iter().collect();

    tracing::info!(
        household = %ctx.household_id,
        transactions = report.processed.len(),
        shared = report.shared_count(),
        excluded = report.excluded_count(),
        failed = report.failed().count(),
        duplicates = report.duplicates_replaced,
        "processed batch"
    );

    report
}

fn process_one(
    ctx: &HouseholdContext,
    txn: &Transaction,
    overrides: &[ShareOverride],
) -> ProcessedTransaction {
    let classification = ctx.classify(txn);
    let month = txn.month();
    let mut configuration_gap = false;

    let outcome = if classification.status.requires_split() {
        let ratio = resolve_ratio(month, &ctx.ratios);
        configuration_gap = ratio.is_none();

        let result = share_amount(txn).and_then(|amount| {
            compute_shares(&ShareInput {
                amount,
                status: classification.status,
                month,
                members: &ctx.members,
                ratio,
                overrides,
                payer: None,
                advance_basis: ctx.advance_basis,
            })
        });
        ShareOutcome::from_result(result)
    } else {
        ShareOutcome::NotShared
    };

    ProcessedTransaction {
        external_id: txn.external_id.clone(),
        date: txn.date,
        month,
        description: txn.description.clone(),
        amount: txn.share_amount().unwrap_or(txn.amount),
        classification,
        configuration_gap,
        outcome,
    }
}

fn share_amount(txn: &Transaction) -> ShareResult<Money> {
    txn.share_amount().ok_or_else(|| {
        ShareError::validation("amount", format!("{} has no absolute value", txn.amount.yen()))
    })
}

fn group_overrides(overrides: &[ShareOverride]) -> HashMap<ExternalId, Vec<ShareOverride>> {
    let mut grouped: HashMap<ExternalId, Vec<ShareOverride>> = HashMap::new();
    for ov in overrides {
        grouped
            .entry(ov.external_id.clone())
            .or_default()
            .push(ov.clone());
    }
    grouped
}

/// Recompute shares from the month's default ratio, ignoring overrides
///
/// Unlike [`process_batch`], a missing ratio is an error here: the caller
/// asked for the default ratio specifically.
pub fn apply_default_ratio(
    ctx: &HouseholdContext,
    transactions: &[Transaction],
) -> Vec<(ExternalId, ShareResult<ShareBreakdown>)> {
    transactions
        .iter()
        .map(|txn| {
            let result = resolve_ratio_required(txn.month(), &ctx.ratios).and_then(|ratio| {
                let classification = ctx.classify(txn);
                let input = ShareInput {
                    amount: share_amount(txn)?,
                    status: classification.status,
                    month: txn.month(),
                    members: &ctx.members,
                    ratio: Some(ratio),
                    overrides: &[],
                    payer: None,
                    advance_basis: ctx.advance_basis,
                };
                compute_shares(&input)
            });
            (txn.external_id.clone(), result)
        })
        .collect()
}

/// Validate a manual override batch for one transaction and recompute it
pub fn save_override_batch(
    ctx: &HouseholdContext,
    txn: &Transaction,
    overrides: &[ShareOverride],
) -> ShareResult<ShareBreakdown> {
    if let Some((i, stray)) = overrides
        .iter()
        .enumerate()
        .find(|(_, ov)| ov.external_id != txn.external_id)
    {
        return Err(ShareError::validation(
            format!("overrides[{}].externalId", i),
            format!(
                "override for '{}' submitted with '{}'",
                stray.external_id, txn.external_id
            ),
        ));
    }

    let classification = ctx.classify(txn);
    let month = txn.month();
    let input = ShareInput {
        amount: share_amount(txn)?,
        status: classification.status,
        month,
        members: &ctx.members,
        ratio: resolve_ratio(month, &ctx.ratios),
        overrides,
        payer: None,
        advance_basis: ctx.advance_basis,
    };

    let breakdown = compute_shares(&input)?;
    tracing::info!(
        external_id = %txn.external_id,
        overrides = overrides.len(),
        "saved override batch"
    );
    Ok(breakdown)
}
