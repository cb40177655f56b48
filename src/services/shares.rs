//! Proportional share calculator
//!
//! Computes each member's signed share of a transaction the classifier marked
//! as shareable. All amounts are whole yen and every split goes through the
//! largest-remainder apportionment in [`super::apportion`], so household
//! shares always sum to the transaction amount.
//!
//! Household shares are non-negative. For advance payments the payer carries
//! `+amount` and every other member carries a non-positive debt; what the
//! debts add up to depends on [`AdvanceDebtBasis`].
//!
//! The calculation is all-or-nothing: invalid input yields a
//! `ShareError::Validation` naming the offending field and no shares.

use rust_decimal::Decimal;
use std::collections::HashSet;

use crate::error::{ShareError, ShareResult};
use crate::models::{
    AdvanceDebtBasis, BurdenRatio, ComputedShare, MemberId, Money, ProcessingStatus, ShareBasis,
    ShareBreakdown, ShareOverride, YearMonth,
};

use super::overrides::{reconcile, validate_overrides};

/// Everything the calculator needs for one transaction
#[derive(Debug, Clone, Copy)]
pub struct ShareInput<'a> {
    /// Absolute transaction amount
    pub amount: Money,
    pub status: ProcessingStatus,
    /// The transaction's month; must match the ratio's effective month
    pub month: YearMonth,
    pub members: &'a [MemberId],
    /// The ratio effective for `month`, if one is configured
    pub ratio: Option<&'a BurdenRatio>,
    /// Overrides for this transaction, at most one per member
    pub overrides: &'a [ShareOverride],
    /// Explicit advance-payment payer
    pub payer: Option<MemberId>,
    pub advance_basis: AdvanceDebtBasis,
}

impl<'a> ShareInput<'a> {
    /// Input for a household-shared transaction with no overrides
    pub fn household(
        amount: Money,
        month: YearMonth,
        members: &'a [MemberId],
        ratio: Option<&'a BurdenRatio>,
    ) -> Self {
        Self {
            amount,
            status: ProcessingStatus::HouseholdShare,
            month,
            members,
            ratio,
            overrides: &[],
            payer: None,
            advance_basis: AdvanceDebtBasis::default(),
        }
    }

    /// Input for an advance payment with no overrides
    pub fn advance(
        amount: Money,
        month: YearMonth,
        members: &'a [MemberId],
        ratio: Option<&'a BurdenRatio>,
    ) -> Self {
        Self {
            status: ProcessingStatus::AdvancePayment,
            ..Self::household(amount, month, members, ratio)
        }
    }

    pub fn with_overrides(mut self, overrides: &'a [ShareOverride]) -> Self {
        self.overrides = overrides;
        self
    }

    pub fn with_payer(mut self, payer: MemberId) -> Self {
        self.payer = Some(payer);
        self
    }

    pub fn with_advance_basis(mut self, basis: AdvanceDebtBasis) -> Self {
        self.advance_basis = basis;
        self
    }
}

/// Compute the shares for one transaction
pub fn compute_shares(input: &ShareInput<'_>) -> ShareResult<ShareBreakdown> {
    if input.amount.is_negative() {
        return Err(ShareError::validation(
            "amount",
            format!("amount {} must be the absolute value", input.amount),
        ));
    }
    if !input.status.requires_split() {
        return Err(ShareError::validation(
            "status",
            format!("'{}' transactions are not split", input.status),
        ));
    }

    let members = sorted_members(input.members)?;
    let weights = ratio_weights(input, &members)?;
    validate_overrides(&members, input.overrides)?;

    let basis = if weights.is_some() {
        ShareBasis::Ratio
    } else {
        ShareBasis::EqualSplit
    };

    let breakdown = match input.status {
        ProcessingStatus::AdvancePayment => advance_shares(input, &members, weights.as_deref(), basis)?,
        _ => household_shares(input, &members, weights.as_deref(), basis)?,
    };

    tracing::debug!(
        amount = input.amount.yen(),
        month = %input.month,
        basis = ?breakdown.basis,
        overridden = breakdown.overridden.len(),
        "computed shares"
    );

    Ok(breakdown)
}

fn household_shares(
    input: &ShareInput<'_>,
    members: &[MemberId],
    weights: Option<&[(MemberId, Decimal)]>,
    basis: ShareBasis,
) -> ShareResult<ShareBreakdown> {
    let overrides: Vec<&ShareOverride> = input.overrides.iter().collect();
    let reconciled = reconcile(input.amount, members, weights, &overrides)?;

    Ok(ShareBreakdown {
        shares: reconciled
            .portions
            .into_iter()
            .map(|(member, amount)| ComputedShare::new(member, amount))
            .collect(),
        basis,
        overridden: reconciled.overridden,
        payer: None,
    })
}

/// The payer fronts the whole amount; the payer's own override, if any, only
/// designates them and never feeds into the debts.
fn advance_shares(
    input: &ShareInput<'_>,
    members: &[MemberId],
    weights: Option<&[(MemberId, Decimal)]>,
    basis: ShareBasis,
) -> ShareResult<ShareBreakdown> {
    let payer = resolve_payer(input, members)?;
    let debtor_overrides: Vec<&ShareOverride> = input
        .overrides
        .iter()
        .filter(|ov| ov.member_id != payer)
        .collect();

    let (debts, overridden) = match input.advance_basis {
        AdvanceDebtBasis::PortionOwed => {
            let reconciled = reconcile(input.amount, members, weights, &debtor_overrides)?;
            let debts: Vec<(MemberId, Money)> = reconciled
                .portions
                .into_iter()
                .filter(|(member, _)| *member != payer)
                .collect();
            (debts, reconciled.overridden)
        }
        AdvanceDebtBasis::FullReimbursement => {
            let debtors: Vec<MemberId> = members.iter().copied().filter(|m| *m != payer).collect();
            if debtors.is_empty() {
                (Vec::new(), Vec::new())
            } else {
                let reconciled = reconcile(input.amount, &debtors, weights, &debtor_overrides)?;
                (reconciled.portions, reconciled.overridden)
            }
        }
    };

    let mut shares: Vec<ComputedShare> = debts
        .into_iter()
        .map(|(member, owed)| ComputedShare::new(member, -owed))
        .collect();
    shares.push(ComputedShare::new(payer, input.amount));
    shares.sort_by_key(|s| s.member_id);

    Ok(ShareBreakdown {
        shares,
        basis,
        overridden,
        payer: Some(payer),
    })
}

/// Explicit payer, else the member of the single positive override, else the
/// lowest member id
fn resolve_payer(input: &ShareInput<'_>, members: &[MemberId]) -> ShareResult<MemberId> {
    if let Some(payer) = input.payer {
        if !members.contains(&payer) {
            return Err(ShareError::validation(
                "payer",
                format!("{} is not a household member", payer),
            ));
        }
        return Ok(payer);
    }

    let positive: Vec<MemberId> = input
        .overrides
        .iter()
        .filter(|ov| ov.is_positive())
        .map(|ov| ov.member_id)
        .collect();

    match positive.as_slice() {
        [payer] => Ok(*payer),
        [] => members
            .first()
            .copied()
            .ok_or_else(|| ShareError::validation("members", "household has no members")),
        _ => Err(ShareError::validation(
            "overrides",
            "several positive overrides; the advance payer is ambiguous",
        )),
    }
}

fn sorted_members(members: &[MemberId]) -> ShareResult<Vec<MemberId>> {
    if members.is_empty() {
        return Err(ShareError::validation("members", "household has no members"));
    }

    let mut seen = HashSet::new();
    for member in members {
        if !seen.insert(*member) {
            return Err(ShareError::validation(
                "members",
                format!("{} listed more than once", member),
            ));
        }
    }

    let mut sorted = members.to_vec();
    sorted.sort();
    Ok(sorted)
}

/// Ratio percentages per member; members without a detail weigh zero
fn ratio_weights(
    input: &ShareInput<'_>,
    members: &[MemberId],
) -> ShareResult<Option<Vec<(MemberId, Decimal)>>> {
    let Some(ratio) = input.ratio else {
        return Ok(None);
    };

    if ratio.effective_month != input.month {
        return Err(ShareError::validation(
            "ratio.effectiveMonth",
            format!(
                "ratio is effective for {}, transaction is in {}",
                ratio.effective_month, input.month
            ),
        ));
    }

    ratio
        .validate()
        .map_err(|e| ShareError::validation("ratio", e.to_string()))?;

    for (i, detail) in ratio.details.iter().enumerate() {
        if !members.contains(&detail.member_id) {
            return Err(ShareError::validation(
                format!("ratio.details[{}].memberId", i),
                format!("{} is not a household member", detail.member_id),
            ));
        }
    }

    Ok(Some(
        members
            .iter()
            .map(|m| (*m, ratio.percentage_for(*m).unwrap_or(Decimal::ZERO)))
            .collect(),
    ))
}
