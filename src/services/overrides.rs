//! Manual override validation and reconciliation
//!
//! Overridden members get exactly the override-derived amount. Whatever is
//! left of the transaction amount is apportioned across the remaining members
//! by their ratio weights (equally when there is no ratio or their weights
//! are all zero), so the shares still sum to the amount.

use rust_decimal::Decimal;
use std::collections::HashSet;

use crate::error::{ShareError, ShareResult};
use crate::models::{ExternalId, MemberId, Money, OverrideKind, ShareOverride};

use super::apportion::{apportion, apportion_equally, ApportionError};

/// Portions produced by reconciliation, sorted by member id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciled {
    pub portions: Vec<(MemberId, Money)>,
    pub overridden: Vec<MemberId>,
}

/// Check override records against the member list
///
/// All overrides must target the same transaction, name a known member, and
/// appear at most once per member.
pub fn validate_overrides(members: &[MemberId], overrides: &[ShareOverride]) -> ShareResult<()> {
    let mut seen = HashSet::new();
    let mut key: Option<&ExternalId> = None;

    for (i, ov) in overrides.iter().enumerate() {
        match key {
            Some(existing) if existing != &ov.external_id => {
                return Err(ShareError::validation(
                    format!("overrides[{}].externalId", i),
                    format!(
                        "override for '{}' mixed with overrides for '{}'",
                        ov.external_id, existing
                    ),
                ));
            }
            None => key = Some(&ov.external_id),
            _ => {}
        }

        if !members.contains(&ov.member_id) {
            return Err(ShareError::validation(
                format!("overrides[{}].memberId", i),
                format!("{} is not a household member", ov.member_id),
            ));
        }

        if !seen.insert(ov.member_id) {
            return Err(ShareError::validation(
                format!("overrides[{}].memberId", i),
                format!("more than one override for {}", ov.member_id),
            ));
        }

        if ov.value < Decimal::ZERO {
            return Err(ShareError::validation(
                format!("overrides[{}].value", i),
                "override value cannot be negative",
            ));
        }

        match ov.kind {
            OverrideKind::Percent if ov.value > Decimal::ONE_HUNDRED => {
                return Err(ShareError::validation(
                    format!("overrides[{}].value", i),
                    format!("percentage {} exceeds 100", ov.value.normalize()),
                ));
            }
            OverrideKind::FixedAmount if ov.value.fract() != Decimal::ZERO => {
                return Err(ShareError::validation(
                    format!("overrides[{}].value", i),
                    "fixed amounts must be whole yen",
                ));
            }
            _ => {}
        }
    }

    Ok(())
}

/// The amount an override assigns to its member
pub fn override_amount(amount: Money, ov: &ShareOverride) -> ShareResult<Money> {
    let resolved = match ov.kind {
        OverrideKind::FixedAmount => Money::from_decimal_exact(ov.value),
        OverrideKind::Percent => amount.percent_of(ov.value),
    };
    resolved.ok_or_else(|| {
        ShareError::validation(
            "overrides",
            format!("override for {} cannot be represented in yen", ov.member_id),
        )
    })
}

/// Apply overrides and distribute the residual over everyone else
///
/// `weights` are the ratio percentages of `members` (None when no ratio is
/// available). Overrides must already have passed [`validate_overrides`].
pub fn reconcile(
    amount: Money,
    members: &[MemberId],
    weights: Option<&[(MemberId, Decimal)]>,
    overrides: &[&ShareOverride],
) -> ShareResult<Reconciled> {
    let mut fixed = Vec::with_capacity(overrides.len());
    for ov in overrides {
        fixed.push((ov.member_id, override_amount(amount, ov)?));
    }

    let overridden_total = fixed
        .iter()
        .try_fold(Money::zero(), |acc, (_, a)| acc.checked_add(*a))
        .ok_or_else(|| {
            ShareError::validation(
                "overrides",
                format!("overrides total more than the transaction amount {}", amount),
            )
        })?;
    let residual = amount - overridden_total;
    if residual.is_negative() {
        return Err(ShareError::validation(
            "overrides",
            format!(
                "overrides total {} exceeds the transaction amount {}",
                overridden_total, amount
            ),
        ));
    }

    let remaining: Vec<MemberId> = members
        .iter()
        .copied()
        .filter(|m| !fixed.iter().any(|(member, _)| member == m))
        .collect();

    let mut portions = fixed.clone();
    if remaining.is_empty() {
        if !residual.is_zero() {
            return Err(ShareError::validation(
                "overrides",
                format!(
                    "every member is overridden but the overrides total {} of {}",
                    overridden_total, amount
                ),
            ));
        }
    } else {
        portions.extend(distribute(residual, &remaining, weights)?);
    }

    portions.sort_by_key(|(member, _)| *member);
    let mut overridden: Vec<MemberId> = fixed.into_iter().map(|(member, _)| member).collect();
    overridden.sort();

    Ok(Reconciled {
        portions,
        overridden,
    })
}

/// Apportion `total` across `members` by weight, falling back to equal parts
pub fn distribute(
    total: Money,
    members: &[MemberId],
    weights: Option<&[(MemberId, Decimal)]>,
) -> ShareResult<Vec<(MemberId, Money)>> {
    let result = match weights {
        Some(weights) => {
            let subset: Vec<(MemberId, Decimal)> = weights
                .iter()
                .filter(|(member, _)| members.contains(member))
                .copied()
                .collect();
            match apportion(total, &subset) {
                Err(ApportionError::ZeroWeight) => apportion_equally(total, members),
                other => other,
            }
        }
        None => apportion_equally(total, members),
    };

    result.map_err(|e| ShareError::validation("amount", e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn m(id: i64) -> MemberId {
        MemberId::new(id)
    }

    fn members() -> Vec<MemberId> {
        vec![m(1), m(2), m(3)]
    }

    fn weights() -> Vec<(MemberId, Decimal)> {
        vec![
            (m(1), Decimal::from(50)),
            (m(2), Decimal::from(30)),
            (m(3), Decimal::from(20)),
        ]
    }

    #[test]
    fn test_fixed_override_residual_by_weight() {
        let ov = ShareOverride::fixed("MF-1", m(1), Money::from_yen(2000));
        let result = reconcile(Money::from_yen(10000), &members(), Some(&weights()), &[&ov]).unwrap();

        // 8000 left for members 2 and 3 at 30:20
        assert_eq!(
            result.portions,
            vec![
                (m(1), Money::from_yen(2000)),
                (m(2), Money::from_yen(4800)),
                (m(3), Money::from_yen(3200)),
            ]
        );
        assert_eq!(result.overridden, vec![m(1)]);
    }

    #[test]
    fn test_percent_override_without_ratio() {
        let ov = ShareOverride::percent("MF-1", m(3), Decimal::from(10));
        let result = reconcile(Money::from_yen(1001), &members(), None, &[&ov]).unwrap();

        // round(100.1) = 100; 901 split equally, remainder to member 1
        assert_eq!(
            result.portions,
            vec![
                (m(1), Money::from_yen(451)),
                (m(2), Money::from_yen(450)),
                (m(3), Money::from_yen(100)),
            ]
        );
    }

    #[test]
    fn test_zero_weight_remaining_falls_back_to_equal() {
        let weights = vec![(m(1), Decimal::from(100)), (m(2), Decimal::ZERO), (m(3), Decimal::ZERO)];
        let ov = ShareOverride::fixed("MF-1", m(1), Money::from_yen(100));
        let result = reconcile(Money::from_yen(301), &members(), Some(&weights), &[&ov]).unwrap();
        assert_eq!(
            result.portions,
            vec![
                (m(1), Money::from_yen(100)),
                (m(2), Money::from_yen(101)),
                (m(3), Money::from_yen(100)),
            ]
        );
    }

    #[test]
    fn test_overshoot_is_rejected() {
        let ov = ShareOverride::fixed("MF-1", m(1), Money::from_yen(12000));
        let err = reconcile(Money::from_yen(10000), &members(), Some(&weights()), &[&ov]).unwrap_err();
        assert_eq!(err.field(), Some("overrides"));
    }

    #[test]
    fn test_override_total_beyond_i64_is_rejected() {
        let huge = Money::from_yen(i64::MAX / 2 + 10);
        let a = ShareOverride::fixed("MF-1", m(1), huge);
        let b = ShareOverride::fixed("MF-1", m(2), huge);
        validate_overrides(&members(), &[a.clone(), b.clone()]).unwrap();

        let err = reconcile(Money::from_yen(1000), &members(), Some(&weights()), &[&a, &b]).unwrap_err();
        assert_eq!(err.field(), Some("overrides"));
    }

    #[test]
    fn test_all_overridden_must_sum_exactly() {
        let a = ShareOverride::fixed("MF-1", m(1), Money::from_yen(5000));
        let b = ShareOverride::fixed("MF-1", m(2), Money::from_yen(3000));
        let c = ShareOverride::fixed("MF-1", m(3), Money::from_yen(1000));
        let err = reconcile(Money::from_yen(10000), &members(), None, &[&a, &b, &c]).unwrap_err();
        assert!(err.is_validation());

        let c = ShareOverride::fixed("MF-1", m(3), Money::from_yen(2000));
        let ok = reconcile(Money::from_yen(10000), &members(), None, &[&a, &b, &c]).unwrap();
        assert_eq!(ok.overridden, members());
    }

    #[test]
    fn test_validate_unknown_member() {
        let ov = vec![ShareOverride::fixed("MF-1", m(9), Money::from_yen(100))];
        let err = validate_overrides(&members(), &ov).unwrap_err();
        assert_eq!(err.field(), Some("overrides[0].memberId"));
    }

    #[test]
    fn test_validate_duplicate_member() {
        let ov = vec![
            ShareOverride::fixed("MF-1", m(1), Money::from_yen(100)),
            ShareOverride::percent("MF-1", m(1), Decimal::from(10)),
        ];
        let err = validate_overrides(&members(), &ov).unwrap_err();
        assert_eq!(err.field(), Some("overrides[1].memberId"));
    }

    #[test]
    fn test_validate_mixed_transactions() {
        let ov = vec![
            ShareOverride::fixed("MF-1", m(1), Money::from_yen(100)),
            ShareOverride::fixed("MF-2", m(2), Money::from_yen(100)),
        ];
        let err = validate_overrides(&members(), &ov).unwrap_err();
        assert_eq!(err.field(), Some("overrides[1].externalId"));
    }

    #[test]
    fn test_validate_values() {
        let ov = vec![ShareOverride::percent("MF-1", m(1), Decimal::from(101))];
        assert_eq!(
            validate_overrides(&members(), &ov).unwrap_err().field(),
            Some("overrides[0].value")
        );

        let mut fractional = ShareOverride::fixed("MF-1", m(1), Money::from_yen(0));
        fractional.value = Decimal::new(1005, 1);
        assert_eq!(
            validate_overrides(&members(), &[fractional]).unwrap_err().field(),
            Some("overrides[0].value")
        );

        let mut negative = ShareOverride::fixed("MF-1", m(1), Money::from_yen(0));
        negative.value = Decimal::from(-5);
        assert!(validate_overrides(&members(), &[negative]).is_err());
    }
}
