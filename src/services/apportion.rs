//! Integer apportionment with the largest-remainder rule
//!
//! Every member first receives `floor(total * weight / Σweights)`. The units
//! left over (always fewer than the number of members) go one at a time to
//! the members with the largest fractional remainder; equal remainders go to
//! the lowest member id first. The parts always sum to `total` exactly.
//!
//! The arithmetic is done on the weights' integer mantissas scaled to a
//! common exponent, so the remainders are compared exactly and never through
//! a rounded decimal quotient.

use rust_decimal::Decimal;
use std::fmt;

use crate::models::{MemberId, Money};

/// Why a total could not be apportioned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApportionError {
    /// All weights are zero (or no members were given)
    ZeroWeight,
    /// A weight or the total is negative
    Negative,
    /// The scaled arithmetic does not fit in 128 bits
    Overflow,
}

impl fmt::Display for ApportionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroWeight => write!(f, "Weights sum to zero"),
            Self::Negative => write!(f, "Negative weight or total"),
            Self::Overflow => write!(f, "Amount too large to apportion"),
        }
    }
}

impl std::error::Error for ApportionError {}

/// Split `total` across members in proportion to their weights
///
/// The result is sorted by member id.
pub fn apportion(
    total: Money,
    weights: &[(MemberId, Decimal)],
) -> Result<Vec<(MemberId, Money)>, ApportionError> {
    if total.is_negative() || weights.iter().any(|(_, w)| w.is_sign_negative() && !w.is_zero()) {
        return Err(ApportionError::Negative);
    }

    let mut weights = weights.to_vec();
    weights.sort_by_key(|(member, _)| *member);

    let scale = weights.iter().map(|(_, w)| w.scale()).max().unwrap_or(0);
    let mut scaled = Vec::with_capacity(weights.len());
    for (member, weight) in &weights {
        let factor = 10i128
            .checked_pow(scale - weight.scale())
            .ok_or(ApportionError::Overflow)?;
        let value = weight
            .mantissa()
            .checked_mul(factor)
            .ok_or(ApportionError::Overflow)?;
        scaled.push((*member, value));
    }

    let denominator = scaled
        .iter()
        .try_fold(0i128, |acc, (_, w)| acc.checked_add(*w))
        .ok_or(ApportionError::Overflow)?;
    if denominator == 0 {
        return Err(ApportionError::ZeroWeight);
    }

    let total_units = i128::from(total.yen());
    let mut parts = Vec::with_capacity(scaled.len());
    let mut remainders = Vec::with_capacity(scaled.len());
    let mut allocated = 0i128;

    for (index, (member, weight)) in scaled.iter().enumerate() {
        let numerator = total_units
            .checked_mul(*weight)
            .ok_or(ApportionError::Overflow)?;
        let floor = numerator / denominator;
        allocated += floor;
        parts.push((*member, floor));
        remainders.push((numerator % denominator, index));
    }

    // Largest remainder first; members are already in id order, so a stable
    // sort keeps ties with the lowest id.
    remainders.sort_by(|a, b| b.0.cmp(&a.0));

    let leftover = total_units - allocated;
    for (_, index) in remainders.iter().take(leftover as usize) {
        parts[*index].1 += 1;
    }

    parts
        .into_iter()
        .map(|(member, units)| {
            i64::try_from(units)
                .map(|yen| (member, Money::from_yen(yen)))
                .map_err(|_| ApportionError::Overflow)
        })
        .collect()
}

/// Split `total` equally; the remainder goes to the lowest member ids
pub fn apportion_equally(
    total: Money,
    members: &[MemberId],
) -> Result<Vec<(MemberId, Money)>, ApportionError> {
    let weights: Vec<(MemberId, Decimal)> = members.iter().map(|m| (*m, Decimal::ONE)).collect();
    apportion(total, &weights)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn m(id: i64) -> MemberId {
        MemberId::new(id)
    }

    fn yen(parts: &[(MemberId, Money)]) -> Vec<i64> {
        parts.iter().map(|(_, amount)| amount.yen()).collect()
    }

    #[test]
    fn test_exact_split() {
        let parts = apportion(
            Money::from_yen(10000),
            &[(m(1), Decimal::from(60)), (m(2), Decimal::from(40))],
        )
        .unwrap();
        assert_eq!(yen(&parts), vec![6000, 4000]);
    }

    #[test]
    fn test_thirds_remainder_to_lowest_id() {
        let third = Decimal::new(3333, 2);
        let parts = apportion(
            Money::from_yen(100),
            &[(m(3), third), (m(1), third), (m(2), third)],
        )
        .unwrap();
        assert_eq!(parts[0].0, m(1));
        assert_eq!(yen(&parts), vec![34, 33, 33]);
    }

    #[test]
    fn test_largest_remainder_beats_lower_id() {
        // 1000 * 33.34% = 333.4, 1000 * 66.66% = 666.6
        let parts = apportion(
            Money::from_yen(1000),
            &[(m(1), Decimal::new(3334, 2)), (m(2), Decimal::new(6666, 2))],
        )
        .unwrap();
        assert_eq!(yen(&parts), vec![333, 667]);
    }

    #[test]
    fn test_mixed_scales() {
        let parts = apportion(
            Money::from_yen(999),
            &[(m(1), Decimal::new(505, 1)), (m(2), Decimal::from(49)), (m(3), Decimal::new(5, 1))],
        )
        .unwrap();
        assert_eq!(parts.iter().map(|(_, a)| a.yen()).sum::<i64>(), 999);
        // 504.495, 489.51, 4.995
        assert_eq!(yen(&parts), vec![504, 490, 5]);
    }

    #[test]
    fn test_weights_not_summing_to_hundred_are_normalized() {
        let parts = apportion(
            Money::from_yen(900),
            &[(m(1), Decimal::from(2)), (m(2), Decimal::from(1))],
        )
        .unwrap();
        assert_eq!(yen(&parts), vec![600, 300]);
    }

    #[test]
    fn test_zero_weight_member_gets_nothing() {
        let parts = apportion(
            Money::from_yen(101),
            &[(m(1), Decimal::ZERO), (m(2), Decimal::from(100))],
        )
        .unwrap();
        assert_eq!(yen(&parts), vec![0, 101]);
    }

    #[test]
    fn test_equal_split() {
        let parts = apportion_equally(Money::from_yen(1001), &[m(2), m(3), m(1)]).unwrap();
        assert_eq!(parts[0].0, m(1));
        assert_eq!(yen(&parts), vec![334, 334, 333]);
    }

    #[test]
    fn test_errors() {
        assert_eq!(
            apportion(Money::from_yen(100), &[(m(1), Decimal::ZERO)]),
            Err(ApportionError::ZeroWeight)
        );
        assert_eq!(apportion_equally(Money::from_yen(100), &[]), Err(ApportionError::ZeroWeight));
        assert_eq!(
            apportion(Money::from_yen(-1), &[(m(1), Decimal::ONE)]),
            Err(ApportionError::Negative)
        );
    }

    #[test]
    fn test_zero_total() {
        let parts = apportion_equally(Money::zero(), &[m(1), m(2)]).unwrap();
        assert_eq!(yen(&parts), vec![0, 0]);
    }
}
