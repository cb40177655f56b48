//! Burden ratio resolution
//!
//! Finds the ratio effective for a transaction's month. Ratios are matched on
//! the exact effective month. At most one ratio per household per month is
//! expected; if the caller passes duplicates, the first one in input order is
//! returned. That order dependence is deterministic but not a contract.

use crate::error::{ShareError, ShareResult};
use crate::models::{BurdenRatio, YearMonth};

/// The ratio effective for `month`, if one is configured
pub fn resolve_ratio(month: YearMonth, ratios: &[BurdenRatio]) -> Option<&BurdenRatio> {
    ratios.iter().find(|r| r.effective_month == month)
}

/// Like [`resolve_ratio`], but a missing ratio is reported as a configuration gap
pub fn resolve_ratio_required(month: YearMonth, ratios: &[BurdenRatio]) -> ShareResult<&BurdenRatio> {
    resolve_ratio(month, ratios).ok_or(ShareError::ConfigurationGap { month })
}
