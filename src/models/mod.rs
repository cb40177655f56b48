//! Core data models for warikan
//!
//! This module contains the data structures the engine reads and produces:
//! transactions, categories, exclusion rules, member aliases, burden ratios,
//! share overrides and computed shares.

pub mod category;
pub mod ids;
pub mod money;
pub mod month;
pub mod ratio;
pub mod rule;
pub mod share;
pub mod transaction;

pub use category::{Category, CategoryLabel, CostType, UNCATEGORIZED};
pub use ids::{CategoryId, ExclusionRuleId, ExternalId, HouseholdId, MemberId};
pub use money::Money;
pub use month::YearMonth;
pub use ratio::{BurdenRatio, BurdenRatioDetail, RatioValidationError};
pub use rule::{ExclusionRule, UserAlias};
pub use share::{
    AdvanceDebtBasis, ComputedShare, OverrideKind, ShareBasis, ShareBreakdown, ShareOverride,
};
pub use transaction::{ProcessingStatus, Transaction};
