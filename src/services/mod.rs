//! Service layer for warikan
//!
//! The engine proper: classification, ratio resolution and share
//! calculation. These are pure functions over the household data passed in;
//! the batch driver in [`pipeline`] wires them together.

pub mod apportion;
pub mod classifier;
pub mod matcher;
pub mod overrides;
pub mod pipeline;
pub mod ratio;
pub mod shares;

pub use classifier::{
    classify, Classification, ClassificationCheck, ClassificationContext,
    ClassificationPrecedence, ClassifyInput, PrecedenceError,
};
pub use pipeline::{
    apply_default_ratio, process_batch, save_override_batch, BatchReport, HouseholdContext,
    ProcessedTransaction, ShareOutcome,
};
pub use ratio::{resolve_ratio, resolve_ratio_required};
pub use shares::{compute_shares, ShareInput};
