//! Display formatting for terminal output

pub mod shares;

pub use shares::{format_classification_table, format_shares_table};
