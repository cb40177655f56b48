//! Reports module for warikan
//!
//! Aggregations over processed transactions.

pub mod settlement;

pub use settlement::{MemberSettlement, SettlementReport};
