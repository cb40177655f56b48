//! warikan - household expense classification and proportional cost sharing
//!
//! Imported household transactions are classified as shared household
//! spending, advance payments, personal spending or excluded rows, and each
//! shared transaction is split between members by the household's burden
//! ratio for its month, with manual per-transaction overrides taking
//! precedence.
//!
//! # Architecture
//!
//! - `models`: Core data models (money, months, categories, ratios, shares)
//! - `services`: The engine (classifier, ratio resolver, share calculator)
//!   and the batch driver
//! - `reports`: Monthly settlement per member
//! - `storage`: Household snapshots and per-month results as JSON
//! - `export`: CSV and JSON export of computed shares
//! - `display`: Terminal tables
//! - `config`: Path resolution and settings
//! - `cli`: Command handlers for the `warikan` binary
//!
//! # Example
//!
//! ```rust
//! use rust_decimal::Decimal;
//! use warikan::models::{BurdenRatio, HouseholdId, MemberId, Money, YearMonth};
//! use warikan::services::{compute_shares, ShareInput};
//!
//! let month = YearMonth::new(2025, 1).unwrap();
//! let ratio = BurdenRatio::new(HouseholdId::new(1), month)
//!     .with_detail(MemberId::new(1), Decimal::from(60))
//!     .with_detail(MemberId::new(2), Decimal::from(40));
//! let members = [MemberId::new(1), MemberId::new(2)];
//!
//! let input = ShareInput::household(Money::from_yen(10000), month, &members, Some(&ratio));
//! let breakdown = compute_shares(&input).unwrap();
//! assert_eq!(breakdown.share_of(MemberId::new(1)), Some(Money::from_yen(6000)));
//! ```

pub mod cli;
pub mod config;
pub mod display;
pub mod error;
pub mod export;
pub mod models;
pub mod reports;
pub mod services;
pub mod storage;

pub use error::{ShareError, ShareResult};
