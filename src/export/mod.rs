//! Export module for warikan
//!
//! Writes computed shares for spreadsheets (CSV) or downstream tools (JSON).

pub mod csv;
pub mod json;

pub use csv::export_shares_csv;
pub use json::{export_shares_json, SharesExport, EXPORT_SCHEMA_VERSION};
