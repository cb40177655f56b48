//! Storage layer for warikan
//!
//! JSON files with atomic writes: household snapshots in, per-month share
//! results out.

pub mod file_io;
pub mod snapshot;

pub use file_io::{read_json, read_json_required, write_atomic, write_json_atomic};
pub use snapshot::{load_results, persist_results, HouseholdSnapshot, Member, MonthResults};
