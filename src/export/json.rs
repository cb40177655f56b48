//! JSON export of computed shares
//!
//! Wraps the processed rows in a versioned envelope for downstream tools.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::Write;

use crate::error::ShareResult;
use crate::models::{HouseholdId, YearMonth};
use crate::services::{BatchReport, ProcessedTransaction};

/// Current export schema version
pub const EXPORT_SCHEMA_VERSION: &str = "1.0.0";

/// Exported shares for one household
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SharesExport {
    /// Schema version for compatibility checking
    pub schema_version: String,
    pub exported_at: DateTime<Utc>,
    /// Application version that created the export
    pub app_version: String,
    pub household_id: HouseholdId,
    /// Months that needed a burden ratio and had none
    pub configuration_gaps: Vec<YearMonth>,
    pub transactions: Vec<ProcessedTransaction>,
}

impl SharesExport {
    pub fn from_report(household_id: HouseholdId, report: &BatchReport) -> Self {
        Self {
            schema_version: EXPORT_SCHEMA_VERSION.to_string(),
            exported_at: Utc::now(),
            app_version: env!("CARGO_PKG_VERSION").to_string(),
            household_id,
            configuration_gaps: report.configuration_gaps.clone(),
            transactions: report.processed.clone(),
        }
    }
}

/// Write a batch report as pretty JSON
pub fn export_shares_json<W: Write>(
    household_id: HouseholdId,
    report: &BatchReport,
    mut writer: W,
) -> ShareResult<()> {
    let export = SharesExport::from_report(household_id, report);
    serde_json::to_writer_pretty(&mut writer, &export)?;
    writeln!(writer)?;
    Ok(())
}
