//! Household snapshots and persisted results
//!
//! A snapshot is the JSON export of one household's records: members,
//! categories, rules, aliases, ratio history, manual overrides and the
//! imported transactions. Results are persisted per month and upserted by
//! external id, so importing the same export twice leaves one row per
//! transaction.

use serde::{Deserialize, Serialize};
use std::path::Path;

use super::file_io::{read_json, read_json_required, write_json_atomic};
use crate::config::Settings;
use crate::error::{ShareError, ShareResult};
use crate::models::{
    BurdenRatio, Category, ExclusionRule, HouseholdId, MemberId, ShareOverride, Transaction,
    UserAlias, YearMonth,
};
use crate::services::{HouseholdContext, ProcessedTransaction};

/// A household member
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub id: MemberId,
    #[serde(default)]
    pub name: String,
}

impl Member {
    pub fn new(id: MemberId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// Everything the CLI reads for one household
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HouseholdSnapshot {
    pub household_id: HouseholdId,
    pub members: Vec<Member>,
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub exclusion_rules: Vec<ExclusionRule>,
    #[serde(default)]
    pub aliases: Vec<UserAlias>,
    /// May include other households' ratios; those are ignored
    #[serde(default)]
    pub ratios: Vec<BurdenRatio>,
    #[serde(default)]
    pub overrides: Vec<ShareOverride>,
    #[serde(default)]
    pub transactions: Vec<Transaction>,
}

impl HouseholdSnapshot {
    pub fn load(path: impl AsRef<Path>) -> ShareResult<Self> {
        let snapshot: Self = read_json_required(path.as_ref())?;
        tracing::debug!(
            path = %path.as_ref().display(),
            household = %snapshot.household_id,
            transactions = snapshot.transactions.len(),
            "loaded snapshot"
        );
        Ok(snapshot)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> ShareResult<()> {
        write_json_atomic(path, self)
    }

    pub fn member_name(&self, id: MemberId) -> Option<&str> {
        self.members
            .iter()
            .find(|m| m.id == id)
            .map(|m| m.name.as_str())
            .filter(|name| !name.is_empty())
    }

    /// Build the engine context for `household_id` using the engine settings
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the snapshot belongs to another household and a
    /// `Validation` error if a member id is listed twice.
    pub fn context_for(
        &self,
        household_id: HouseholdId,
        settings: &Settings,
    ) -> ShareResult<HouseholdContext> {
        if self.household_id != household_id {
            return Err(ShareError::NotFound {
                entity_type: "Household",
                identifier: household_id.to_string(),
            });
        }

        let mut members: Vec<MemberId> = Vec::with_capacity(self.members.len());
        for (i, member) in self.members.iter().enumerate() {
            if members.contains(&member.id) {
                return Err(ShareError::validation(
                    format!("members[{}].id", i),
                    format!("{} is listed more than once", member.id),
                ));
            }
            members.push(member.id);
        }

        Ok(HouseholdContext {
            household_id,
            members,
            categories: self.categories.clone(),
            exclusion_rules: self.exclusion_rules.clone(),
            aliases: self.aliases.clone(),
            ratios: self
                .ratios
                .iter()
                .filter(|r| r.household_id == household_id)
                .cloned()
                .collect(),
            precedence: settings.classification.precedence.clone(),
            advance_basis: settings.sharing.advance_debt_basis,
        })
    }

    /// Transactions dated in `month`
    pub fn transactions_in(&self, month: YearMonth) -> Vec<Transaction> {
        self.transactions
            .iter()
            .filter(|t| month.contains(t.date))
            .cloned()
            .collect()
    }
}

/// Persisted results for one household and month
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthResults {
    pub household_id: HouseholdId,
    pub month: YearMonth,
    pub transactions: Vec<ProcessedTransaction>,
}

impl MonthResults {
    pub fn new(household_id: HouseholdId, month: YearMonth) -> Self {
        Self {
            household_id,
            month,
            transactions: Vec::new(),
        }
    }

    /// Insert or replace rows by external id; returns how many were replaced
    pub fn upsert<'a>(&mut self, rows: impl IntoIterator<Item = &'a ProcessedTransaction>) -> usize {
        let mut replaced = 0;
        for row in rows {
            match self
                .transactions
                .iter_mut()
                .find(|existing| existing.external_id == row.external_id)
            {
                Some(existing) => {
                    *existing = row.clone();
                    replaced += 1;
                }
                None => self.transactions.push(row.clone()),
            }
        }
        self.transactions.sort_by(|a, b| {
            a.date
                .cmp(&b.date)
                .then_with(|| a.external_id.cmp(&b.external_id))
        });
        replaced
    }
}

/// Merge processed rows into the per-month results files under `results_dir`
///
/// Returns the months written.
pub fn persist_results(
    results_dir: &Path,
    household_id: HouseholdId,
    processed: &[ProcessedTransaction],
) -> ShareResult<Vec<YearMonth>> {
    let mut months: Vec<YearMonth> = processed.iter().map(|p| p.month).collect();
    months.sort();
    months.dedup();

    for &month in &months {
        let path = results_dir.join(format!("shares-{}.json", month));
        let mut results: MonthResults = match read_json::<Option<MonthResults>, _>(&path)? {
            Some(existing) if existing.household_id == household_id => existing,
            Some(existing) => {
                return Err(ShareError::Storage(format!(
                    "{} holds results for {}, not {}",
                    path.display(),
                    existing.household_id,
                    household_id
                )))
            }
            None => MonthResults::new(household_id, month),
        };

        let replaced = results.upsert(processed.iter().filter(|p| p.month == month));
        write_json_atomic(&path, &results)?;
        tracing::info!(
            %month,
            rows = results.transactions.len(),
            replaced,
            "persisted results"
        );
    }

    Ok(months)
}

/// Read a month's persisted results, if any
pub fn load_results(results_dir: &Path, month: YearMonth) -> ShareResult<Option<MonthResults>> {
    read_json(results_dir.join(format!("shares-{}.json", month)))
}
