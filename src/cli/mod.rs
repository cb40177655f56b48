//! CLI command handlers
//!
//! Bridges clap argument parsing with the engine. Every command works on a
//! household snapshot file and the engine settings.

pub mod overrides;
pub mod process;
pub mod ratio;
pub mod settle;

pub use overrides::{handle_override_command, OverrideCommands};
pub use process::{handle_classify_command, handle_process_command, ClassifyArgs, ProcessArgs};
pub use ratio::{handle_ratio_command, RatioCommands};
pub use settle::{handle_settle_command, SettleArgs};

use std::io::Write;
use std::path::{Path, PathBuf};

use clap::ValueEnum;

use crate::config::{Settings, WarikanPaths};
use crate::error::ShareResult;
use crate::models::{HouseholdId, MemberId, Transaction, YearMonth};
use crate::services::HouseholdContext;
use crate::storage::{write_atomic, HouseholdSnapshot};

/// Output format for command results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Csv,
    Json,
}

/// Resolved paths, settings and the snapshot location for one invocation
#[derive(Debug, Clone)]
pub struct Workspace {
    pub paths: WarikanPaths,
    pub settings: Settings,
    pub snapshot_path: PathBuf,
    pub household_id: HouseholdId,
}

impl Workspace {
    pub fn new(
        paths: WarikanPaths,
        settings: Settings,
        snapshot: Option<PathBuf>,
        household: Option<HouseholdId>,
    ) -> Self {
        Self {
            snapshot_path: snapshot.unwrap_or_else(|| paths.snapshot_file()),
            household_id: household.unwrap_or(settings.household_id),
            paths,
            settings,
        }
    }

    pub fn load_snapshot(&self) -> ShareResult<HouseholdSnapshot> {
        HouseholdSnapshot::load(&self.snapshot_path)
    }

    pub fn context(&self, snapshot: &HouseholdSnapshot) -> ShareResult<HouseholdContext> {
        snapshot.context_for(self.household_id, &self.settings)
    }

    pub fn symbol(&self) -> &str {
        &self.settings.currency_symbol
    }
}

/// Transactions in `month`, or all of them
pub(crate) fn select_transactions(
    snapshot: &HouseholdSnapshot,
    month: Option<YearMonth>,
) -> Vec<Transaction> {
    match month {
        Some(month) => snapshot.transactions_in(month),
        None => snapshot.transactions.clone(),
    }
}

/// Display name of a member, falling back to the id
pub(crate) fn member_label(snapshot: &HouseholdSnapshot, id: MemberId) -> String {
    snapshot
        .member_name(id)
        .map(str::to_string)
        .unwrap_or_else(|| id.to_string())
}

/// Write command output to a file atomically, or to stdout
pub(crate) fn write_output<F>(output: Option<&Path>, fill: F) -> ShareResult<()>
where
    F: FnOnce(&mut dyn Write) -> ShareResult<()>,
{
    match output {
        Some(path) => {
            write_atomic(path, |writer| fill(writer))?;
            println!("Written to: {}", path.display());
            Ok(())
        }
        None => {
            let stdout = std::io::stdout();
            let mut lock = stdout.lock();
            fill(&mut lock)?;
            lock.flush()?;
            Ok(())
        }
    }
}
