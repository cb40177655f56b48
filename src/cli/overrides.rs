//! `override` commands

use std::path::PathBuf;

use clap::Subcommand;

use super::{member_label, Workspace};
use crate::error::{ShareError, ShareResult};
use crate::models::{ExternalId, ShareOverride};
use crate::services::save_override_batch;
use crate::storage::read_json_required;

/// Manual override subcommands
#[derive(Subcommand, Debug)]
pub enum OverrideCommands {
    /// List the overrides recorded for a transaction
    Show {
        /// External ID of the transaction
        external_id: String,
    },

    /// Validate an override batch for a transaction and show the new shares
    Set {
        /// External ID of the transaction
        external_id: String,

        /// JSON file holding an array of overrides
        #[arg(short, long)]
        file: PathBuf,

        /// Replace the transaction's overrides in the snapshot
        #[arg(long)]
        save: bool,
    },
}

/// Handle override commands
pub fn handle_override_command(ws: &Workspace, cmd: OverrideCommands) -> ShareResult<()> {
    match cmd {
        OverrideCommands::Show { external_id } => {
            let snapshot = ws.load_snapshot()?;
            let id = ExternalId::new(external_id);
            let overrides: Vec<&ShareOverride> = snapshot
                .overrides
                .iter()
                .filter(|ov| ov.external_id == id)
                .collect();

            if overrides.is_empty() {
                println!("No overrides for {}.", id);
            }
            for ov in overrides {
                println!(
                    "{:<16} {:?} {}",
                    member_label(&snapshot, ov.member_id),
                    ov.kind,
                    ov.value.normalize()
                );
            }
            Ok(())
        }
        OverrideCommands::Set {
            external_id,
            file,
            save,
        } => {
            let mut snapshot = ws.load_snapshot()?;
            let ctx = ws.context(&snapshot)?;
            let id = ExternalId::new(external_id);
            let txn = snapshot
                .transactions
                .iter()
                .find(|t| t.external_id == id)
                .ok_or_else(|| ShareError::transaction_not_found(id.as_str()))?;

            let overrides: Vec<ShareOverride> = read_json_required(&file)?;
            let breakdown = save_override_batch(&ctx, txn, &overrides)?;

            for share in &breakdown.shares {
                let marker = if breakdown.overridden.contains(&share.member_id) {
                    " (override)"
                } else {
                    ""
                };
                println!(
                    "{:<16} {}{}",
                    member_label(&snapshot, share.member_id),
                    share.amount.format_with_symbol(ws.symbol()),
                    marker
                );
            }

            if save {
                snapshot.overrides.retain(|ov| ov.external_id != id);
                snapshot.overrides.extend(overrides);
                snapshot.save(&ws.snapshot_path)?;
                println!("Saved overrides for {}.", id);
            }
            Ok(())
        }
    }
}
