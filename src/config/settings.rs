//! User settings for warikan
//!
//! Holds the household the CLI works on and the engine's tunable behavior:
//! classification precedence and how advance payments are turned into debts.

use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

use super::paths::WarikanPaths;
use crate::error::{ShareError, ShareResult};
use crate::models::{AdvanceDebtBasis, HouseholdId};
use crate::services::ClassificationPrecedence;
use crate::storage::file_io::write_json_atomic;

/// Classifier settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationSettings {
    /// Order the checks run in; must list every check exactly once
    #[serde(default)]
    pub precedence: ClassificationPrecedence,
}

/// Share calculator settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SharingSettings {
    #[serde(default)]
    pub advance_debt_basis: AdvanceDebtBasis,
}

/// User settings for warikan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Schema version for migration support
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// Household processed when the snapshot holds more than one
    #[serde(default = "default_household_id")]
    pub household_id: HouseholdId,

    #[serde(default)]
    pub classification: ClassificationSettings,

    #[serde(default)]
    pub sharing: SharingSettings,

    /// Currency symbol used in tables
    #[serde(default = "default_currency")]
    pub currency_symbol: String,

    /// Default `tracing` filter when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_schema_version() -> u32 {
    1
}

fn default_household_id() -> HouseholdId {
    HouseholdId::new(1)
}

fn default_currency() -> String {
    "¥".to_string()
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            household_id: default_household_id(),
            classification: ClassificationSettings::default(),
            sharing: SharingSettings::default(),
            currency_symbol: default_currency(),
            log_level: default_log_level(),
        }
    }
}

impl Settings {
    /// Load settings from disk, or fall back to defaults if the file doesn't exist
    pub fn load_or_create(paths: &WarikanPaths) -> ShareResult<Self> {
        let settings_path = paths.settings_file();

        if !settings_path.exists() {
            // Don't save yet - let caller decide when to persist
            return Ok(Settings::default());
        }

        let contents = std::fs::read_to_string(&settings_path)
            .map_err(|e| ShareError::Io(format!("Failed to read settings file: {}", e)))?;

        let settings: Settings = serde_json::from_str(&contents)
            .map_err(|e| ShareError::Config(format!("Failed to parse settings file: {}", e)))?;

        settings.validate()?;
        Ok(settings)
    }

    /// Save settings to disk
    pub fn save(&self, paths: &WarikanPaths) -> ShareResult<()> {
        self.validate()?;
        paths.ensure_directories()?;
        write_json_atomic(paths.settings_file(), self)
    }

    /// Reject settings the engine cannot run with
    pub fn validate(&self) -> ShareResult<()> {
        if self.household_id.get() <= 0 {
            return Err(ShareError::Config(format!(
                "household_id must be positive, got {}",
                self.household_id.get()
            )));
        }

        if self.currency_symbol.trim().is_empty() {
            return Err(ShareError::Config("currency_symbol cannot be empty".into()));
        }

        EnvFilter::try_new(&self.log_level).map_err(|e| {
            ShareError::Config(format!("Invalid log_level '{}': {}", self.log_level, e))
        })?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::ClassificationCheck;
    use tempfile::TempDir;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.household_id, HouseholdId::new(1));
        assert_eq!(settings.currency_symbol, "¥");
        assert_eq!(
            settings.sharing.advance_debt_basis,
            AdvanceDebtBasis::PortionOwed
        );
        assert_eq!(
            settings.classification.precedence.checks(),
            ClassificationCheck::all()
        );
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let paths = WarikanPaths::with_base_dir(temp_dir.path());

        let mut settings = Settings::default();
        settings.household_id = HouseholdId::new(7);
        settings.sharing.advance_debt_basis = AdvanceDebtBasis::FullReimbursement;
        settings.save(&paths).unwrap();

        let loaded = Settings::load_or_create(&paths).unwrap();
        assert_eq!(loaded, settings);
    }

    #[test]
    fn test_missing_fields_take_defaults() {
        let settings: Settings = serde_json::from_str(r#"{"household_id": 3}"#).unwrap();
        assert_eq!(settings.household_id, HouseholdId::new(3));
        assert_eq!(settings.log_level, "warn");
    }

    #[test]
    fn test_custom_precedence() {
        let json = r#"{
            "classification": {
                "precedence": ["personal_alias", "transfer", "not_calculation_target",
                               "exclusion_rule", "advance_category"]
            }
        }"#;
        let settings: Settings = serde_json::from_str(json).unwrap();
        assert_eq!(
            settings.classification.precedence.checks()[0],
            ClassificationCheck::PersonalAlias
        );
    }

    #[test]
    fn test_incomplete_precedence_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let paths = WarikanPaths::with_base_dir(temp_dir.path());
        std::fs::write(
            paths.settings_file(),
            r#"{"classification": {"precedence": ["transfer", "transfer"]}}"#,
        )
        .unwrap();

        let err = Settings::load_or_create(&paths).unwrap_err();
        assert!(matches!(err, ShareError::Config(_)));
    }

    #[test]
    fn test_validate() {
        let mut settings = Settings::default();
        settings.household_id = HouseholdId::new(0);
        assert!(settings.validate().is_err());

        let mut settings = Settings::default();
        settings.currency_symbol = " ".into();
        assert!(settings.validate().is_err());
    }
}
