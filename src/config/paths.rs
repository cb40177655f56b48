//! Path management for warikan
//!
//! ## Path Resolution Order
//!
//! 1. `WARIKAN_DATA_DIR` environment variable (if set)
//! 2. The platform config directory from `directories::ProjectDirs`
//!    (`~/.config/warikan` on Linux, `~/Library/Application Support/...` on
//!    macOS, `%APPDATA%\...` on Windows)

use std::path::{Path, PathBuf};

use directories::ProjectDirs;

use crate::error::{ShareError, ShareResult};
use crate::models::YearMonth;

/// Environment variable that overrides the base directory
pub const DATA_DIR_ENV: &str = "WARIKAN_DATA_DIR";

/// Manages all paths used by warikan
#[derive(Debug, Clone)]
pub struct WarikanPaths {
    base_dir: PathBuf,
}

impl WarikanPaths {
    /// Resolve the base directory from the environment or the platform
    ///
    /// # Errors
    ///
    /// Returns an error if no home directory can be determined.
    pub fn new() -> ShareResult<Self> {
        let base_dir = match std::env::var_os(DATA_DIR_ENV) {
            Some(custom) => PathBuf::from(custom),
            None => ProjectDirs::from("jp", "warikan", "warikan")
                .map(|dirs| dirs.config_dir().to_path_buf())
                .ok_or_else(|| {
                    ShareError::Config("Could not determine a configuration directory".into())
                })?,
        };

        Ok(Self { base_dir })
    }

    /// Use a fixed base directory (tests, `--data-dir`)
    pub fn with_base_dir(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Household snapshots live here
    pub fn data_dir(&self) -> PathBuf {
        self.base_dir.join("data")
    }

    /// Computed shares are written here, one file per month
    pub fn results_dir(&self) -> PathBuf {
        self.base_dir.join("results")
    }

    pub fn settings_file(&self) -> PathBuf {
        self.base_dir.join("config.json")
    }

    /// Default snapshot read by the CLI when none is given
    pub fn snapshot_file(&self) -> PathBuf {
        self.data_dir().join("household.json")
    }

    /// Results file for one month
    pub fn results_file(&self, month: YearMonth) -> PathBuf {
        self.results_dir().join(format!("shares-{}.json", month))
    }

    /// Create the base, data and results directories
    pub fn ensure_directories(&self) -> ShareResult<()> {
        for dir in [self.base_dir.clone(), self.data_dir(), self.results_dir()] {
            std::fs::create_dir_all(&dir).map_err(|e| {
                ShareError::Io(format!("Failed to create {}: {}", dir.display(), e))
            })?;
        }
        Ok(())
    }

    /// Check whether settings have been written
    pub fn is_initialized(&self) -> bool {
        self.settings_file().exists()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_custom_base_dir() {
        let temp_dir = TempDir::new().unwrap();
        let paths = WarikanPaths::with_base_dir(temp_dir.path());

        assert_eq!(paths.base_dir(), temp_dir.path());
        assert_eq!(paths.data_dir(), temp_dir.path().join("data"));
        assert_eq!(paths.results_dir(), temp_dir.path().join("results"));
        assert_eq!(paths.settings_file(), temp_dir.path().join("config.json"));
    }

    #[test]
    fn test_env_var_override() {
        let temp_dir = TempDir::new().unwrap();
        std::env::set_var(DATA_DIR_ENV, temp_dir.path());

        let paths = WarikanPaths::new().unwrap();
        assert_eq!(paths.base_dir(), temp_dir.path());

        std::env::remove_var(DATA_DIR_ENV);
    }

    #[test]
    fn test_results_file_per_month() {
        let paths = WarikanPaths::with_base_dir("/tmp/warikan");
        let month = YearMonth::new(2025, 3).unwrap();
        assert_eq!(
            paths.results_file(month),
            PathBuf::from("/tmp/warikan/results/shares-2025-03.json")
        );
    }

    #[test]
    fn test_ensure_directories() {
        let temp_dir = TempDir::new().unwrap();
        let paths = WarikanPaths::with_base_dir(temp_dir.path().join("nested"));

        assert!(!paths.is_initialized());
        paths.ensure_directories().unwrap();
        assert!(paths.data_dir().exists());
        assert!(paths.results_dir().exists());
    }
}
