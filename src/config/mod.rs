//! Configuration module for warikan
//!
//! This module provides configuration management including:
//! - Platform path resolution
//! - Household and engine settings persistence

pub mod paths;
pub mod settings;

pub use paths::WarikanPaths;
pub use settings::{ClassificationSettings, Settings, SharingSettings};
