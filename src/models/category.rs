//! Category model
//!
//! Categories come from the source export as a major/minor name pair. The
//! household tags each one with a cost type; the `Advance` tag marks spending
//! one member fronts for everyone else.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::CategoryId;

/// Label used for both names when a transaction has no category
pub const UNCATEGORIZED: &str = "uncategorized";

/// How a category's spending is treated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CostType {
    /// Recurring fixed costs (rent, utilities)
    Fixed,
    /// Everyday variable spending
    #[default]
    Variable,
    /// One member pays, the others owe back (立替)
    Advance,
}

impl fmt::Display for CostType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fixed => write!(f, "fixed"),
            Self::Variable => write!(f, "variable"),
            Self::Advance => write!(f, "advance"),
        }
    }
}

/// A category as configured for the household
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    /// Unique identifier
    pub id: CategoryId,

    /// Major (large) category name
    pub major_name: String,

    /// Minor (sub) category name
    pub minor_name: String,

    /// Cost treatment
    #[serde(default)]
    pub cost_type: CostType,
}

impl Category {
    /// Create a new category
    pub fn new(
        id: CategoryId,
        major_name: impl Into<String>,
        minor_name: impl Into<String>,
        cost_type: CostType,
    ) -> Self {
        Self {
            id,
            major_name: major_name.into(),
            minor_name: minor_name.into(),
            cost_type,
        }
    }

    /// The name pair used for rule matching
    pub fn label(&self) -> CategoryLabel {
        CategoryLabel {
            major_name: self.major_name.clone(),
            minor_name: self.minor_name.clone(),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} / {}", self.major_name, self.minor_name)
    }
}

/// Major/minor name pair a transaction was classified under
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryLabel {
    pub major_name: String,
    pub minor_name: String,
}

impl CategoryLabel {
    pub fn new(major_name: impl Into<String>, minor_name: impl Into<String>) -> Self {
        Self {
            major_name: major_name.into(),
            minor_name: minor_name.into(),
        }
    }

    /// The synthetic bucket for transactions without a category
    pub fn uncategorized() -> Self {
        Self::new(UNCATEGORIZED, UNCATEGORIZED)
    }
}

impl fmt::Display for CategoryLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} / {}", self.major_name, self.minor_name)
    }
}
