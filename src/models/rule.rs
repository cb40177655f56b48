//! Household exclusion rules and member aliases

use serde::{Deserialize, Serialize};

use super::ids::{ExclusionRuleId, MemberId};

/// A category that is never shared by the household
///
/// Matches when both names are byte-equal to the transaction's category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExclusionRule {
    pub id: ExclusionRuleId,
    pub major_name: String,
    pub minor_name: String,
}

impl ExclusionRule {
    pub fn new(
        id: ExclusionRuleId,
        major_name: impl Into<String>,
        minor_name: impl Into<String>,
    ) -> Self {
        Self {
            id,
            major_name: major_name.into(),
            minor_name: minor_name.into(),
        }
    }

    /// Exact, case-sensitive match on both names
    pub fn matches(&self, major_name: &str, minor_name: &str) -> bool {
        self.major_name == major_name && self.minor_name == minor_name
    }
}

/// A string that identifies a member when written in a memo
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAlias {
    pub member_id: MemberId,
    pub alias: String,
}

impl UserAlias {
    pub fn new(member_id: MemberId, alias: impl Into<String>) -> Self {
        Self {
            member_id,
            alias: alias.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_matches_exactly() {
        let rule = ExclusionRule::new(ExclusionRuleId::new(7), "住宅", "家賃");
        assert!(rule.matches("住宅", "家賃"));
        assert!(!rule.matches("住宅", "家賃 "));
        assert!(!rule.matches("住宅", "管理費"));
    }

    #[test]
    fn test_rule_is_case_sensitive() {
        let rule = ExclusionRule::new(ExclusionRuleId::new(1), "Housing", "Rent");
        assert!(!rule.matches("housing", "rent"));
    }
}
