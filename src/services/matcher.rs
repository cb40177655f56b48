//! Alias and exclusion-rule matching
//!
//! Exclusion rules compare category names by exact equality; aliases match
//! when they occur anywhere in the memo. Both are case-sensitive with no
//! normalisation. Rule sets are a household's short fixed list, so every
//! lookup is a linear scan in input order.

use crate::models::{ExclusionRule, ExclusionRuleId, MemberId, UserAlias};

/// The first exclusion rule whose names both equal the category's
pub fn matches_exclusion(
    major_name: &str,
    minor_name: &str,
    rules: &[ExclusionRule],
) -> Option<ExclusionRuleId> {
    rules
        .iter()
        .find(|rule| rule.matches(major_name, minor_name))
        .map(|rule| rule.id)
}

/// The member owning the first alias that occurs in the memo
///
/// Empty aliases never match; otherwise every memo would be attributed to
/// whoever registered a blank alias.
pub fn alias_owner(memo: &str, aliases: &[UserAlias]) -> Option<MemberId> {
    aliases
        .iter()
        .find(|a| !a.alias.is_empty() && memo.contains(a.alias.as_str()))
        .map(|a| a.member_id)
}

/// Whether the memo mentions any member's alias
pub fn mentions_alias(memo: &str, aliases: &[UserAlias]) -> bool {
    alias_owner(memo, aliases).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules() -> Vec<ExclusionRule> {
        vec![
            ExclusionRule::new(ExclusionRuleId::new(3), "住宅", "家賃"),
            ExclusionRule::new(ExclusionRuleId::new(7), "保険", "生命保険"),
            ExclusionRule::new(ExclusionRuleId::new(9), "保険", "生命保険"),
        ]
    }

    fn aliases() -> Vec<UserAlias> {
        vec![
            UserAlias::new(MemberId::new(1), "たろう"),
            UserAlias::new(MemberId::new(2), "Hanako"),
            UserAlias::new(MemberId::new(3), ""),
        ]
    }

    #[test]
    fn test_matches_exclusion() {
        assert_eq!(
            matches_exclusion("住宅", "家賃", &rules()),
            Some(ExclusionRuleId::new(3))
        );
        assert_eq!(matches_exclusion("住宅", "光熱費", &rules()), None);
        assert_eq!(matches_exclusion("家賃", "住宅", &rules()), None);
    }

    #[test]
    fn test_first_matching_rule_wins() {
        assert_eq!(
            matches_exclusion("保険", "生命保険", &rules()),
            Some(ExclusionRuleId::new(7))
        );
    }

    #[test]
    fn test_alias_found_inside_memo() {
        assert_eq!(alias_owner("Hanako", &aliases()), Some(MemberId::new(2)));
        assert_eq!(alias_owner("Hanako ランチ", &aliases()), Some(MemberId::new(2)));
        assert_eq!(alias_owner("昼食 たろう分", &aliases()), Some(MemberId::new(1)));
        assert!(mentions_alias("Hanako ランチ", &aliases()));
        assert!(!mentions_alias("スーパー", &aliases()));
    }

    #[test]
    fn test_alias_is_case_sensitive() {
        assert_eq!(alias_owner("hanako ランチ", &aliases()), None);
        assert_eq!(alias_owner("HANAKO", &aliases()), None);
    }

    #[test]
    fn test_first_alias_in_input_order_wins() {
        assert_eq!(alias_owner("たろう と Hanako", &aliases()), Some(MemberId::new(1)));
    }

    #[test]
    fn test_empty_alias_never_matches() {
        assert_eq!(alias_owner("", &aliases()), None);
        assert_eq!(alias_owner("コンビニ", &aliases()), None);
        assert!(!mentions_alias("", &aliases()));
    }

    #[test]
    fn test_empty_inputs() {
        assert_eq!(matches_exclusion("住宅", "家賃", &[]), None);
        assert!(!mentions_alias("たろう", &[]));
    }
}
