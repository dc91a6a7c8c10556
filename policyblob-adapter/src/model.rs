//! In-memory policy model: rule sections keyed by rule-type tag.

use std::collections::BTreeMap;
use std::fmt;

/// One rule: its fields without the rule-type tag.
pub type Rule = Vec<String>;

/// Which family a rule type belongs to. Permission rules encode first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Section {
    /// Permission rules (`p`, `p2`, ...).
    Policy,
    /// Grouping rules (`g`, `g2`, ...).
    Grouping,
}

impl Section {
    pub fn as_str(&self) -> &'static str {
        match self {
            Section::Policy => "p",
            Section::Grouping => "g",
        }
    }

    /// Section a rule-type tag belongs to, from its first character.
    pub fn of_tag(tag: &str) -> Option<Self> {
        match tag.chars().next()? {
            'p' => Some(Section::Policy),
            'g' => Some(Section::Grouping),
            _ => None,
        }
    }

    /// Whether `ptype` is a rule-type tag of this section: its own letter
    /// followed by ASCII letters, digits or `_`.
    pub fn accepts(&self, ptype: &str) -> bool {
        Section::of_tag(ptype) == Some(*self)
            && ptype.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Section → rule-type tag → rules in insertion order.
///
/// Empty rule lists are never kept, so two models holding the same rules in
/// the same order compare equal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PolicyModel {
    sections: BTreeMap<Section, BTreeMap<String, Vec<Rule>>>,
}

impl PolicyModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a rule.
    ///
    /// Returns false for an empty or duplicate rule, a rule type that is not
    /// a tag of `section`, or a field holding a line break.
    pub fn add_policy(&mut self, section: Section, ptype: &str, rule: Rule) -> bool {
        if rule.is_empty()
            || !section.accepts(ptype)
            || rule.iter().any(|field| field.contains(['\n', '\r']))
            || self.has_policy(section, ptype, &rule)
        {
            return false;
        }
        self.sections
            .entry(section)
            .or_default()
            .entry(ptype.to_string())
            .or_default()
            .push(rule);
        true
    }

    pub fn has_policy(&self, section: Section, ptype: &str, rule: &[String]) -> bool {
        self.get_policy(section, ptype).iter().any(|r| r == rule)
    }

    /// Rules of one type, in insertion order.
    pub fn get_policy(&self, section: Section, ptype: &str) -> &[Rule] {
        self.sections
            .get(&section)
            .and_then(|types| types.get(ptype))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Removes a rule. Returns whether it was present.
    pub fn remove_policy(&mut self, section: Section, ptype: &str, rule: &[String]) -> bool {
        let Some(types) = self.sections.get_mut(&section) else {
            return false;
        };
        let Some(rules) = types.get_mut(ptype) else {
            return false;
        };
        let before = rules.len();
        rules.retain(|r| r != rule);
        let removed = rules.len() != before;

        if rules.is_empty() {
            types.remove(ptype);
        }
        if types.is_empty() {
            self.sections.remove(&section);
        }
        removed
    }

    /// Rule types of a section with their rules, in tag order.
    pub fn rule_types(&self, section: Section) -> impl Iterator<Item = (&str, &[Rule])> {
        self.sections
            .get(&section)
            .into_iter()
            .flat_map(|types| types.iter().map(|(t, rules)| (t.as_str(), rules.as_slice())))
    }

    pub fn rule_count(&self) -> usize {
        self.sections
            .values()
            .flat_map(BTreeMap::values)
            .map(Vec::len)
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn clear(&mut self) {
        self.sections.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(fields: &[&str]) -> Rule {
        fields.iter().map(|f| f.to_string()).collect()
    }

    #[test]
    fn section_of_tag() {
        assert_eq!(Section::of_tag("p"), Some(Section::Policy));
        assert_eq!(Section::of_tag("p2"), Some(Section::Policy));
        assert_eq!(Section::of_tag("g3"), Some(Section::Grouping));
        assert_eq!(Section::of_tag("m"), None);
        assert_eq!(Section::of_tag(""), None);
    }

    #[test]
    fn duplicate_and_empty_rules_are_rejected() {
        let mut model = PolicyModel::new();
        assert!(model.add_policy(Section::Policy, "p", rule(&["alice", "data1", "read"])));
        assert!(!model.add_policy(Section::Policy, "p", rule(&["alice", "data1", "read"])));
        assert!(!model.add_policy(Section::Policy, "p", Vec::new()));
        assert_eq!(model.rule_count(), 1);
    }

    #[test]
    fn section_accepts_only_its_own_tags() {
        assert!(Section::Policy.accepts("p"));
        assert!(Section::Policy.accepts("p_2"));
        assert!(!Section::Policy.accepts("g"));
        assert!(!Section::Grouping.accepts("g 2"));
        assert!(!Section::Grouping.accepts("g,"));
    }

    #[test]
    fn rules_that_cannot_be_stored_line_by_line_are_rejected() {
        let mut model = PolicyModel::new();
        assert!(!model.add_policy(Section::Policy, "p", rule(&["alice", "data\n1"])));
        assert!(!model.add_policy(Section::Policy, "p", rule(&["alice\r", "data1"])));
        assert!(!model.add_policy(Section::Policy, "g", rule(&["alice", "admin"])));
        assert!(model.add_policy(Section::Policy, "p", rule(&[" alice", "data1, data2", ""])));
        assert_eq!(model.rule_count(), 1);
    }

    #[test]
    fn removing_last_rule_leaves_model_equal_to_empty() {
        let mut model = PolicyModel::new();
        model.add_policy(Section::Grouping, "g", rule(&["alice", "admin"]));
        assert!(model.remove_policy(Section::Grouping, "g", &rule(&["alice", "admin"])));
        assert!(!model.remove_policy(Section::Grouping, "g", &rule(&["alice", "admin"])));
        assert!(model.is_empty());
        assert_eq!(model, PolicyModel::new());
    }

    #[test]
    fn rule_types_iterate_in_tag_order() {
        let mut model = PolicyModel::new();
        model.add_policy(Section::Policy, "p2", rule(&["b"]));
        model.add_policy(Section::Policy, "p", rule(&["a"]));
        let tags: Vec<&str> = model.rule_types(Section::Policy).map(|(t, _)| t).collect();
        assert_eq!(tags, vec!["p", "p2"]);
        assert_eq!(model.rule_types(Section::Grouping).count(), 0);
    }
}
