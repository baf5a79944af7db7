//! Rule sets keyed by display path.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::Rule;
use crate::path::Path;

/// Rules for many nodes at once, keyed by display path.
///
/// This is the file format accepted by the `pathstore validate` command:
///
/// ```json
/// {
///   "name": [{"type": "required", "message": "Name is required"}],
///   "friends": [{"type": "minLength", "value": 1, "message": "Add a friend"}]
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleSet {
    rules: BTreeMap<String, Vec<Rule>>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds rules for a path, appending to any rules already present.
    pub fn insert(&mut self, path: impl AsRef<Path>, rules: Vec<Rule>) {
        self.rules
            .entry(path.as_ref().to_display_path())
            .or_default()
            .extend(rules);
    }

    /// Builder-style variant of [`RuleSet::insert`].
    pub fn with(mut self, path: impl AsRef<Path>, rules: Vec<Rule>) -> Self {
        self.insert(path, rules);
        self
    }

    /// Iterates over `(path, rules)` pairs in display-path order.
    pub fn iter(&self) -> impl Iterator<Item = (Path, &[Rule])> {
        self.rules
            .iter()
            .map(|(display, rules)| (Path::from_display_path(display), rules.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Parses a rule set from JSON text.
    pub fn from_json(json: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
