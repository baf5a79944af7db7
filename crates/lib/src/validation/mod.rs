//! Declarative validation rules attached to store nodes.
//!
//! A node carries an optional list of [`Rule`]s in its metadata. Validating a
//! node evaluates the rules in order and records at most one [`FieldError`]:
//! the first rule that fails wins.
//!
//! # Rule kinds
//!
//! | kind | applies to | fails when |
//! |---|---|---|
//! | `required` | primitive | value is `null` or `""` |
//! | `min` / `max` | primitive | numeric value is below / above the bound |
//! | `minLength` / `maxLength` | string, array | length is below / above the bound |
//! | `regex` | string | value does not match the pattern |
//! | `custom` | any node | predicate returns `false` |
//!
//! Rules serialize to the same shape they are declared with in rule files:
//!
//! ```rust
//! # use pathstore::validation::Rule;
//! let rule: Rule = serde_json::from_str(r#"{"type": "minLength", "value": 3, "message": "Too short"}"#)?;
//! assert_eq!(rule, Rule::min_length(3, "Too short"));
//! # Ok::<(), serde_json::Error>(())
//! ```

use std::{cell::OnceCell, fmt, rc::Rc};

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    node::{Node, NodeValue},
    value::coerce_number,
};

mod rule_set;

pub use rule_set::RuleSet;

/// A predicate receiving the node's parsed value and the whole parsed store.
#[derive(Clone)]
pub struct CustomPredicate(Rc<dyn Fn(&Value, &Value) -> bool>);

impl CustomPredicate {
    pub fn new(predicate: impl Fn(&Value, &Value) -> bool + 'static) -> Self {
        Self(Rc::new(predicate))
    }

    /// Evaluates the predicate.
    pub fn check(&self, value: &Value, values: &Value) -> bool {
        (self.0)(value, values)
    }
}

impl fmt::Debug for CustomPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CustomPredicate(..)")
    }
}

/// Predicates are compared by identity.
impl PartialEq for CustomPredicate {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

/// The pattern of a `regex` rule.
///
/// Compiled on first use; clones share the compiled form. A pattern that
/// fails to compile is logged once and never matches anything.
#[derive(Clone, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Pattern {
    source: String,
    compiled: Rc<OnceCell<Option<Regex>>>,
}

impl Pattern {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            compiled: Rc::default(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// The compiled regex, or `None` if the pattern is malformed.
    pub fn regex(&self) -> Option<&Regex> {
        self.compiled
            .get_or_init(|| match Regex::new(&self.source) {
                Ok(regex) => Some(regex),
                Err(err) => {
                    tracing::warn!(pattern = %self.source, error = %err, "Regex rule does not compile and will never fire");
                    None
                }
            })
            .as_ref()
    }
}

impl From<String> for Pattern {
    fn from(source: String) -> Self {
        Self::new(source)
    }
}

impl From<Pattern> for String {
    fn from(pattern: Pattern) -> Self {
        pattern.source
    }
}

impl fmt::Debug for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Pattern").field(&self.source).finish()
    }
}

/// Patterns are compared by source.
impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

/// A validation rule declared against a node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Rule {
    Required {
        message: String,
    },
    Min {
        value: f64,
        message: String,
    },
    Max {
        value: f64,
        message: String,
    },
    MinLength {
        value: usize,
        message: String,
    },
    MaxLength {
        value: usize,
        message: String,
    },
    /// A pattern that fails to compile never fires.
    Regex {
        value: Pattern,
        message: String,
    },
    /// Not representable in rule files.
    #[serde(skip)]
    Custom {
        value: CustomPredicate,
        message: String,
    },
}

impl Rule {
    pub fn required(message: impl Into<String>) -> Self {
        Rule::Required {
            message: message.into(),
        }
    }

    pub fn min(value: f64, message: impl Into<String>) -> Self {
        Rule::Min {
            value,
            message: message.into(),
        }
    }

    pub fn max(value: f64, message: impl Into<String>) -> Self {
        Rule::Max {
            value,
            message: message.into(),
        }
    }

    pub fn min_length(value: usize, message: impl Into<String>) -> Self {
        Rule::MinLength {
            value,
            message: message.into(),
        }
    }

    pub fn max_length(value: usize, message: impl Into<String>) -> Self {
        Rule::MaxLength {
            value,
            message: message.into(),
        }
    }

    pub fn regex(pattern: impl Into<String>, message: impl Into<String>) -> Self {
        Rule::Regex {
            value: Pattern::new(pattern),
            message: message.into(),
        }
    }

    pub fn custom(
        predicate: impl Fn(&Value, &Value) -> bool + 'static,
        message: impl Into<String>,
    ) -> Self {
        Rule::Custom {
            value: CustomPredicate::new(predicate),
            message: message.into(),
        }
    }

    /// The wire name of this rule kind, also used as the error type.
    pub fn kind(&self) -> &'static str {
        match self {
            Rule::Required { .. } => "required",
            Rule::Min { .. } => "min",
            Rule::Max { .. } => "max",
            Rule::MinLength { .. } => "minLength",
            Rule::MaxLength { .. } => "maxLength",
            Rule::Regex { .. } => "regex",
            Rule::Custom { .. } => "custom",
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Rule::Required { message }
            | Rule::Min { message, .. }
            | Rule::Max { message, .. }
            | Rule::MinLength { message, .. }
            | Rule::MaxLength { message, .. }
            | Rule::Regex { message, .. }
            | Rule::Custom { message, .. } => message,
        }
    }

    pub fn is_custom(&self) -> bool {
        matches!(self, Rule::Custom { .. })
    }

    /// Returns true if `node` violates this rule.
    ///
    /// `values` is the parsed snapshot of the whole store; only custom
    /// predicates look at it.
    pub fn fails(&self, node: &Node, values: &Value) -> bool {
        if let Rule::Custom { value, .. } = self {
            return !value.check(&node.to_value(), values);
        }

        match node.value() {
            NodeValue::Primitive(current) => self.fails_primitive(current),
            NodeValue::Array { items, .. } => match self {
                Rule::MinLength { value, .. } => items.len() < *value,
                Rule::MaxLength { value, .. } => items.len() > *value,
                _ => false,
            },
            NodeValue::Object(_) => false,
        }
    }

    fn fails_primitive(&self, current: &Value) -> bool {
        match self {
            Rule::Required { .. } => match current {
                Value::Null => true,
                Value::String(text) => text.is_empty(),
                _ => false,
            },
            Rule::Min { value, .. } => coerce_number(current).is_some_and(|n| n < *value),
            Rule::Max { value, .. } => coerce_number(current).is_some_and(|n| n > *value),
            Rule::MinLength { value, .. } => current
                .as_str()
                .is_some_and(|text| text.chars().count() < *value),
            Rule::MaxLength { value, .. } => current
                .as_str()
                .is_some_and(|text| text.chars().count() > *value),
            Rule::Regex { value, .. } => match (current.as_str(), value.regex()) {
                (Some(text), Some(regex)) => !regex.is_match(text),
                _ => false,
            },
            Rule::Custom { .. } => false,
        }
    }
}

/// The single active validation error of a node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldError {
    /// Rule kind or caller-defined error type
    #[serde(rename = "type")]
    pub kind: String,
    pub message: String,
    /// Bound or pattern of the failing rule, when it has one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

impl FieldError {
    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            message: message.into(),
            value: None,
        }
    }

    pub fn with_value(mut self, value: impl Into<Value>) -> Self {
        self.value = Some(value.into());
        self
    }
}

impl From<&Rule> for FieldError {
    fn from(rule: &Rule) -> Self {
        let error = FieldError::new(rule.kind(), rule.message());
        match rule {
            Rule::Min { value, .. } | Rule::Max { value, .. } => error.with_value(*value),
            Rule::MinLength { value, .. } | Rule::MaxLength { value, .. } => {
                error.with_value(*value)
            }
            Rule::Regex { value, .. } => error.with_value(value.as_str()),
            Rule::Required { .. } | Rule::Custom { .. } => error,
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}
