//! Per-node metadata.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::validation::{FieldError, Rule};

/// Stable identity of a node.
///
/// Assigned when the node is created and never reassigned while it lives.
/// Used as the subscription key for observers and as the dirty-set element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(Uuid);

impl NodeId {
    /// Allocates a fresh random identity.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Bookkeeping carried by every node.
#[derive(Debug, Clone, PartialEq)]
pub struct Meta {
    pub(crate) id: NodeId,
    pub(crate) dirty: bool,
    pub(crate) touched: bool,
    pub(crate) error: Option<FieldError>,
    pub(crate) validations: Option<Vec<Rule>>,
    pub(crate) default_value: Value,
    /// False for containers synthesized while writing a deep path, until an
    /// ancestor repair captures their defaults.
    pub(crate) established: bool,
}

impl Meta {
    /// Fresh metadata with a new id and `default_value` as the dirty baseline.
    pub fn new(default_value: Value) -> Self {
        Self {
            id: NodeId::new(),
            dirty: false,
            touched: false,
            error: None,
            validations: None,
            default_value,
            established: true,
        }
    }

    pub(crate) fn placeholder() -> Self {
        Self {
            established: false,
            ..Self::new(Value::Null)
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn is_touched(&self) -> bool {
        self.touched
    }

    pub fn error(&self) -> Option<&FieldError> {
        self.error.as_ref()
    }

    pub fn validations(&self) -> Option<&[Rule]> {
        self.validations.as_deref()
    }

    pub fn default_value(&self) -> &Value {
        &self.default_value
    }

    pub fn is_established(&self) -> bool {
        self.established
    }

    /// Shallow-merges `update` into this record. The id is never touched.
    pub fn apply(&mut self, update: MetaUpdate) {
        if let Some(dirty) = update.dirty {
            self.dirty = dirty;
        }
        if let Some(touched) = update.touched {
            self.touched = touched;
        }
        if let Some(error) = update.error {
            self.error = error;
        }
        if let Some(validations) = update.validations {
            self.validations = validations;
        }
        if let Some(default_value) = update.default_value {
            self.default_value = default_value;
        }
    }
}

/// A partial [`Meta`] used by `set_meta`. Unset fields are left alone.
///
/// ```rust
/// # use pathstore::node::MetaUpdate;
/// # use pathstore::validation::Rule;
/// let update = MetaUpdate::new()
///     .touched(true)
///     .validations(vec![Rule::required("Required")]);
/// assert!(!update.is_empty());
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetaUpdate {
    dirty: Option<bool>,
    touched: Option<bool>,
    error: Option<Option<FieldError>>,
    validations: Option<Option<Vec<Rule>>>,
    default_value: Option<Value>,
}

impl MetaUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dirty(mut self, dirty: bool) -> Self {
        self.dirty = Some(dirty);
        self
    }

    pub fn touched(mut self, touched: bool) -> Self {
        self.touched = Some(touched);
        self
    }

    pub fn error(mut self, error: FieldError) -> Self {
        self.error = Some(Some(error));
        self
    }

    pub fn clear_error(mut self) -> Self {
        self.error = Some(None);
        self
    }

    pub fn validations(mut self, rules: Vec<Rule>) -> Self {
        self.validations = Some(Some(rules));
        self
    }

    pub fn clear_validations(mut self) -> Self {
        self.validations = Some(None);
        self
    }

    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}
