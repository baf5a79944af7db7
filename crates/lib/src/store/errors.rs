//! Error types for store operations.

use thiserror::Error;

use crate::node::FlatNode;

/// Errors raised by [`Store`](super::Store) operations.
///
/// Reads never fail: a missing path reads as `None`. Only metadata and
/// mutation operations on a node that does not exist are errors.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum StoreError {
    /// No node lives at the given path
    #[error("The target path \"{path}\" does not exist")]
    PathNotFound { path: String },

    /// An array operation targeted a missing or non-array node
    #[error("The target path \"{path}\" is not an array")]
    NotAnArray { path: String },

    /// A write addressed an existing container with a segment of the other
    /// shape, such as a key into an array
    #[error("The target path \"{path}\" crosses a node of another shape")]
    PathConflict { path: String },

    /// Whole-store validation left at least one node in error.
    ///
    /// Carries every offending node, in tree order. The errors themselves
    /// stay on the nodes for observers to render.
    #[error("Validation failed at {} path(s)", .entries.len())]
    ValidationFailed { entries: Vec<FlatNode> },

    /// An external validator refused the submitted values
    #[error("Validator rejected the values: {reason}")]
    ValidatorRejected { reason: String },

    /// A mutation was attempted while the store state was already borrowed
    #[error("Store state is busy, cannot run '{operation}'")]
    ReentrantAccess { operation: &'static str },
}

impl StoreError {
    pub(crate) fn path_not_found(path: &str) -> Self {
        StoreError::PathNotFound {
            path: path.to_string(),
        }
    }

    pub(crate) fn path_conflict(path: &str) -> Self {
        StoreError::PathConflict {
            path: path.to_string(),
        }
    }

    pub(crate) fn not_an_array(path: &str) -> Self {
        StoreError::NotAnArray {
            path: path.to_string(),
        }
    }

    /// Check if this error indicates a missing node
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::PathNotFound { .. })
    }

    /// Check if this error indicates a shape mismatch, on an array operation
    /// or on a write through an existing container
    pub fn is_type_error(&self) -> bool {
        matches!(
            self,
            StoreError::NotAnArray { .. } | StoreError::PathConflict { .. }
        )
    }

    /// Check if this error blocks a submission
    pub fn is_validation_failure(&self) -> bool {
        matches!(
            self,
            StoreError::ValidationFailed { .. } | StoreError::ValidatorRejected { .. }
        )
    }

    /// The offending nodes of a failed whole-store validation
    pub fn validation_entries(&self) -> Option<&[FlatNode]> {
        match self {
            StoreError::ValidationFailed { entries } => Some(entries),
            _ => None,
        }
    }

    /// Get the display path associated with this error
    pub fn path(&self) -> Option<&str> {
        match self {
            StoreError::PathNotFound { path }
            | StoreError::NotAnArray { path }
            | StoreError::PathConflict { path } => Some(path),
            _ => None,
        }
    }
}

impl From<StoreError> for crate::Error {
    fn from(err: StoreError) -> Self {
        crate::Error::Store(err)
    }
}
