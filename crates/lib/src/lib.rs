//!
//! Pathstore: a path-addressed reactive data store.
//!
//! The store keeps a tree of plain data where every node carries its own
//! metadata and can be read, mutated and observed on its own.
//!
//! ## Core Concepts
//!
//! * **Paths (`path::Path`)**: Ordered key/index segments addressing a node, with a display form
//!   (`items[0].name`) that doubles as the node's subscription topic.
//! * **Nodes (`node::Node`)**: A primitive, object or array value plus `node::Meta`: a stable id,
//!   dirty and touched flags, the active validation error, registered rules and the default value.
//! * **Store (`store::Store`)**: Owns one tree, the dirty-id set, the error list and the bus. All
//!   mutation goes through it: `set_value`, `set_meta`, the `array()` family and `reset`.
//! * **Bus (`bus::EventBus`)**: Synchronous named-topic publish/subscribe that observers use to
//!   learn exactly which node changed.
//! * **Validation (`validation::Rule`)**: Declarative per-node rules, checked one node at a time
//!   or across the whole store before a submission.

pub mod array;
pub mod bus;
pub mod node;
pub mod path;
pub mod store;
pub mod validation;
pub mod value;

pub use bus::{Event, EventBus, Subscription};
pub use node::{FlatNode, Node, NodeId};
pub use path::Path;
pub use store::{Store, StoreConfig, ValidationMode};

/// Result type used throughout the Pathstore library.
pub type Result<T> = std::result::Result<T, Error>;

/// Common error type for the Pathstore library.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Structured store errors from the store module
    #[error(transparent)]
    Store(store::StoreError),
}

impl Error {
    /// Get the originating module for this error.
    pub fn module(&self) -> &'static str {
        match self {
            Error::Store(_) => "store",
            Error::Io(_) => "io",
            Error::Serialize(_) => "serialize",
        }
    }

    /// Check if this error indicates a node was not found.
    pub fn is_not_found(&self) -> bool {
        match self {
            Error::Store(store_err) => store_err.is_not_found(),
            _ => false,
        }
    }

    /// Check if this error is a type mismatch, such as an array operation on a non-array.
    pub fn is_type_error(&self) -> bool {
        match self {
            Error::Store(store_err) => store_err.is_type_error(),
            _ => false,
        }
    }

    /// Check if this error blocks a submission.
    pub fn is_validation_failure(&self) -> bool {
        match self {
            Error::Store(store_err) => store_err.is_validation_failure(),
            _ => false,
        }
    }

    /// The offending nodes of a failed whole-store validation.
    pub fn validation_entries(&self) -> Option<&[FlatNode]> {
        match self {
            Error::Store(store_err) => store_err.validation_entries(),
            _ => None,
        }
    }

    /// Check if this error is I/O related.
    pub fn is_io_error(&self) -> bool {
        matches!(self, Error::Io(_))
    }

    /// Check if this error came from parsing or producing JSON.
    pub fn is_serialization_error(&self) -> bool {
        matches!(self, Error::Serialize(_))
    }
}
