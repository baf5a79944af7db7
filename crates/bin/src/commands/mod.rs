//! Subcommand implementations.

use std::{fs, path::Path};

use pathstore::{Store, StoreConfig};
use serde_json::Value;

pub mod flatten;
pub mod get;
pub mod paths;
pub mod validate;

/// Read a JSON document from disk.
pub fn read_json(file: &Path) -> Result<Value, Box<dyn std::error::Error>> {
    let contents = fs::read_to_string(file)
        .map_err(|e| format!("Failed to read {}: {e}", file.display()))?;
    Ok(serde_json::from_str(&contents)?)
}

/// Load a JSON document into a fresh store.
pub fn load_store(file: &Path, config: StoreConfig) -> Result<Store, Box<dyn std::error::Error>> {
    let document = read_json(file)?;
    tracing::debug!(file = %file.display(), "Loaded document");
    Ok(Store::with_config(document, config))
}
