//! Validate command - applies a rule file and reports failing paths.

use std::fs;

use pathstore::{FlatNode, Store, StoreConfig, validation::RuleSet};

use super::load_store;
use crate::cli::ValidateArgs;
use crate::output::{OutputFormat, print_json, print_table};

/// Run the validate command
///
/// Returns an error when any path fails, so the process exits non-zero.
pub fn run(args: &ValidateArgs, format: OutputFormat) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = match &args.config {
        Some(file) => StoreConfig::from_json(&fs::read_to_string(file)?)?,
        None => StoreConfig::default(),
    };
    if let Some(mode) = args.mode {
        config = config.with_mode(mode.into());
    }

    let store = load_store(&args.file, config)?;
    let rules = RuleSet::from_json(&fs::read_to_string(&args.rules)?)?;
    store.apply_rules(&rules)?;
    tracing::debug!(rules = rules.len(), mode = %store.mode(), "Applied rule set");

    let failures = failing_entries(&store)?;

    match format {
        OutputFormat::Human => {
            if failures.is_empty() {
                println!("All {} rule path(s) passed.", rules.len());
            }
            let rows: Vec<Vec<String>> = failures
                .iter()
                .map(|entry| {
                    let (kind, message) = entry
                        .node
                        .meta()
                        .error()
                        .map(|error| (error.kind.clone(), error.message.clone()))
                        .unwrap_or_default();
                    vec![entry.to_string(), kind, message]
                })
                .collect();
            print_table(&["PATH", "RULE", "MESSAGE"], &rows);
        }
        OutputFormat::Json => {
            let value: Vec<_> = failures
                .iter()
                .map(|entry| {
                    serde_json::json!({
                        "path": entry.display_path,
                        "error": entry.node.meta().error(),
                    })
                })
                .collect();
            print_json(&serde_json::Value::Array(value))?;
        }
    }

    if failures.is_empty() {
        Ok(())
    } else {
        Err(format!("{} path(s) failed validation", failures.len()).into())
    }
}

/// Runs whole-store validation, turning a validation failure into its entries.
fn failing_entries(store: &Store) -> pathstore::Result<Vec<FlatNode>> {
    match store.validate_store() {
        Ok(()) => Ok(Vec::new()),
        Err(err) => match err.validation_entries() {
            Some(entries) => Ok(entries.to_vec()),
            None => Err(err),
        },
    }
}
