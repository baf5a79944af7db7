//! Flatten command - lists every node of a document in pre-order.

use pathstore::StoreConfig;

use super::load_store;
use crate::cli::FlattenArgs;
use crate::output::{OutputFormat, print_json, print_table};

/// Run the flatten command
pub fn run(args: &FlattenArgs, format: OutputFormat) -> Result<(), Box<dyn std::error::Error>> {
    let store = load_store(&args.file, StoreConfig::default())?;
    let entries = store.flatten();

    match format {
        OutputFormat::Human => {
            let rows: Vec<Vec<String>> = entries
                .iter()
                .map(|entry| {
                    vec![
                        entry.to_string(),
                        entry.node.shape().to_string(),
                        entry.node.id().to_string(),
                        entry.node.meta().is_dirty().to_string(),
                    ]
                })
                .collect();
            print_table(&["PATH", "KIND", "ID", "DIRTY"], &rows);
        }
        OutputFormat::Json => {
            let value: Vec<_> = entries
                .iter()
                .map(|entry| {
                    serde_json::json!({
                        "path": entry.display_path,
                        "kind": entry.node.shape().as_str(),
                        "id": entry.node.id().to_string(),
                        "dirty": entry.node.meta().is_dirty(),
                    })
                })
                .collect();
            print_json(&serde_json::Value::Array(value))?;
        }
    }

    Ok(())
}
