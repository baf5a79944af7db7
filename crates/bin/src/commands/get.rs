//! Get command - prints the parsed value at a display path.

use pathstore::{Path, StoreConfig};
use serde_json::Value;

use super::load_store;
use crate::cli::GetArgs;
use crate::output::{OutputFormat, print_json};

/// Run the get command
pub fn run(args: &GetArgs, format: OutputFormat) -> Result<(), Box<dyn std::error::Error>> {
    let store = load_store(&args.file, StoreConfig::default())?;
    let path = Path::from_display_path(&args.path);
    let value = store.get(&path).unwrap_or(Value::Null);

    match format {
        OutputFormat::Human => println!("{}", serde_json::to_string_pretty(&value)?),
        OutputFormat::Json => print_json(&value)?,
    }

    Ok(())
}
