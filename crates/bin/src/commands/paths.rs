//! Paths command - shows how a display path decodes.

use pathstore::{Path, path::Segment};

use crate::cli::PathsArgs;
use crate::output::{OutputFormat, print_json, print_table};

/// Run the paths command
pub fn run(args: &PathsArgs, format: OutputFormat) -> Result<(), Box<dyn std::error::Error>> {
    let path = Path::from_display_path(&args.path);
    let storage = path.to_storage_path();

    match format {
        OutputFormat::Human => {
            println!("Display:   {path}");
            println!("Storage:   {}", render(storage.segments()));
            let rows: Vec<Vec<String>> = path
                .segments()
                .iter()
                .map(|segment| {
                    let kind = if segment.is_index() { "index" } else { "key" };
                    vec![kind.to_string(), segment.to_string()]
                })
                .collect();
            if !rows.is_empty() {
                println!();
            }
            print_table(&["KIND", "SEGMENT"], &rows);
        }
        OutputFormat::Json => {
            let value = serde_json::json!({
                "display": path.to_display_path(),
                "segments": path.segments(),
                "storage": storage.segments(),
            });
            print_json(&value)?;
        }
    }

    Ok(())
}

fn render(segments: &[Segment]) -> String {
    let tokens: Vec<String> = segments
        .iter()
        .map(|segment| match segment {
            Segment::Key(key) => format!("{key:?}"),
            Segment::Index(index) => index.to_string(),
        })
        .collect();
    format!("[{}]", tokens.join(", "))
}
