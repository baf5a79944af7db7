//! CLI argument definitions for the pathstore binary.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use pathstore::ValidationMode;

use crate::output::OutputFormat;

/// Output format flag
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum Format {
    /// Aligned columns for terminals
    #[default]
    Human,
    /// One JSON document per invocation
    Json,
}

impl From<Format> for OutputFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Human => OutputFormat::Human,
            Format::Json => OutputFormat::Json,
        }
    }
}

/// When validation runs
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Mode {
    /// Validate only when the whole store is checked
    #[value(name = "onSubmit", alias = "on-submit")]
    OnSubmit,
    /// Validate every node as it is written
    #[value(name = "onChange", alias = "on-change")]
    OnChange,
}

impl From<Mode> for ValidationMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::OnSubmit => ValidationMode::OnSubmit,
            Mode::OnChange => ValidationMode::OnChange,
        }
    }
}

/// Inspect and validate JSON documents with the pathstore engine
#[derive(Parser, Debug)]
#[command(name = "pathstore")]
#[command(about = "Pathstore: a path-addressed reactive data store")]
#[command(version)]
pub struct Cli {
    /// Output format
    #[arg(long, global = true, default_value = "human")]
    pub format: Format,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List every node of a document in pre-order
    Flatten(FlattenArgs),
    /// Print the value stored at a display path
    Get(GetArgs),
    /// Show how a display path is decoded
    Paths(PathsArgs),
    /// Apply a rule file to a document and report failures
    Validate(ValidateArgs),
}

/// Arguments for the flatten command
#[derive(clap::Args, Debug)]
pub struct FlattenArgs {
    /// JSON document to load
    pub file: PathBuf,
}

/// Arguments for the get command
#[derive(clap::Args, Debug)]
pub struct GetArgs {
    /// JSON document to load
    pub file: PathBuf,

    /// Display path such as `friends[0].name`; empty for the root
    pub path: String,
}

/// Arguments for the paths command
#[derive(clap::Args, Debug)]
pub struct PathsArgs {
    /// Display path to decode
    pub path: String,
}

/// Arguments for the validate command
#[derive(clap::Args, Debug)]
pub struct ValidateArgs {
    /// JSON document to load
    pub file: PathBuf,

    /// JSON rule file mapping display paths to rule lists
    #[arg(short, long)]
    pub rules: PathBuf,

    /// Store configuration file (JSON)
    #[arg(short, long, env = "PATHSTORE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Validation mode, overriding the configuration file
    #[arg(short, long, env = "PATHSTORE_MODE")]
    pub mode: Option<Mode>,
}
