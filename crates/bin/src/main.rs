use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;
mod output;

use cli::{Cli, Commands};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Logs go to stderr so JSON output stays machine readable
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("pathstore=info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let format = cli.format.into();

    match &cli.command {
        Commands::Flatten(args) => commands::flatten::run(args, format),
        Commands::Get(args) => commands::get::run(args, format),
        Commands::Paths(args) => commands::paths::run(args, format),
        Commands::Validate(args) => commands::validate::run(args, format),
    }
}
