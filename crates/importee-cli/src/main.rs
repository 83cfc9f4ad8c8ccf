#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::struct_excessive_bools)]

mod commands;
mod logging;

use clap::Parser;
use commands::OptionArgs;
use miette::{IntoDiagnostic, Result};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "importee")]
#[command(author, version, about = "Resolve import specifiers to files", long_about = None)]
struct Cli {
    /// Increase logging verbosity (-v for DEBUG, -vv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Emit JSON formatted output (stable, machine-readable)
    #[arg(long, global = true)]
    json: bool,

    /// Override the working directory
    #[arg(long, global = true, value_name = "PATH")]
    cwd: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Print version information
    Version,

    /// Resolve a specifier and print the file path
    Resolve {
        /// The import specifier (e.g. "./utils", "lodash", "@scope/pkg/sub")
        specifier: String,

        #[command(flatten)]
        options: OptionArgs,
    },

    /// Show how a specifier resolves, step by step
    Explain {
        /// The import specifier
        specifier: String,

        #[command(flatten)]
        options: OptionArgs,
    },

    /// Resolve several specifiers from the same importer
    Batch {
        /// The import specifiers
        #[arg(required = true)]
        specifiers: Vec<String>,

        #[command(flatten)]
        options: OptionArgs,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let cwd = std::path::absolute(cli.cwd.unwrap_or_else(|| PathBuf::from(".")))
        .into_diagnostic()?;

    logging::init(cli.verbose, cli.json);

    match cli.command {
        Some(Commands::Version) | None => commands::version::run(cli.json),
        Some(Commands::Resolve { specifier, options }) => {
            let span = tracing::info_span!("resolve", cmd = "resolve", cwd = %cwd.display());
            let _guard = span.enter();
            commands::resolve::run(&cwd, &specifier, &options, cli.json)
        }
        Some(Commands::Explain { specifier, options }) => {
            let span = tracing::info_span!("explain", cmd = "explain", cwd = %cwd.display());
            let _guard = span.enter();
            commands::explain::run(&cwd, &specifier, &options, cli.json)
        }
        Some(Commands::Batch {
            specifiers,
            options,
        }) => {
            let span = tracing::info_span!("batch", cmd = "batch", cwd = %cwd.display());
            let _guard = span.enter();
            commands::batch::run(&cwd, &specifiers, &options, cli.json)
        }
    }
}
