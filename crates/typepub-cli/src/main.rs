#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::cast_possible_truncation)]

mod commands;
mod logging;

use clap::Parser;
use miette::Result;
use std::path::PathBuf;
use typepub_core::Config;

#[derive(Parser, Debug)]
#[command(name = "typepub")]
#[command(author, version, about = "Generates publishable @types packages", long_about = None)]
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

    /// Generate package directories ready for `npm publish`
    Generate {
        /// Package index listing typings and not-needed stubs
        #[arg(long, value_name = "FILE")]
        index: PathBuf,

        /// Version table mapping full npm names to publish versions
        #[arg(long, value_name = "FILE")]
        versions: PathBuf,

        /// Settings file (defaults to ./typepub.json when present)
        #[arg(long, value_name = "FILE")]
        settings: Option<PathBuf>,

        /// Declarations repository checkout
        #[arg(long = "dt", value_name = "PATH", env = "TYPEPUB_DT_PATH")]
        definitely_typed: Option<PathBuf>,

        /// Root directory for generated packages
        #[arg(long, value_name = "PATH")]
        output: Option<PathBuf>,

        /// Branch named in README source links
        #[arg(long, value_name = "NAME")]
        branch: Option<String>,

        /// Packages generated at the same time
        #[arg(short, long, default_value = "8", value_parser = clap::value_parser!(u32).range(1..=256))]
        jobs: u32,

        /// Only generate these packages (typing names or full npm names)
        names: Vec<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let cwd = cli
        .cwd
        .or_else(|| std::env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("."));

    let config = Config::new(cwd.clone())
        .with_verbosity(cli.verbose)
        .with_json_logs(cli.json);

    logging::init(config.verbosity, config.json_logs);

    match cli.command {
        Some(Commands::Version) | None => commands::version::run(),
        Some(Commands::Generate {
            index,
            versions,
            settings,
            definitely_typed,
            output,
            branch,
            jobs,
            names,
        }) => commands::generate::run(
            &config,
            commands::generate::GenerateArgs {
                index,
                versions,
                settings,
                definitely_typed,
                output,
                branch,
                jobs: jobs as usize,
                names,
            },
        ),
    }
}
