//! DRL Rewrite CLI
//!
//! Command-line interface for checking DRL files and migrating them to DRL 10

mod commands;
mod output;

use std::io::IsTerminal;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use drl_core::init_tracing_with;
use tracing::error;

#[derive(Parser)]
#[command(name = "drl-rewrite")]
#[command(about = "drl-rewrite: lossless DRL checking and DRL 10 migration")]
#[command(version = drl_core::VERSION)]
#[command(
    long_about = "drl-rewrite parses Drools rule files without losing a byte and rewrites them\n\
with migration recipes, leaving everything a recipe does not touch as it was.\n\
\n\
Examples:\n  \
drl-rewrite check rules/                  # Report syntax errors in every .drl file\n  \
drl-rewrite migrate rules/                # Show the DRL 10 migration as a diff\n  \
drl-rewrite migrate --write rules/        # Apply the migration in place\n  \
drl-rewrite tree rules/orders.drl         # Print the syntax tree of one file"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(
        short,
        long,
        global = true,
        help = "Path to configuration file (default: ./drl-rewrite.toml if present)"
    )]
    config: Option<PathBuf>,

    /// Verbose output (can be used multiple times for increased verbosity)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Number of threads to use for parallel processing
    #[arg(
        short = 'j',
        long,
        global = true,
        help = "Number of threads (default: number of CPU cores)"
    )]
    threads: Option<usize>,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse DRL files and report diagnostics
    #[command(alias = "lint")]
    Check {
        /// Files or directories to check
        #[arg(help = "Files or directories to process (default: current directory)")]
        paths: Vec<PathBuf>,

        /// Output format
        #[arg(short, long, default_value = "text", help = "Output format for diagnostics")]
        format: OutputFormat,
    },

    /// Migrate DRL files to DRL 10 syntax
    Migrate {
        /// Files or directories to migrate
        #[arg(help = "Files or directories to process (default: current directory)")]
        paths: Vec<PathBuf>,

        /// Write migrated files instead of printing a diff
        #[arg(long, help = "Write changes to files")]
        write: bool,

        /// Recipes to run instead of the full migration
        #[arg(
            long = "recipe",
            value_name = "RECIPE_ID",
            help = "Run only this recipe (can be used multiple times)"
        )]
        recipes: Vec<String>,

        /// Migration steps to skip
        #[arg(
            long,
            value_name = "RECIPE_ID",
            help = "Skip this recipe (can be used multiple times)"
        )]
        disable: Vec<String>,

        /// Output format
        #[arg(short, long, default_value = "text", help = "Output format for results")]
        format: OutputFormat,
    },

    /// Print the concrete syntax tree of a DRL file
    Tree {
        /// File to print
        file: PathBuf,

        /// Leave whitespace and comments out of the dump
        #[arg(long, help = "Omit whitespace and comment tokens")]
        no_trivia: bool,
    },

    /// List the available recipes
    Recipes {
        /// Output format
        #[arg(short, long, default_value = "text", help = "Output format for the list")]
        format: OutputFormat,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum OutputFormat {
    /// Human-readable output with source snippets
    Text,
    /// JSON for programmatic consumption
    Json,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize tracing based on verbosity
    let log_level = match cli.verbose {
        0 => "drl=error", // Only errors by default
        1 => "drl=warn",  // Warnings on first -v
        2 => "drl=info",  // Info on -vv
        3 => "drl=debug", // Debug on -vvv
        _ => "drl=trace", // Trace on -vvvv+
    };
    init_tracing_with(log_level);

    // Set thread pool size if specified
    if let Some(threads) = cli.threads
        && let Err(e) = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
    {
        error!("Failed to set thread pool size: {}", e);
        return ExitCode::FAILURE;
    }

    match run_command(cli) {
        Ok(true) => ExitCode::FAILURE,
        Ok(false) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

/// Run the selected command; `Ok(true)` means errors were reported
fn run_command(cli: Cli) -> Result<bool> {
    let use_colors =
        !cli.no_color && std::env::var_os("NO_COLOR").is_none() && std::io::stdout().is_terminal();
    let config = commands::load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Check { paths, format } => {
            commands::check_command(&default_paths(paths), format, &config, use_colors)
        }

        Commands::Migrate {
            paths,
            write,
            recipes,
            disable,
            format,
        } => commands::migrate_command(
            &default_paths(paths),
            write,
            &recipes,
            &disable,
            format,
            &config,
            use_colors,
        ),

        Commands::Tree { file, no_trivia } => {
            commands::tree_command(&file, no_trivia, &config, use_colors)
        }

        Commands::Recipes { format } => commands::recipes_command(format, &config),
    }
}

fn default_paths(paths: Vec<PathBuf>) -> Vec<PathBuf> {
    if paths.is_empty() {
        vec![PathBuf::from(".")]
    } else {
        paths
    }
}
