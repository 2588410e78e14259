//! texmerge CLI - Main entry point

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use texmerge_core::options::{DEFAULT_MAX_DEPTH, DEFAULT_OUTPUT_SUFFIX};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "texmerge")]
#[command(version)]
#[command(about = "Flatten a LaTeX document by expanding \\input, \\import and \\include", long_about = None)]
struct Cli {
    /// Log every processed file
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log warnings and errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Merge a document and everything it includes into a single file
    Merge {
        /// Main LaTeX file
        input: PathBuf,

        /// Write output to FILE (defaults to <input stem><suffix>.tex next to the input)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Suffix for the derived output file name
        #[arg(long, default_value = DEFAULT_OUTPUT_SUFFIX)]
        suffix: String,

        /// Maximum inclusion depth to expand
        #[arg(long, default_value_t = DEFAULT_MAX_DEPTH)]
        max_depth: usize,

        /// Character encoding of the sources and the merged output
        #[arg(long, default_value = "utf-8")]
        encoding: String,
    },

    /// List every file reachable from a document without merging
    Discover {
        /// Main LaTeX file
        input: PathBuf,

        /// Maximum inclusion depth to follow
        #[arg(long, default_value_t = DEFAULT_MAX_DEPTH)]
        max_depth: usize,

        /// Character encoding of the sources
        #[arg(long, default_value = "utf-8")]
        encoding: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter(cli.verbose, cli.quiet).into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Commands::Merge {
            input,
            output,
            suffix,
            max_depth,
            encoding,
        } => commands::merge::execute(commands::merge::MergeArgs {
            input,
            output,
            suffix,
            max_depth,
            encoding,
        }),
        Commands::Discover {
            input,
            max_depth,
            encoding,
        } => commands::discover::execute(commands::discover::DiscoverArgs {
            input,
            max_depth,
            encoding,
        }),
    }
}

/// Log filter used when `RUST_LOG` is not set.
fn default_filter(verbose: bool, quiet: bool) -> &'static str {
    if verbose {
        "texmerge=debug,texmerge_core=debug"
    } else if quiet {
        "texmerge=warn,texmerge_core=warn"
    } else {
        "texmerge=info,texmerge_core=info"
    }
}
