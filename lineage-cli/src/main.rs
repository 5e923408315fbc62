//! Lineage CLI - derivation graphs for Linux distribution catalogs
//!
//! Reads a JSON catalog of distributions, builds the "derived from" graph and
//! prints, exports or validates it.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;
mod config;
mod output;

use commands::{check, export, graph, lineage, Session};
use config::LineageConfig;
use output::{OutputConfig, OutputFormat};

/// Derivation graphs for Linux distribution catalogs.
#[derive(Parser)]
#[command(name = "lineage")]
#[command(author, version)]
#[command(about = "Derivation graphs for Linux distribution catalogs")]
#[command(propagate_version = true)]
#[command(after_help = "Examples:
  lineage graph distros.json           List every distribution and its base
  lineage --format tree graph          Draw the derivation forest
  lineage lineage Mint                 Show Mint's chain back to its root
  lineage export -F mermaid -o out.mmd Write a Mermaid flowchart
  lineage --reject-cycles check        Fail if the catalog has a cycle")]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output (debug logging)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Output format (overrides config default)
    #[arg(long, global = true, value_enum)]
    format: Option<OutputFormat>,

    /// Config file to use instead of ./.lineagerc.toml
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Match distribution names case-insensitively
    #[arg(long, global = true)]
    ignore_case: bool,

    /// Fail when the derivation graph contains a cycle
    #[arg(long, global = true)]
    reject_cycles: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the lineage graph and print nodes, edges and build report
    Graph {
        /// Catalog file (defaults to config catalog.path, then distros.json)
        file: Option<PathBuf>,
    },

    /// Export the lineage graph for a renderer
    Export {
        /// Catalog file (defaults to config catalog.path, then distros.json)
        file: Option<PathBuf>,

        /// Export format: json, mermaid, cytoscape, adjacency
        #[arg(short = 'F', long = "export-format", default_value = "json")]
        export_format: String,

        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Emit compact JSON
        #[arg(long)]
        compact: bool,
    },

    /// Show the derived-from chain of one distribution
    Lineage {
        /// Distribution name
        name: String,

        /// Catalog file (defaults to config catalog.path, then distros.json)
        file: Option<PathBuf>,
    },

    /// Validate a catalog and report missing bases, duplicates and cycles
    Check {
        /// Catalog file (defaults to config catalog.path, then distros.json)
        file: Option<PathBuf>,
    },
}

impl Commands {
    fn file(&self) -> Option<&Path> {
        match self {
            Commands::Graph { file }
            | Commands::Export { file, .. }
            | Commands::Lineage { file, .. }
            | Commands::Check { file } => file.as_deref(),
        }
    }
}

fn setup_logging(verbose: bool, quiet: bool) {
    let filter = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "warn"
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    // Load configuration from --config or ./.lineagerc.toml
    let config = match cli.config.as_deref() {
        Some(path) => LineageConfig::load_explicit(path)?,
        None => LineageConfig::load(Path::new(".")),
    };

    // Resolve output format: CLI flag > config default > Table
    let format = cli.format.unwrap_or_else(|| {
        config
            .default_format()
            .and_then(|f| f.parse().ok())
            .unwrap_or(OutputFormat::Table)
    });

    // Apply color override from config if set
    if let Some(use_color) = config.use_color() {
        colored::control::set_override(use_color);
    }

    let session = Session::new(
        config.catalog_path(cli.command.file()),
        config.build_options(cli.ignore_case, cli.reject_cycles),
        OutputConfig::auto_detect_with_color_override(format, config.use_color()),
    );
    tracing::debug!("Using catalog {:?} with {:?}", session.catalog, session.options);

    match cli.command {
        Commands::Graph { .. } => graph::run(&session),
        Commands::Export {
            export_format,
            output,
            compact,
            ..
        } => export::run(&session, &export_format, output.as_deref(), compact),
        Commands::Lineage { name, .. } => lineage::run(&session, &name),
        Commands::Check { .. } => check::run(&session),
    }
}
