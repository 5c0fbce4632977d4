//! Binary entry point for gpumatch.
//!
//! This binary provides the CLI interface for canonical model resolution and
//! duplicate clustering of GPU listings.

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(missing_docs)]
// Allow print_stderr in main binary for CLI output
#![allow(clippy::print_stderr)]
#![allow(clippy::print_stdout)]
// Allow needless_pass_by_value for command functions
#![allow(clippy::needless_pass_by_value)]
// Allow multiple crate versions from transitive dependencies
#![allow(clippy::multiple_crate_versions)]

use anyhow::Context;
use clap::{Parser, Subcommand};
use gpumatch::cli::{
    DedupCommand, OutputFormat, ProcessCommand, RegistryCommand, ResolveCommand, read_listings,
    render,
};
use gpumatch::config::GpuMatchConfig;
use gpumatch::observability;
use gpumatch::{
    CanonicalRegistry, DuplicateClusterer, Embedder, FastEmbedEmbedder, ListingPipeline,
    MatchCascade,
};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

/// gpumatch - Canonical model resolution and duplicate clustering for GPU listings.
#[derive(Parser)]
#[command(name = "gpumatch")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to configuration file.
    #[arg(short, long, global = true, env = "GPUMATCH_CONFIG_PATH")]
    config: Option<PathBuf>,

    /// Output format (json, pretty).
    #[arg(short, long, global = true, default_value = "json")]
    format: String,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand)]
enum Commands {
    /// Resolve listing titles to canonical model ids.
    Resolve {
        /// Titles to resolve.
        #[arg(required = true)]
        titles: Vec<String>,
    },

    /// Cluster a JSON array of listings into duplicate groups.
    Dedup {
        /// Listings file, or `-` for stdin.
        #[arg(short, long, default_value = "-")]
        input: String,
    },

    /// Resolve and cluster a JSON array of listings.
    Process {
        /// Listings file, or `-` for stdin.
        #[arg(short, long, default_value = "-")]
        input: String,
    },

    /// List canonical models with aliases and detection patterns.
    Registry,
}

/// Main entry point.
fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {e:#}");
            return ExitCode::FAILURE;
        },
    };

    let observability =
        match observability::init(&config.logging, &config.metrics, cli.verbose) {
            Ok(handle) => handle,
            Err(e) => {
                eprintln!("Failed to initialize observability: {e}");
                return ExitCode::FAILURE;
            },
        };

    let result = run_command(cli, &config);

    if let Some(rendered) = observability.render_metrics() {
        eprint!("{rendered}");
    }

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        },
    }
}

/// Runs the selected command.
fn run_command(cli: Cli, config: &GpuMatchConfig) -> anyhow::Result<()> {
    let format = OutputFormat::parse(&cli.format);
    let registry = Arc::new(
        CanonicalRegistry::load(config.registry_path.as_deref(), config.patterns_path.as_deref())
            .context("loading canonical registry")?,
    );

    let output = match cli.command {
        Commands::Resolve { titles } => {
            let cascade = build_cascade(&registry, config)?;
            render(&ResolveCommand::new(titles).execute(&cascade), format)?
        },
        Commands::Dedup { input } => {
            let listings = read_listings(&input)?;
            let clusterer = build_clusterer(config)?;
            render(&DedupCommand::new(listings).execute(&clusterer)?, format)?
        },
        Commands::Process { input } => {
            let listings = read_listings(&input)?;
            let pipeline =
                ListingPipeline::new(build_cascade(&registry, config)?, build_clusterer(config)?);
            render(&ProcessCommand::new(listings).execute(&pipeline)?, format)?
        },
        Commands::Registry => render(&RegistryCommand::new().execute(&registry), format)?,
    };

    println!("{output}");
    Ok(())
}

/// Builds the match cascade from configuration.
fn build_cascade(
    registry: &Arc<CanonicalRegistry>,
    config: &GpuMatchConfig,
) -> anyhow::Result<MatchCascade> {
    MatchCascade::with_config(Arc::clone(registry), &config.resolution)
        .context("building match cascade")
}

/// Builds the duplicate clusterer with the default embedder.
fn build_clusterer(config: &GpuMatchConfig) -> anyhow::Result<DuplicateClusterer> {
    let fastembed = FastEmbedEmbedder::new();
    tracing::debug!(
        model = fastembed.model_name(),
        dimensions = fastembed.dimensions(),
        "Embedder selected"
    );
    let embedder: Arc<dyn Embedder> = Arc::new(fastembed);
    DuplicateClusterer::with_config(embedder, config.deduplication.clone())
        .context("building duplicate clusterer")
}

/// Loads configuration: explicit file or default location, then environment.
fn load_config(path: Option<&std::path::Path>) -> anyhow::Result<GpuMatchConfig> {
    let config = match path {
        Some(path) => GpuMatchConfig::load_from_file(path)
            .with_context(|| format!("reading {}", path.display()))?,
        None => GpuMatchConfig::load_default().context("reading default config file")?,
    }
    .apply_env_overrides()
    .context("applying environment overrides")?;

    config.validate()?;
    Ok(config)
}
