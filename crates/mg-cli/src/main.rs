//! CLI entry point for the modelgraph toolkit.
//!
//! This binary exposes the plotting catalogue built on `mg-core`: it lists
//! and describes the registered model types, and serializes a sample
//! instance graph into its wire form.
//!
//! # Usage
//!
//! ```bash
//! modelgraph [OPTIONS] <COMMAND>
//!
//! # List every registered type
//! modelgraph types --detailed
//!
//! # Describe one type as JSON
//! modelgraph describe --type Plot
//!
//! # Serialize the sample graph, defaults included
//! modelgraph --include-defaults demo --output plot.json
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

use std::io::Write;

use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};
use mg_core::{Config, Registry, TypeSpec, describe, describe_all, serialize_with};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// CLI ARGUMENT TYPES
// =============================================================================

/// Inspect the model catalogue and its wire format.
///
/// Types are declared once into a registry; instances of them form graphs
/// that serialize into a flat, reference-deduplicated JSON document.
#[derive(Parser)]
#[command(name = "modelgraph", version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Command to execute.
    #[command(subcommand)]
    command: Commands,

    /// Path to a JSON configuration file.
    #[arg(short, long, global = true, env = "MODELGRAPH_CONFIG")]
    config: Option<Utf8PathBuf>,

    /// Also serialize stored properties that resolve to a default.
    #[arg(long, global = true)]
    include_defaults: bool,

    /// Emit compact JSON instead of pretty-printed JSON.
    #[arg(long, global = true)]
    compact: bool,

    /// Enable verbose logging (debug level).
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output.
    #[arg(long, global = true)]
    no_color: bool,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// List registered model types.
    Types {
        /// Also list each type's properties.
        #[arg(short, long)]
        detailed: bool,
    },

    /// Describe model types as JSON.
    Describe {
        /// Describe only this type (defaults to every type).
        #[arg(short = 't', long = "type")]
        type_name: Option<String>,

        /// Output file (defaults to stdout).
        #[arg(short, long)]
        output: Option<Utf8PathBuf>,
    },

    /// Build the sample plot and print its wire form.
    Demo {
        /// Output file (defaults to stdout).
        #[arg(short, long)]
        output: Option<Utf8PathBuf>,
    },
}

// =============================================================================
// INITIALIZATION FUNCTIONS
// =============================================================================

/// Initializes the tracing subscriber for logging.
///
/// Respects the `RUST_LOG` environment variable if set. Otherwise, uses
/// `debug` level if `--verbose` is set, or `info` level by default. Logs go
/// to stderr so that JSON on stdout stays clean.
fn init_tracing(verbose: bool, no_color: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = if verbose { "debug" } else { "info" };
        EnvFilter::new(level)
    });

    // Check if colors should be disabled (flag or NO_COLOR env var)
    let use_ansi = !no_color && std::env::var("NO_COLOR").is_err();

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .with_ansi(use_ansi)
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}

/// Builds a [`Config`] from the configuration file and CLI overrides.
///
/// # Errors
///
/// Returns an error if the configuration file is missing or invalid.
fn build_config(cli: &Cli) -> color_eyre::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => {
            info!(path = %path, "Loading configuration");
            Config::load(path)?
        }
        None => Config::default(),
    };

    if cli.include_defaults {
        config.wire.include_defaults = true;
    }
    if cli.compact {
        config.wire.pretty = false;
    }

    Ok(config)
}

// =============================================================================
// COMMAND IMPLEMENTATIONS
// =============================================================================

/// Prints a summary of every registered type.
///
/// # Errors
///
/// Returns an error if writing to stdout fails.
fn run_types(registry: &Registry, detailed: bool) -> color_eyre::Result<()> {
    let stdout = std::io::stdout();
    let mut handle = stdout.lock();

    writeln!(handle, "Registered model types ({})", registry.len())?;
    writeln!(handle, "==========================")?;
    for model_type in registry.iter() {
        let bases: Vec<&str> = model_type.parents().map(|p| p.name()).collect();
        let marker = if model_type.is_abstract() { " (abstract)" } else { "" };
        if bases.is_empty() {
            writeln!(handle, "{}{marker}", model_type.name())?;
        } else {
            writeln!(handle, "{}{marker} <- {}", model_type.name(), bases.join(", "))?;
        }

        if detailed {
            for (name, descriptor) in model_type.properties() {
                match descriptor.value_type() {
                    Some(value_type) => writeln!(handle, "    {name}: {value_type}")?,
                    None => writeln!(handle, "    {name} [computed]")?,
                }
            }
        }
    }

    Ok(())
}

/// Describes one type, or every type, as JSON.
///
/// # Errors
///
/// Returns an error if the type is unknown or a default cannot be rendered.
fn run_describe(
    registry: &Registry,
    config: &Config,
    type_name: Option<&str>,
    output: Option<Utf8PathBuf>,
) -> color_eyre::Result<()> {
    let content = match type_name {
        Some(name) => {
            let spec = describe(registry.lookup(name)?)?;
            to_json(&spec, config.wire.pretty)?
        }
        None => {
            let specs: Vec<TypeSpec> = describe_all(registry)?;
            info!(types = specs.len(), "Described catalogue");
            to_json(&specs, config.wire.pretty)?
        }
    };
    emit(&content, output)
}

/// Serializes the sample plot.
///
/// # Errors
///
/// Returns an error if the graph cannot be built or serialized.
fn run_demo(
    registry: &Registry,
    config: &Config,
    output: Option<Utf8PathBuf>,
) -> color_eyre::Result<()> {
    let plot = mg_catalog::demo::scatter_plot(registry)?;
    let graph = serialize_with(&plot, &config.wire)?;
    info!(root = %plot.id(), objects = graph.len(), "Serialized sample plot");

    let content = graph.to_json_string(config.wire.pretty)?;
    emit(&content, output)
}

// =============================================================================
// OUTPUT HELPERS
// =============================================================================

fn to_json<T: serde::Serialize + ?Sized>(value: &T, pretty: bool) -> color_eyre::Result<String> {
    let json = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    };
    json.map_err(|e| color_eyre::eyre::eyre!("Failed to serialize JSON: {}", e))
}

/// Writes `content` to `output`, or to stdout.
fn emit(content: &str, output: Option<Utf8PathBuf>) -> color_eyre::Result<()> {
    if let Some(output_path) = output {
        std::fs::write(output_path.as_std_path(), content)?;
        info!(path = %output_path, "Output written");
    } else {
        let stdout = std::io::stdout();
        let mut handle = stdout.lock();
        writeln!(handle, "{content}")?;
    }
    Ok(())
}

// =============================================================================
// MAIN ENTRY POINT
// =============================================================================

/// Application entry point.
fn main() -> color_eyre::Result<()> {
    // 1. Install color-eyre FIRST (before any potential panics)
    color_eyre::install()?;

    // 2. Parse CLI arguments
    let cli = Cli::parse();

    // 3. Initialize tracing (handles --no-color for log output)
    init_tracing(cli.verbose, cli.no_color);

    // 4. Load configuration and declare the catalogue
    let config = build_config(&cli)?;
    let registry = mg_catalog::registry_with(config.registry)?;

    // 5. Route to appropriate command
    match &cli.command {
        Commands::Types { detailed } => run_types(&registry, *detailed),
        Commands::Describe { type_name, output } => {
            run_describe(&registry, &config, type_name.as_deref(), output.clone())
        }
        Commands::Demo { output } => run_demo(&registry, &config, output.clone()),
    }
}
