//! CLI entry point for the simoolator harness.
//!
//! Loads a herd from a cow file or a saved snapshot, binds the built-in
//! models against it, and runs sweeps.
//!
//! # Usage
//!
//! ```bash
//! simoo [OPTIONS] <COMMAND>
//!
//! # Run model1 over every cow and save the herd
//! simoo run --herd demos/demo_cows.json --model model1 --save herd.json
//!
//! # Show the bindings computed for each model
//! simoo models --herd demos/demo_cows.json --bindings
//!
//! # Show the reference input, highlighting what model2 consumes
//! simoo inspect --herd demos/demo_cows.json --model model2
//!
//! # List results stored on the first cow of a saved herd
//! simoo results --snapshot herd.json --cow 0
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

mod models;
mod tree;

use std::io::{IsTerminal, Write};

use camino::{Utf8Path, Utf8PathBuf};
use clap::{Args, Parser, Subcommand};
use moo_core::{ColorScheme, Config, CowId, Value};
use moo_herd::{CowOperation, Herd, OperationOutcome, SweepReport};
use moo_registry::{Model, ModelCatalog};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::tree::{TreeStyle, render_tree};

// =============================================================================
// CLI ARGUMENT TYPES
// =============================================================================

/// Batch harness for running models against a herd of cows.
#[derive(Parser)]
#[command(name = "simoo", version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Command to execute.
    #[command(subcommand)]
    command: Commands,

    /// Path to a JSON configuration file.
    #[arg(short, long, global = true, env = "SIMOO_CONFIG")]
    config: Option<Utf8PathBuf>,

    /// Enable verbose logging (debug level).
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output.
    #[arg(long, global = true)]
    no_color: bool,
}

/// Where the herd comes from.
#[derive(Args)]
struct HerdSource {
    /// JSON file of cow records.
    #[arg(long, env = "SIMOO_HERD", conflicts_with = "snapshot")]
    herd: Option<Utf8PathBuf>,

    /// Herd snapshot written by `run --save`.
    #[arg(long)]
    snapshot: Option<Utf8PathBuf>,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Run a model over every cow.
    Run {
        #[command(flatten)]
        source: HerdSource,

        /// Name of the model to run.
        #[arg(short, long)]
        model: String,

        /// Execution mode: linear, cpu or gpu (defaults to the config value).
        #[arg(long)]
        mode: Option<String>,

        /// Write a snapshot of the herd after the sweep.
        #[arg(long)]
        save: Option<Utf8PathBuf>,
    },

    /// List registered models.
    Models {
        #[command(flatten)]
        source: HerdSource,

        /// Show each parameter's bound input path.
        #[arg(short, long)]
        bindings: bool,
    },

    /// Show the reference input tree and check input consistency.
    Inspect {
        #[command(flatten)]
        source: HerdSource,

        /// Highlight the keys this model consumes.
        #[arg(short, long)]
        model: Option<String>,
    },

    /// List cows and their result counts.
    Cows {
        #[command(flatten)]
        source: HerdSource,
    },

    /// List results stored on one cow.
    Results {
        #[command(flatten)]
        source: HerdSource,

        /// Index of the cow within the herd.
        #[arg(long, default_value_t = 0)]
        cow: usize,

        /// Show a single result and its run metadata.
        #[arg(long)]
        id: Option<String>,
    },
}

// =============================================================================
// INITIALIZATION FUNCTIONS
// =============================================================================

/// Initializes the tracing subscriber for logging.
///
/// Respects the `RUST_LOG` environment variable if set. Otherwise, uses
/// `debug` level if `--verbose` is set, or `info` level by default.
fn init_tracing(verbose: bool, no_color: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = if verbose { "debug" } else { "info" };
        EnvFilter::new(level)
    });

    let use_ansi = !no_color && std::env::var("NO_COLOR").is_err();

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_ansi(use_ansi).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn load_config(path: Option<&Utf8Path>) -> color_eyre::Result<Config> {
    match path {
        Some(path) => Ok(Config::from_file(path)?),
        None => Ok(Config::default()),
    }
}

/// Decides whether stdout output is coloured.
fn use_color(scheme: ColorScheme, no_color: bool) -> bool {
    match scheme {
        ColorScheme::Never => false,
        ColorScheme::Always => true,
        _ => !no_color && std::env::var("NO_COLOR").is_err() && std::io::stdout().is_terminal(),
    }
}

/// Builds the herd named by `source`.
///
/// A cow file yields a fresh herd with every catalog model registered, unless
/// the file holds no cows and there is nothing to bind against. A snapshot
/// restores the herd as saved.
fn load_herd(source: &HerdSource, catalog: &ModelCatalog) -> color_eyre::Result<Herd> {
    if let Some(path) = &source.snapshot {
        return Ok(Herd::load(path, catalog)?);
    }

    let Some(path) = &source.herd else {
        return Err(color_eyre::eyre::eyre!("Either --herd or --snapshot is required"));
    };

    let mut herd = Herd::new(path.file_stem().unwrap_or("herd"));
    herd.load_cows_from_json(path)?;
    if herd.is_empty() {
        return Ok(herd);
    }

    let mut models: Vec<&Model> = catalog.models().collect();
    models.sort_by(|a, b| a.name().cmp(b.name()));
    for model in models {
        herd.register_model(model.clone())?;
    }
    Ok(herd)
}

// =============================================================================
// COMMAND IMPLEMENTATIONS
// =============================================================================

fn run_sweep(
    config: Config,
    mut herd: Herd,
    model: &str,
    mode: Option<&str>,
    save: Option<&Utf8Path>,
) -> color_eyre::Result<()> {
    info!(herd = herd.name(), model, cows = herd.len(), "Starting sweep");

    let report = match mode {
        Some(mode) => herd.execute_model_str(model, mode)?,
        None => herd.execute_model(model, config.run.default_mode)?,
    };
    print_sweep_report(&herd, &report, config.run.log_failures)?;

    if let Some(path) = save {
        herd.save(path, config.snapshot.pretty)?;
    }
    Ok(())
}

fn run_models(herd: &Herd, bindings: bool) -> color_eyre::Result<()> {
    let stdout = std::io::stdout();
    let mut handle = stdout.lock();

    let listings = herd.list_models();
    if listings.is_empty() {
        writeln!(handle, "No models registered.")?;
        return Ok(());
    }

    for listing in &listings {
        writeln!(handle, "{}({})", listing.name, listing.params.join(", "))?;
        if bindings {
            for param in &listing.params {
                match listing.mapping.get(param) {
                    Some(path) => writeln!(handle, "  {param} -> {path}")?,
                    None => writeln!(handle, "  {param} -> (unbound)")?,
                }
            }
        }
    }
    Ok(())
}

fn run_inspect(herd: &Herd, model: Option<&str>, style: TreeStyle) -> color_eyre::Result<()> {
    let stdout = std::io::stdout();
    let mut handle = stdout.lock();

    if let Some(name) = model {
        let (reference, mapping) = herd.input_mapping(name)?;
        writeln!(handle, "Input Mapping for {name}")?;
        write!(handle, "{}", render_tree(reference, Some(mapping), style))?;
    } else {
        let Some(reference) = herd.reference_input() else {
            writeln!(handle, "Herd '{}' has no cows.", herd.name())?;
            return Ok(());
        };
        write!(handle, "{}", render_tree(reference, None, style))?;
    }

    let report = herd.check_data_consistency();
    writeln!(handle)?;
    if report.consistent {
        writeln!(handle, "Input data is consistent across {} cows.", herd.len())?;
    } else {
        let ids: Vec<&str> = report.mismatched.iter().map(CowId::as_str).collect();
        writeln!(handle, "Input data differs from the reference cow for: {}", ids.join(", "))?;
    }
    Ok(())
}

fn run_cows(mut herd: Herd) -> color_eyre::Result<()> {
    let counts = herd.execute_operation(&CowOperation::ResultCount)?;

    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    writeln!(handle, "Index | Cow ID | Results")?;
    for (index, (id, outcome)) in counts.iter().enumerate() {
        let count = match outcome {
            OperationOutcome::ResultCount(count) => *count,
            _ => 0,
        };
        writeln!(handle, "{index:<5} | {id} | {count}")?;
    }
    Ok(())
}

fn run_results(herd: &Herd, index: usize, id: Option<&str>) -> color_eyre::Result<()> {
    let cow = herd.cow(index)?;

    let stdout = std::io::stdout();
    let mut handle = stdout.lock();

    let Some(result_id) = id else {
        writeln!(handle, "Results for cow {}:", cow.id())?;
        write!(handle, "{}", cow.result_table())?;
        return Ok(());
    };

    let Some(value) = herd.get_result(index, result_id)? else {
        return Err(color_eyre::eyre::eyre!(
            "Cow {} has no result '{result_id}'",
            cow.id()
        ));
    };
    writeln!(handle, "{result_id}: {value}")?;
    if let Some(metadata) = cow.get_metadata(result_id) {
        writeln!(handle, "  Model:    {}", metadata.model_name)?;
        writeln!(handle, "  Started:  {}", metadata.start_time.to_rfc3339())?;
        writeln!(handle, "  Run time: {:.6}s", metadata.run_time)?;
        writeln!(handle, "  Inputs:   {}", Value::Map(metadata.input_args.clone()))?;
        if !metadata.default_args.is_empty() {
            writeln!(
                handle,
                "  Defaults: {}",
                Value::Map(metadata.default_args.clone())
            )?;
        }
    }
    Ok(())
}

// =============================================================================
// OUTPUT HELPERS
// =============================================================================

fn print_sweep_report(herd: &Herd, report: &SweepReport, log_failures: bool) -> color_eyre::Result<()> {
    let stdout = std::io::stdout();
    let mut handle = stdout.lock();

    writeln!(handle)?;
    writeln!(handle, "Sweep {}", report.sweep_id)?;
    writeln!(handle, "  Succeeded: {}/{}", report.succeeded, herd.len())?;
    writeln!(handle, "  Failed:    {}", report.failed.len())?;
    if log_failures {
        for line in report.summary_lines() {
            writeln!(handle, "    {line}")?;
        }
    }
    if let Some(metadata) = herd.sweep_metadata().get(&report.sweep_id) {
        writeln!(handle, "  Run time:  {:.6}s", metadata.run_time)?;
    }
    Ok(())
}

// =============================================================================
// MAIN ENTRY POINT
// =============================================================================

/// Application entry point.
fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.no_color);

    let config = load_config(cli.config.as_deref())?;
    let catalog = models::catalog();
    let style = TreeStyle {
        color: use_color(config.display.color_scheme, cli.no_color),
        show_types: config.display.show_types,
    };

    match &cli.command {
        Commands::Run {
            source,
            model,
            mode,
            save,
        } => run_sweep(
            config,
            load_herd(source, &catalog)?,
            model,
            mode.as_deref(),
            save.as_deref(),
        ),
        Commands::Models { source, bindings } => run_models(&load_herd(source, &catalog)?, *bindings),
        Commands::Inspect { source, model } => {
            run_inspect(&load_herd(source, &catalog)?, model.as_deref(), style)
        }
        Commands::Cows { source } => run_cows(load_herd(source, &catalog)?),
        Commands::Results { source, cow, id } => {
            run_results(&load_herd(source, &catalog)?, *cow, id.as_deref())
        }
    }
}
