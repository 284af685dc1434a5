//! CLI command logic - extracted for testability
//!
//! Loading helpers and argument parsing live here; each command family has
//! its own module.

pub mod compare;
pub mod components;
pub mod simulate;

use anyhow::Context;
use simforge::config::CONFIG_FILENAME;
use simforge::{ComponentRegistry, Simulation, SimforgeConfig, SimulationDefinition, ToleranceTable};
use simforge::trajectory::Tolerance;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// CLI report format
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum ReportFormat {
    /// Plain text report
    #[default]
    Text,
    /// Markdown report
    Markdown,
    /// JSON data
    Json,
}

impl From<ReportFormat> for simforge::ReportFormat {
    fn from(format: ReportFormat) -> Self {
        match format {
            ReportFormat::Text => simforge::ReportFormat::Text,
            ReportFormat::Markdown => simforge::ReportFormat::Markdown,
            ReportFormat::Json => simforge::ReportFormat::Json,
        }
    }
}

/// Tolerance options shared by `compare` and `regress`
#[derive(Clone, Debug, Default, clap::Args)]
pub struct ToleranceArgs {
    /// Per-channel RMS tolerance, CHANNEL=VALUE (repeatable)
    #[arg(long = "tol", value_name = "CHANNEL=VALUE")]
    pub tol: Vec<String>,

    /// Channel that must be present in both trajectories (repeatable)
    #[arg(long = "require", value_name = "CHANNEL")]
    pub require: Vec<String>,

    /// RMS tolerance applied to every compared channel without its own entry
    #[arg(long)]
    pub default_tol: Option<f64>,

    /// TOML tolerance table; command-line entries take precedence
    #[arg(long, value_name = "FILE")]
    pub tolerances: Option<PathBuf>,
}

// ============================================================================
// Configuration and Registry Loading
// ============================================================================

/// Explicit config file, or `simforge.toml` in the current directory
pub fn load_config(explicit: Option<&Path>) -> anyhow::Result<SimforgeConfig> {
    match explicit {
        Some(path) => {
            let config = SimforgeConfig::load(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?;
            let base = path.parent().unwrap_or_else(|| Path::new("."));
            Ok(config.rooted_at(base))
        }
        None => {
            let cwd = std::env::current_dir().context("Failed to read current directory")?;
            debug!("Looking for {} in {}", CONFIG_FILENAME, cwd.display());
            Ok(SimforgeConfig::load_or_default(&cwd)?.rooted_at(&cwd))
        }
    }
}

pub fn load_registry(config: &SimforgeConfig) -> anyhow::Result<ComponentRegistry> {
    ComponentRegistry::load_with(&config.paths.metadata, &config.paths.metadata_file)
        .with_context(|| {
            format!(
                "Failed to load component metadata from {}",
                config.paths.metadata.display()
            )
        })
}

/// Assemble the simulation described by a definition file
pub fn load_simulation(sim_file: &Path, config: SimforgeConfig) -> anyhow::Result<Simulation> {
    let definition = SimulationDefinition::load(sim_file)
        .with_context(|| format!("Failed to read simulation {}", sim_file.display()))?;
    let base = sim_file.parent().unwrap_or_else(|| Path::new("."));
    let working_dir = definition.resolve_working_dir(&config.paths.simulations, base);
    let registry = Arc::new(load_registry(&config)?);
    Ok(Simulation::from_definition(
        &definition,
        working_dir,
        config,
        registry,
    )?)
}

// ============================================================================
// Tolerance Parsing
// ============================================================================

/// Combine a tolerance file with command-line entries
pub fn build_tolerances(args: &ToleranceArgs) -> anyhow::Result<ToleranceTable> {
    let mut table = match &args.tolerances {
        Some(path) => ToleranceTable::load(path)?,
        None => ToleranceTable::new(),
    };
    for entry in &args.tol {
        let (channel, rms) = ToleranceTable::parse_assignment(entry)?;
        let tolerance = match table.channels.get(&channel) {
            Some(existing) => Tolerance { rms, ..*existing },
            None => Tolerance::rms(rms),
        };
        table = table.with(channel, tolerance);
    }
    if let Some(rms) = args.default_tol {
        table = table.with_default(Tolerance::rms(rms));
    }
    for channel in &args.require {
        table = table.require(channel);
    }
    Ok(table)
}
