//! Simulation commands: compose, build, run

use anyhow::Context;
use colored::Colorize;
use simforge::build::BUILD_DIR;
use simforge::{ComposeEngine, SimforgeConfig, SimulationDefinition};
use simforge::compose::TargetEntity;
use std::path::{Path, PathBuf};
use tracing::info;

use super::load_simulation;

/// Write adapted module sources for a simulation definition
pub fn cmd_compose(
    config: &SimforgeConfig,
    sim_file: &Path,
    out: Option<PathBuf>,
) -> anyhow::Result<Vec<PathBuf>> {
    let definition = SimulationDefinition::load(sim_file)
        .with_context(|| format!("Failed to read simulation {}", sim_file.display()))?;
    let out_dir = out.unwrap_or_else(|| {
        let base = sim_file.parent().unwrap_or_else(|| Path::new("."));
        definition
            .resolve_working_dir(&config.paths.simulations, base)
            .join(BUILD_DIR)
    });

    let engine = ComposeEngine::new(&config.paths.components, TargetEntity::from(&config.target));
    let sources = engine.compose(&definition.component_names())?;
    let written = ComposeEngine::write_sources(&sources, &out_dir)?;

    println!(
        "{} Composed {} module(s) into {}",
        "✓".bright_green(),
        written.len(),
        out_dir.display()
    );
    for source in &sources {
        println!(
            "  {:<18} <- {}",
            source.file_name().cyan(),
            source.donors.join(", ")
        );
    }
    Ok(written)
}

pub fn cmd_build(config: SimforgeConfig, sim_file: &Path, force: bool) -> anyhow::Result<PathBuf> {
    let mut simulation = load_simulation(sim_file, config)?;
    info!("Building {}", simulation.name());

    let executable = simulation.compile(force)?;
    println!(
        "{} Built {}",
        "✓".bright_green(),
        executable.display().to_string().cyan()
    );
    if let Some(artifact) = simulation.artifact() {
        println!("  {}", artifact.invocation.dimmed());
    }
    Ok(executable)
}

pub fn cmd_run(
    config: SimforgeConfig,
    sim_file: &Path,
    duration: Option<f64>,
    dt: Option<f64>,
    recompile: bool,
    csv: Option<PathBuf>,
) -> anyhow::Result<()> {
    let mut simulation = load_simulation(sim_file, config)?;
    let trajectory = simulation.run(duration, dt, recompile)?;

    println!("{} Simulation '{}' complete", "✓".bright_green(), simulation.name());
    println!("{}", trajectory);

    if let Some(path) = csv {
        trajectory.save_csv(&path)?;
        println!("{} Wrote {}", "✓".bright_green(), path.display());
    }
    Ok(())
}
