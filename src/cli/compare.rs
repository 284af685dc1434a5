//! Trajectory comparison commands: compare, regress

use anyhow::Context;
use colored::Colorize;
use simforge::{
    RegressionPipeline, RegressionReport, SimforgeConfig, Trajectory, TrajectoryComparator,
    ValidationStrategy,
};
use std::path::{Path, PathBuf};

use super::{build_tolerances, load_simulation, ReportFormat, ToleranceArgs};

/// Print (or save) a report and fail when its verdict failed
fn emit(report: &RegressionReport, format: ReportFormat, output: Option<&Path>) -> anyhow::Result<()> {
    match output {
        Some(path) => {
            report.save(path, format.into())?;
            println!("{} Report written to {}", "✓".bright_green(), path.display());
        }
        None => print!("{}", report.render(format.into())?),
    }

    match report.comparison.passed() {
        Some(false) => {
            let failed: Vec<&str> = report
                .comparison
                .verdict
                .iter()
                .flat_map(|v| v.failures())
                .map(|c| c.channel.as_str())
                .collect();
            anyhow::bail!("Regression failed: {}", failed.join(", "))
        }
        Some(true) => {
            if format == ReportFormat::Text {
                println!("{}", "Regression passed".bright_green().bold());
            }
            Ok(())
        }
        None => Ok(()),
    }
}

pub fn cmd_compare(
    test: &Path,
    reference: &Path,
    tolerances: &ToleranceArgs,
    format: ReportFormat,
    output: Option<PathBuf>,
) -> anyhow::Result<()> {
    let trajectory = Trajectory::from_file(test)
        .with_context(|| format!("Failed to read trajectory {}", test.display()))?;
    let comparator = TrajectoryComparator::against_file(trajectory, reference)?;
    let table = build_tolerances(tolerances)?;
    let result = comparator.result((!table.is_empty()).then_some(&table));

    let name = test
        .file_stem()
        .map_or_else(|| test.display().to_string(), |s| s.to_string_lossy().into_owned());
    let report = RegressionReport::new(name, reference.display().to_string(), result);
    emit(&report, format, output.as_deref())
}

pub fn cmd_regress(
    config: SimforgeConfig,
    sim_file: &Path,
    reference: &Path,
    tolerances: &ToleranceArgs,
    format: ReportFormat,
    output: Option<PathBuf>,
    keep_going: bool,
) -> anyhow::Result<()> {
    let simulation = load_simulation(sim_file, config)?;
    let strategy = if keep_going {
        ValidationStrategy::ContinueOnError
    } else {
        ValidationStrategy::StopOnError
    };
    let pipeline = RegressionPipeline::standard(strategy, reference, build_tolerances(tolerances)?);

    let ctx = pipeline.run_context(simulation)?;
    for result in &ctx.validation_results {
        let icon = if result.passed {
            "✓".bright_green()
        } else {
            "✗".bright_red()
        };
        eprintln!("{} {:<10} {}", icon, result.stage, result.message.dimmed());
    }

    let report = RegressionReport::from_context(&ctx, reference)
        .context("Pipeline finished without a comparison")?;
    emit(&report, format, output.as_deref())
}
