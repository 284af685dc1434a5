mod cli;

use clap::{Parser, Subcommand};
use cli::{ReportFormat, ToleranceArgs};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "simforge")]
#[command(version, about = "Compose, build, run and regression-test component simulations", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (default: ./simforge.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Browse the component metadata registry
    Components {
        #[command(subcommand)]
        command: ComponentsCommand,
    },

    /// Show how components group into framework modules
    Group {
        /// Component names
        #[arg(required = true)]
        names: Vec<String>,
    },

    /// Write adapted module sources without compiling
    Compose {
        /// Simulation definition file
        #[arg(long)]
        sim: PathBuf,

        /// Output directory (default: <working dir>/build)
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Compose and compile a simulation
    Build {
        /// Simulation definition file
        #[arg(long)]
        sim: PathBuf,

        /// Rebuild even if an executable is cached
        #[arg(long)]
        force: bool,
    },

    /// Build if needed, run and print the trajectory summary
    Run {
        /// Simulation definition file
        #[arg(long)]
        sim: PathBuf,

        /// Simulated duration in seconds
        #[arg(long)]
        duration: Option<f64>,

        /// Integration step in seconds
        #[arg(long)]
        dt: Option<f64>,

        /// Recompile before running
        #[arg(long)]
        recompile: bool,

        /// Export the trajectory as CSV
        #[arg(long, value_name = "FILE")]
        csv: Option<PathBuf>,
    },

    /// Compare a trajectory file against a reference
    Compare {
        /// Trajectory under test
        test: PathBuf,

        /// Reference trajectory
        reference: PathBuf,

        #[command(flatten)]
        tolerances: ToleranceArgs,

        /// Report format
        #[arg(long, value_enum, default_value = "text")]
        format: ReportFormat,

        /// Write the report to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Assemble, build, run and compare against a reference
    Regress {
        /// Simulation definition file
        #[arg(long)]
        sim: PathBuf,

        /// Reference trajectory
        #[arg(long)]
        reference: PathBuf,

        #[command(flatten)]
        tolerances: ToleranceArgs,

        /// Report format
        #[arg(long, value_enum, default_value = "text")]
        format: ReportFormat,

        /// Write the report to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Keep going when a stage validation fails
        #[arg(long)]
        keep_going: bool,
    },
}

#[derive(Subcommand)]
enum ComponentsCommand {
    /// List components
    List {
        /// Filter by category
        #[arg(long)]
        category: Option<String>,

        /// Filter by degrees of freedom (3, 6, 3DoF, 6DoF)
        #[arg(long)]
        dof: Option<String>,
    },

    /// Show one component's metadata
    Show {
        /// Component name
        name: String,
    },

    /// List categories with component counts
    Categories,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter_layer = if cli.debug {
        tracing_subscriber::EnvFilter::new("debug")
    } else if cli.verbose {
        tracing_subscriber::EnvFilter::new("info")
    } else {
        tracing_subscriber::EnvFilter::new("warn")
    };

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!("simforge v{}", env!("CARGO_PKG_VERSION"));

    let config = cli::load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Components { command } => {
            let registry = cli::load_registry(&config)?;
            match command {
                ComponentsCommand::List { category, dof } => {
                    cli::components::cmd_components_list(&registry, category, dof)?;
                }
                ComponentsCommand::Show { name } => {
                    cli::components::cmd_components_show(&registry, &name)?;
                }
                ComponentsCommand::Categories => {
                    cli::components::cmd_components_categories(&registry)?;
                }
            }
        }
        Commands::Group { names } => {
            cli::components::cmd_group(&names)?;
        }
        Commands::Compose { sim, out } => {
            info!("Composing modules for {:?}", sim);
            cli::simulate::cmd_compose(&config, &sim, out)?;
        }
        Commands::Build { sim, force } => {
            info!("Building {:?}", sim);
            cli::simulate::cmd_build(config, &sim, force)?;
        }
        Commands::Run {
            sim,
            duration,
            dt,
            recompile,
            csv,
        } => {
            info!("Running {:?}", sim);
            cli::simulate::cmd_run(config, &sim, duration, dt, recompile, csv)?;
        }
        Commands::Compare {
            test,
            reference,
            tolerances,
            format,
            output,
        } => {
            info!("Comparing {:?} against {:?}", test, reference);
            cli::compare::cmd_compare(&test, &reference, &tolerances, format, output)?;
        }
        Commands::Regress {
            sim,
            reference,
            tolerances,
            format,
            output,
            keep_going,
        } => {
            info!("Regression run for {:?}", sim);
            cli::compare::cmd_regress(
                config,
                &sim,
                &reference,
                &tolerances,
                format,
                output,
                keep_going,
            )?;
        }
    }

    Ok(())
}
