//! Error taxonomy for the composition and regression pipeline.
//!
//! Only metadata parse failures are recovered locally (the store skips the
//! offending block). Every other variant is returned to the caller with the
//! paths, captured output or invocation needed to diagnose it.

use std::path::PathBuf;
use thiserror::Error;

/// Result alias used across the library
pub type Result<T> = std::result::Result<T, SimforgeError>;

/// Errors raised by the simforge pipeline
#[derive(Error, Debug)]
pub enum SimforgeError {
    #[error("Malformed metadata block in {path}: {message}")]
    MetadataParse { path: PathBuf, message: String },

    #[error("Validation failed:\n{}", format_list(.0))]
    Validation(Vec<String>),

    #[error("No source found for component '{component}' under {search_root}")]
    Lookup {
        component: String,
        search_root: PathBuf,
    },

    #[error(transparent)]
    Composition(#[from] CompositionError),

    #[error("Compilation failed (exit code: {exit_code:?})\n{diagnostics}\n\nCommand: {invocation}")]
    Compile {
        exit_code: Option<i32>,
        diagnostics: String,
        invocation: String,
    },

    #[error(transparent)]
    Execution(#[from] ExecutionError),

    #[error("Trajectory format error in {source_name}: {message}")]
    TrajectoryFormat { source_name: String, message: String },

    #[error("Comparison failed: {0}")]
    Comparison(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl SimforgeError {
    /// Wrap an I/O error with the path it occurred on
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SimforgeError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn trajectory(source_name: impl Into<String>, message: impl Into<String>) -> Self {
        SimforgeError::TrajectoryFormat {
            source_name: source_name.into(),
            message: message.into(),
        }
    }
}

/// Failures of the module grouping and merge engine
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CompositionError {
    #[error("Slot {index} requested by '{requested_by}' is already reserved by '{held_by}' ({slot_name})")]
    SlotConflict {
        index: usize,
        slot_name: String,
        held_by: String,
        requested_by: String,
    },

    #[error("Module '{module}' cannot merge donors [{}]: {reason}", .donors.join(", "))]
    UnsupportedCombination {
        module: String,
        donors: Vec<String>,
        reason: String,
    },

    #[error("Donor '{component}' does not provide slot '{slot}' needed by the {module} merge")]
    MissingSlot {
        module: String,
        component: String,
        slot: String,
    },

    #[error("Cannot parse donor source {path}: {message}")]
    DonorParse { path: PathBuf, message: String },
}

/// Failures while launching or running the built simulation
#[derive(Error, Debug)]
pub enum ExecutionError {
    #[error("Executable not found: {0}")]
    ArtifactMissing(PathBuf),

    #[error("Input file not found: {0}")]
    InputMissing(PathBuf),

    #[error("Failed to spawn {program}: {message}")]
    Spawn { program: String, message: String },

    #[error("{program} timed out after {seconds}s")]
    Timeout { program: String, seconds: u64 },

    #[error("Simulation failed (exit code: {exit_code:?}):\n{stderr}")]
    Failed {
        exit_code: Option<i32>,
        stdout: String,
        stderr: String,
    },

    #[error("Trajectory file not generated in {dir} (looked for: {})", .candidates.join(", "))]
    OutputMissing {
        dir: PathBuf,
        candidates: Vec<String>,
    },
}

fn format_list(items: &[String]) -> String {
    items
        .iter()
        .map(|e| format!("  - {}", e))
        .collect::<Vec<_>>()
        .join("\n")
}
