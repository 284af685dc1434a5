//! Pipeline types and trait definitions.

use crate::simulation::Simulation;
use crate::trajectory::{ComparisonResult, Trajectory};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Context passed between pipeline stages
#[derive(Debug, Clone)]
pub struct PipelineContext {
    /// Simulation being regressed
    pub simulation: Simulation,

    /// Built executable
    pub executable: Option<PathBuf>,

    /// Parsed output of the run
    pub trajectory: Option<Trajectory>,

    /// Errors and verdict against the reference
    pub comparison: Option<ComparisonResult>,

    /// Validation results
    pub validation_results: Vec<ValidationResult>,

    /// Metadata accumulated during pipeline
    pub metadata: HashMap<String, serde_json::Value>,
}

impl PipelineContext {
    pub fn new(simulation: Simulation) -> Self {
        Self {
            simulation,
            executable: None,
            trajectory: None,
            comparison: None,
            validation_results: Vec::new(),
            metadata: HashMap::new(),
        }
    }

    /// Summarise the run
    pub fn output(&self) -> PipelineOutput {
        PipelineOutput {
            simulation: self.simulation.name().to_string(),
            executable: self.executable.clone(),
            samples: self.trajectory.as_ref().map_or(0, Trajectory::len),
            comparison: self.comparison.clone(),
            validation_passed: self.validation_results.iter().all(|v| v.passed),
        }
    }
}

/// Validation result from a pipeline stage
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationResult {
    pub stage: String,
    pub passed: bool,
    pub message: String,
    pub details: Option<serde_json::Value>,
}

/// Final output from the pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineOutput {
    pub simulation: String,
    pub executable: Option<PathBuf>,
    pub samples: usize,
    pub comparison: Option<ComparisonResult>,
    pub validation_passed: bool,
}

impl PipelineOutput {
    /// Regression verdict, when a comparison with tolerances ran
    pub fn regression_passed(&self) -> Option<bool> {
        self.comparison.as_ref().and_then(ComparisonResult::passed)
    }
}

/// Validation strategy for pipeline stages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationStrategy {
    /// Stop on first error
    StopOnError,
    /// Continue on errors but collect them
    ContinueOnError,
    /// Skip validation
    None,
}

/// Trait for pipeline stages
pub trait PipelineStage: Send + Sync {
    /// Name of this stage
    fn name(&self) -> &str;

    /// Execute this stage
    fn execute(&self, ctx: PipelineContext) -> Result<PipelineContext>;

    /// Validate the output of this stage
    fn validate(&self, _ctx: &PipelineContext) -> Result<ValidationResult> {
        // Default: always pass
        Ok(ValidationResult {
            stage: self.name().to_string(),
            passed: true,
            message: "No validation configured".to_string(),
            details: None,
        })
    }
}
