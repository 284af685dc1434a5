//! Execute stage - runs the executable and parses its trajectory.

use anyhow::{Context as AnyhowContext, Result};
use tracing::info;

use crate::pipeline::types::{PipelineContext, PipelineStage, ValidationResult};

/// Execute stage - runs the simulation with optional overrides
#[derive(Debug, Clone, Copy, Default)]
pub struct ExecuteStage {
    pub(crate) duration: Option<f64>,
    pub(crate) dt: Option<f64>,
}

impl ExecuteStage {
    pub fn new(duration: Option<f64>, dt: Option<f64>) -> Self {
        Self { duration, dt }
    }
}

impl PipelineStage for ExecuteStage {
    fn name(&self) -> &str {
        "Execute"
    }

    fn execute(&self, mut ctx: PipelineContext) -> Result<PipelineContext> {
        info!("Executing '{}'", ctx.simulation.name());

        let trajectory = ctx
            .simulation
            .run(self.duration, self.dt, false)
            .with_context(|| format!("Failed to run '{}'", ctx.simulation.name()))?;

        ctx.metadata
            .insert("samples".to_string(), serde_json::json!(trajectory.len()));
        ctx.metadata.insert(
            "variables".to_string(),
            serde_json::json!(trajectory.variables()),
        );
        ctx.trajectory = Some(trajectory);

        Ok(ctx)
    }

    fn validate(&self, ctx: &PipelineContext) -> Result<ValidationResult> {
        let samples = ctx.trajectory.as_ref().map_or(0, |t| t.len());

        Ok(ValidationResult {
            stage: self.name().to_string(),
            passed: samples > 0,
            message: format!("Trajectory has {} samples", samples),
            details: None,
        })
    }
}
