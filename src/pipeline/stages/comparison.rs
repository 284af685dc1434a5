//! Compare stage - checks the trajectory against a reference.

use anyhow::{Context as AnyhowContext, Result};
use std::path::PathBuf;
use tracing::info;

use crate::pipeline::types::{PipelineContext, PipelineStage, ValidationResult};
use crate::trajectory::{ToleranceTable, TrajectoryComparator};

/// Compare stage - computes per-channel errors and the tolerance verdict
pub struct CompareStage {
    pub(crate) reference: PathBuf,
    pub(crate) tolerances: ToleranceTable,
}

impl CompareStage {
    pub fn new(reference: impl Into<PathBuf>, tolerances: ToleranceTable) -> Self {
        Self {
            reference: reference.into(),
            tolerances,
        }
    }
}

impl PipelineStage for CompareStage {
    fn name(&self) -> &str {
        "Compare"
    }

    fn execute(&self, mut ctx: PipelineContext) -> Result<PipelineContext> {
        info!("Comparing against {}", self.reference.display());

        let trajectory = ctx
            .trajectory
            .clone()
            .context("No trajectory to compare; run the Execute stage first")?;

        let comparator = TrajectoryComparator::against_file(trajectory, &self.reference)
            .with_context(|| format!("Failed to compare with {}", self.reference.display()))?;

        let tolerances = (!self.tolerances.is_empty()).then_some(&self.tolerances);
        let result = comparator.result(tolerances);

        ctx.metadata.insert(
            "reference".to_string(),
            serde_json::json!(self.reference.display().to_string()),
        );
        ctx.metadata.insert(
            "common_channels".to_string(),
            serde_json::json!(result.common_channels.len()),
        );
        ctx.comparison = Some(result);

        Ok(ctx)
    }

    fn validate(&self, ctx: &PipelineContext) -> Result<ValidationResult> {
        let verdict = ctx.comparison.as_ref().and_then(|c| c.verdict.as_ref());

        let Some(verdict) = verdict else {
            return Ok(ValidationResult {
                stage: self.name().to_string(),
                passed: true,
                message: "No tolerances configured".to_string(),
                details: None,
            });
        };

        let failed: Vec<&str> = verdict
            .channels
            .iter()
            .filter(|c| !c.passed())
            .map(|c| c.channel.as_str())
            .collect();

        Ok(ValidationResult {
            stage: self.name().to_string(),
            passed: verdict.passed,
            message: if verdict.passed {
                format!("{} channel(s) within tolerance", verdict.channels.len())
            } else {
                format!("Out of tolerance: {}", failed.join(", "))
            },
            details: Some(serde_json::to_value(verdict)?),
        })
    }
}
