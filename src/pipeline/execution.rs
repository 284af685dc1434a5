//! Pipeline execution engine.

use anyhow::{Context as AnyhowContext, Result};
use std::path::PathBuf;
use tracing::{debug, info};

use super::stages::{AssemblyStage, CompareStage, CompileStage, ExecuteStage};
use super::types::{PipelineContext, PipelineOutput, PipelineStage, ValidationStrategy};
use crate::simulation::Simulation;
use crate::trajectory::ToleranceTable;

/// Assemble, build, run and compare a simulation
pub struct RegressionPipeline {
    pub(crate) stages: Vec<Box<dyn PipelineStage>>,
    pub(crate) validation: ValidationStrategy,
}

impl RegressionPipeline {
    pub fn new(validation: ValidationStrategy) -> Self {
        Self {
            stages: Vec::new(),
            validation,
        }
    }

    /// The four standard stages against `reference`
    pub fn standard(
        validation: ValidationStrategy,
        reference: impl Into<PathBuf>,
        tolerances: ToleranceTable,
    ) -> Self {
        Self::new(validation)
            .add_stage(Box::new(AssemblyStage))
            .add_stage(Box::new(CompileStage::new(false)))
            .add_stage(Box::new(ExecuteStage::default()))
            .add_stage(Box::new(CompareStage::new(reference, tolerances)))
    }

    /// Add a stage to the pipeline
    pub fn add_stage(mut self, stage: Box<dyn PipelineStage>) -> Self {
        self.stages.push(stage);
        self
    }

    pub fn stage_names(&self) -> Vec<&str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    /// Run every stage and return the final context
    pub fn run_context(&self, simulation: Simulation) -> Result<PipelineContext> {
        info!("Starting pipeline with {} stages", self.stages.len());

        let mut ctx = PipelineContext::new(simulation);

        for (idx, stage) in self.stages.iter().enumerate() {
            info!(
                "Running stage {}/{}: {}",
                idx + 1,
                self.stages.len(),
                stage.name()
            );

            ctx = stage
                .execute(ctx)
                .with_context(|| format!("Stage '{}' failed", stage.name()))?;

            if self.validation != ValidationStrategy::None {
                debug!("Validating stage: {}", stage.name());
                let validation_result = stage.validate(&ctx)?;
                ctx.validation_results.push(validation_result.clone());

                if !validation_result.passed && self.validation == ValidationStrategy::StopOnError {
                    anyhow::bail!(
                        "Validation failed for stage '{}': {}",
                        stage.name(),
                        validation_result.message
                    );
                }
            }
        }

        info!("Pipeline completed successfully");
        Ok(ctx)
    }

    /// Run the complete pipeline
    pub fn run(&self, simulation: Simulation) -> Result<PipelineOutput> {
        Ok(self.run_context(simulation)?.output())
    }
}
