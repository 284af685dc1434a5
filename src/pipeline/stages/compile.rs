//! Compile stage - composes module sources and builds the executable.

use anyhow::{Context as AnyhowContext, Result};
use tracing::info;

use crate::pipeline::types::{PipelineContext, PipelineStage, ValidationResult};

/// Compile stage - composes adapted modules and invokes the toolchain
pub struct CompileStage {
    pub(crate) force: bool,
}

impl CompileStage {
    pub fn new(force: bool) -> Self {
        Self { force }
    }
}

impl PipelineStage for CompileStage {
    fn name(&self) -> &str {
        "Compile"
    }

    fn execute(&self, mut ctx: PipelineContext) -> Result<PipelineContext> {
        info!("Compiling '{}' (force: {})", ctx.simulation.name(), self.force);

        let executable = ctx
            .simulation
            .compile(self.force)
            .with_context(|| format!("Failed to build '{}'", ctx.simulation.name()))?;

        if let Some(artifact) = ctx.simulation.artifact() {
            ctx.metadata.insert(
                "build_invocation".to_string(),
                serde_json::json!(artifact.invocation),
            );
            ctx.metadata
                .insert("modules".to_string(), serde_json::json!(artifact.modules));
        }
        ctx.executable = Some(executable);

        Ok(ctx)
    }

    fn validate(&self, ctx: &PipelineContext) -> Result<ValidationResult> {
        let exists = ctx.executable.as_ref().is_some_and(|p| p.exists());

        Ok(ValidationResult {
            stage: self.name().to_string(),
            passed: exists,
            message: if exists {
                "Executable built".to_string()
            } else {
                "Executable not found".to_string()
            },
            details: None,
        })
    }
}
