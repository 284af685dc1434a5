//! Assembly stage - checks the component set and writes the input deck.

use anyhow::{Context as AnyhowContext, Result};
use tracing::{info, warn};

use crate::pipeline::types::{PipelineContext, PipelineStage, ValidationResult};

/// Assembly stage - checks required components and writes the input deck
pub struct AssemblyStage;

impl PipelineStage for AssemblyStage {
    fn name(&self) -> &str {
        "Assembly"
    }

    fn execute(&self, mut ctx: PipelineContext) -> Result<PipelineContext> {
        info!("Assembling simulation '{}'", ctx.simulation.name());

        let errors = ctx.simulation.validate();
        for error in &errors {
            warn!("{}", error);
        }
        ctx.metadata.insert(
            "components".to_string(),
            serde_json::json!(ctx.simulation.component_names()),
        );
        ctx.metadata.insert("assembly_errors".to_string(), serde_json::json!(errors));

        if errors.is_empty() {
            let deck = ctx
                .simulation
                .generate_input_file()
                .context("Failed to write input deck")?;
            ctx.metadata.insert(
                "input_deck".to_string(),
                serde_json::json!(deck.display().to_string()),
            );
        }

        Ok(ctx)
    }

    fn validate(&self, ctx: &PipelineContext) -> Result<ValidationResult> {
        let errors = ctx
            .metadata
            .get("assembly_errors")
            .and_then(|v| v.as_array())
            .map_or(0, Vec::len);

        Ok(ValidationResult {
            stage: self.name().to_string(),
            passed: errors == 0,
            message: if errors == 0 {
                "Component set is complete".to_string()
            } else {
                format!("{} assembly error(s)", errors)
            },
            details: ctx.metadata.get("assembly_errors").cloned(),
        })
    }
}
