//! Regression pipeline: assemble, compile, execute and compare a simulation
//! with stop-on-error validation.
//!
//! 1. Assembly - Checks the component set and writes the input deck
//! 2. Compile - Composes adapted module sources and builds the executable
//! 3. Execute - Runs the executable and parses its trajectory
//! 4. Compare - Evaluates per-channel errors against a reference

mod execution;
mod stages;
mod types;

pub use types::{PipelineContext, PipelineOutput, PipelineStage, ValidationResult, ValidationStrategy};

pub use execution::RegressionPipeline;

pub use stages::{AssemblyStage, CompareStage, CompileStage, ExecuteStage};
