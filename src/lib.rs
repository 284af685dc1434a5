// Library exports for the simforge composition and regression toolkit
pub mod build;
pub mod component;
pub mod compose;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod process;
pub mod registry;
pub mod report;
pub mod runner;
pub mod simulation;
pub mod trajectory;
pub mod types;

// Re-export key types for convenience
pub use build::{BuildArtifact, BuildOrchestrator, Toolchain};
pub use component::{Component, ComponentFactory};
pub use compose::{group_components, AdaptedModuleSource, ComposeEngine, ModuleGrouping};
pub use config::SimforgeConfig;
pub use error::{Result, SimforgeError};
pub use pipeline::{
    AssemblyStage, CompareStage, CompileStage, ExecuteStage, PipelineContext, PipelineOutput,
    PipelineStage, RegressionPipeline, ValidationStrategy,
};
pub use registry::{ComponentMetadata, ComponentRegistry};
pub use report::{RegressionReport, ReportFormat};
pub use runner::Runner;
pub use simulation::{Simulation, SimulationDefinition};
pub use trajectory::{
    ComparisonResult, RegressionVerdict, Tolerance, ToleranceTable, Trajectory,
    TrajectoryComparator, TrajectoryConvention,
};
pub use types::{Dof, LifecyclePhase, ParamValue};
