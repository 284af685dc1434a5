//! Pipeline stage implementations.

mod assembly;
mod comparison;
mod compile;
mod execution;

pub use assembly::AssemblyStage;
pub use comparison::CompareStage;
pub use compile::CompileStage;
pub use execution::ExecuteStage;
