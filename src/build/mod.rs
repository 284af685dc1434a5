//! Build orchestration: framework skeleton, adapted modules, native compile.

pub mod toolchain;

pub use toolchain::Toolchain;

use crate::compose::{AdaptedModuleSource, ComposeEngine};
use crate::config::SimforgeConfig;
use crate::error::{ExecutionError, Result, SimforgeError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Name of the build directory inside a simulation working directory
pub const BUILD_DIR: &str = "build";

/// Result of a successful build
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildArtifact {
    pub executable: PathBuf,
    pub build_dir: PathBuf,
    /// Exact compiler invocation
    pub invocation: String,
    /// Module files compiled alongside the framework
    pub modules: Vec<String>,
}

/// Assembles the build directory and drives the native compiler
#[derive(Debug, Clone)]
pub struct BuildOrchestrator {
    framework_dir: PathBuf,
    framework_files: Vec<String>,
    toolchain: Toolchain,
}

impl BuildOrchestrator {
    pub fn new(
        framework_dir: impl Into<PathBuf>,
        framework_files: Vec<String>,
        toolchain: Toolchain,
    ) -> Self {
        Self {
            framework_dir: framework_dir.into(),
            framework_files,
            toolchain,
        }
    }

    pub fn from_config(config: &SimforgeConfig) -> Self {
        Self::new(
            &config.paths.framework,
            config.toolchain.framework_files.clone(),
            Toolchain::from_config(&config.toolchain, config.execution.compile_timeout_secs),
        )
    }

    pub fn toolchain(&self) -> &Toolchain {
        &self.toolchain
    }

    /// Copy the framework skeleton, failing on the first missing file
    pub fn stage_framework(&self, build_dir: &Path) -> Result<()> {
        for file in &self.framework_files {
            let src = self.framework_dir.join(file);
            if !src.is_file() {
                return Err(SimforgeError::io(
                    &src,
                    std::io::Error::new(std::io::ErrorKind::NotFound, "framework file missing"),
                ));
            }
            std::fs::copy(&src, build_dir.join(file)).map_err(|e| SimforgeError::io(&src, e))?;
        }
        debug!(
            "Copied {} framework files into {}",
            self.framework_files.len(),
            build_dir.display()
        );
        Ok(())
    }

    /// Build `<working_dir>/build/<name>` from the adapted module sources
    pub fn build(
        &self,
        name: &str,
        working_dir: &Path,
        sources: &[AdaptedModuleSource],
    ) -> Result<BuildArtifact> {
        let build_dir = working_dir.join(BUILD_DIR);
        std::fs::create_dir_all(&build_dir).map_err(|e| SimforgeError::io(&build_dir, e))?;

        self.stage_framework(&build_dir)?;
        ComposeEngine::write_sources(sources, &build_dir)?;

        let modules: Vec<String> = sources.iter().map(|s| s.file_name()).collect();
        let compile_units: Vec<String> = self
            .framework_files
            .iter()
            .filter(|f| f.ends_with(".cpp"))
            .cloned()
            .chain(modules.iter().cloned())
            .collect();

        let command = self.toolchain.command(&build_dir, &compile_units, name);
        let invocation = command.display();
        info!("Compiling '{}' ({} units)", name, compile_units.len());

        let output = command.run().map_err(|e| match e {
            ExecutionError::Timeout { seconds, .. } => SimforgeError::Compile {
                exit_code: None,
                diagnostics: format!("compiler timed out after {}s", seconds),
                invocation: invocation.clone(),
            },
            ExecutionError::Spawn { message, .. } => SimforgeError::Compile {
                exit_code: None,
                diagnostics: message,
                invocation: invocation.clone(),
            },
            other => SimforgeError::Execution(other),
        })?;

        if !output.success() {
            let diagnostics = if output.stderr.trim().is_empty() {
                output.stdout
            } else {
                output.stderr
            };
            return Err(SimforgeError::Compile {
                exit_code: output.exit_code,
                diagnostics,
                invocation,
            });
        }

        let executable = build_dir.join(name);
        if !executable.exists() {
            return Err(ExecutionError::ArtifactMissing(executable).into());
        }

        info!("Compilation successful: {}", executable.display());
        Ok(BuildArtifact {
            executable,
            build_dir,
            invocation,
            modules,
        })
    }
}
